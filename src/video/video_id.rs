//! Extract a video id from pasted watch or short links.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref QUERY_PARAM_ID: Regex =
        Regex::new(r"v=(?P<video_id>[a-zA-Z0-9_-]+)").expect("valid video id pattern");
    static ref SHORT_URL_ID: Regex =
        Regex::new(r"youtu\.be/(?P<video_id>[a-zA-Z0-9_-]+)").expect("valid short url pattern");
}

fn capture_id(re: &Regex, s: &str) -> Option<String> {
    re.captures(s)
        .and_then(|c| c.name("video_id"))
        .map(|m| m.as_str().to_string())
}

/// Return the id from a `v=` query parameter or a `youtu.be/` link, or the
/// input unchanged when it is neither (bare ids pass through).
pub fn parse_video_id(s: &str) -> String {
    capture_id(&QUERY_PARAM_ID, s)
        .or_else(|| capture_id(&SHORT_URL_ID, s))
        .unwrap_or_else(|| s.to_string())
}
