/// Containers to package a capture in, most preferred first.
pub const DEFAULT_CODEC_PREFERENCES: [&str; 4] = ["audio/wav", "audio/mpeg", "audio/webm", "audio/ogg"];

/// First entry of `preferences` the runtime can handle.
pub fn select_mime_type<'a, F>(preferences: &'a [String], is_supported: F) -> Option<&'a str>
where
    F: Fn(&str) -> bool,
{
    preferences
        .iter()
        .map(String::as_str)
        .find(|mime| is_supported(mime))
}
