//! Display formatting for clip times.

/// Added before truncation so that sums like 1.4 + 0.2 (= 1.5999999999999999)
/// land on the intended tenth.
const FLOAT_EPSILON: f64 = 0.000001;

/// Format seconds as `MM:SS.T`. Negative and non-finite input formats as zero.
pub fn format_video_time(total_seconds: f64) -> String {
    let total = if total_seconds.is_finite() && total_seconds > 0.0 {
        total_seconds + FLOAT_EPSILON
    } else {
        0.0
    };

    let tenths = ((total * 10.0).floor() as u64) % 10;
    let whole = total.floor() as u64;
    let seconds = whole % 60;
    let minutes = whole / 60;
    format!("{:02}:{:02}.{}", minutes, seconds, tenths)
}
