// crates/cropsync-core/src/helpers/time.rs
//
// Transport-bar time formatting. A duration of 0.0 means "not known yet"; none
// of these helpers divide by it.

/// Format seconds as `M:SS`. Minutes are not wrapped into hours, matching the
/// transport bar's timestamp text. Negative or non-finite input renders as `0:00`.
///
/// ```
/// use cropsync_core::helpers::time::format_clock;
/// assert_eq!(format_clock(125.0),  "2:05");
/// assert_eq!(format_clock(0.0),    "0:00");
/// assert_eq!(format_clock(59.99),  "0:59");
/// assert_eq!(format_clock(3725.0), "62:05");
/// ```
pub fn format_clock(secs: f64) -> String {
    let secs = if secs.is_finite() && secs > 0.0 { secs as u64 } else { 0 };
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// `current / duration` as shown next to the progress bar.
///
/// ```
/// use cropsync_core::helpers::time::format_progress;
/// assert_eq!(format_progress(125.0, 596.5), "2:05 / 9:56");
/// assert_eq!(format_progress(3.0, 0.0),     "0:03 / 0:00");
/// ```
pub fn format_progress(current: f64, duration: f64) -> String {
    format!("{} / {}", format_clock(current), format_clock(duration))
}

/// Position of the play head as a fraction in [0, 1]. Unknown duration → 0.
///
/// ```
/// use cropsync_core::helpers::time::progress_fraction;
/// assert_eq!(progress_fraction(5.0, 0.0),   0.0);
/// assert_eq!(progress_fraction(5.0, 10.0),  0.5);
/// assert_eq!(progress_fraction(50.0, 10.0), 1.0);
/// ```
pub fn progress_fraction(current: f64, duration: f64) -> f64 {
    if !(duration.is_finite() && duration > 0.0) || !current.is_finite() {
        return 0.0;
    }
    (current / duration).clamp(0.0, 1.0)
}
