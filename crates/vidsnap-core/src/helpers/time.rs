// crates/vidsnap-core/src/helpers/time.rs
//
// Clock formatting for the transport bar.

/// Formats a millisecond position as `M:SS`, or `H:MM:SS` past the hour.
///
/// ```
/// use vidsnap_core::helpers::time::format_clock;
/// assert_eq!(format_clock(0),         "0:00");
/// assert_eq!(format_clock(61_900),    "1:01");
/// assert_eq!(format_clock(3_725_000), "1:02:05");
/// ```
pub fn format_clock(millis: u64) -> String {
    let secs = millis / 1000;
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else {
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

/// `position / duration` as shown next to the time slider.
///
/// ```
/// use vidsnap_core::helpers::time::format_progress;
/// assert_eq!(format_progress(5_000, 0),       "0:05 / --:--");
/// assert_eq!(format_progress(5_000, 125_000), "0:05 / 2:05");
/// ```
pub fn format_progress(position: u64, duration: u64) -> String {
    if duration == 0 {
        format!("{} / --:--", format_clock(position))
    } else {
        format!("{} / {}", format_clock(position), format_clock(duration))
    }
}
