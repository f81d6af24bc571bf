// crates/vidsnap-media/src/probe.rs
//
// In-process FFmpeg probing: duration, frame rate, dimensions, audio presence.
// Run once per load, before anything is decoded.

use std::path::Path;

use tracing::info;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::media::Type;

use vidsnap_core::media_types::StreamInfo;
use vidsnap_core::LoadError;

pub fn probe_stream(path: &Path) -> Result<StreamInfo, LoadError> {
    let open_err = |reason: String| LoadError::Open { path: path.to_path_buf(), reason };

    let ctx   = input(path).map_err(|e| open_err(e.to_string()))?;
    let video = ctx.streams().best(Type::Video)
        .ok_or_else(|| open_err("no video stream".into()))?;

    let (width, height) = unsafe {
        let p = video.parameters().as_ptr();
        ((*p).width.max(0) as u32, (*p).height.max(0) as u32)
    };

    let rate       = video.avg_frame_rate();
    let frame_rate = frame_rate(rate.numerator(), rate.denominator());

    // Container duration first, stream duration as fallback.
    let mut seconds = ctx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
    if seconds <= 0.0 {
        let tb = video.time_base();
        if tb.denominator() != 0 {
            seconds = video.duration() as f64 * tb.numerator() as f64 / tb.denominator() as f64;
        }
    }

    let info = StreamInfo {
        duration_millis: secs_to_millis(seconds),
        frame_rate,
        width,
        height,
        has_audio: ctx.streams().best(Type::Audio).is_some(),
    };
    info!("[media] probe {} → {info:?}", path.display());
    Ok(info)
}

/// None for the 0/0 and 0/1 rates containers use for "unknown".
pub fn frame_rate(num: i32, den: i32) -> Option<f64> {
    (num > 0 && den > 0).then(|| num as f64 / den as f64)
}

pub fn secs_to_millis(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 { (seconds * 1000.0).round() as u64 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_rates_are_none() {
        assert_eq!(frame_rate(0, 0), None);
        assert_eq!(frame_rate(0, 1), None);
        assert_eq!(frame_rate(30000, 1001).map(|r| (r * 100.0).round()), Some(2997.0));
    }

    #[test]
    fn negative_and_nan_durations_are_zero() {
        assert_eq!(secs_to_millis(-1.0), 0);
        assert_eq!(secs_to_millis(f64::NAN), 0);
        assert_eq!(secs_to_millis(12.3456), 12_346);
    }
}
