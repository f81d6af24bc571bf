// crates/vidsnap-capture/src/lib.rs
//
// Screenshot capture: output naming, stream metadata via ffprobe, rotation and
// colour-profile post-processing, timestamp copy, and the background worker
// that runs all of that off the UI thread.
//
// No egui and no ffmpeg linkage. The frame itself comes from any
// vidsnap_core::FrameSnapshot implementor.

pub mod icc;
pub mod naming;
pub mod pipeline;
pub mod postprocess;
pub mod probe;
pub mod worker;

pub use pipeline::{begin_capture, finish_capture, CaptureOptions, CaptureOutcome, CaptureRequest};
pub use probe::{FfprobeCli, StreamMetadata, StreamProbe};
pub use worker::{CaptureEvent, CaptureWorker};
