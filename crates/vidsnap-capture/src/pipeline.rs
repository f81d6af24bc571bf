// crates/vidsnap-capture/src/pipeline.rs
//
// A capture is split in two halves:
//
//   begin_capture   UI thread. Checks preconditions, picks the output name and
//                   asks the player for a snapshot into a hidden partial file.
//                   Borrows the player immutably and returns quickly.
//   finish_capture  Worker thread. Probe, rotate, ICC, timestamp copy, then the
//                   rename that makes the file visible under its final name.
//
// Only the first half can fail the capture outright. Everything in the second
// half except the rename degrades to a warning on the outcome.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use filetime::FileTime;
use tracing::{info, warn};
use uuid::Uuid;
use vidsnap_core::{CaptureError, FrameSnapshot, VideoEntry};

use crate::icc;
use crate::naming;
use crate::postprocess;
use crate::probe::StreamProbe;

#[derive(Clone, Debug)]
pub struct CaptureRequest {
    pub job_id:           Uuid,
    pub source_entry:     VideoEntry,
    pub output_directory: PathBuf,
    /// Name reserved when the snapshot was taken. Re-resolved on finish if
    /// something else claimed it in the meantime.
    pub output_path:      PathBuf,
    pub partial_path:     PathBuf,
    /// Filled in by the probe; 0 until then.
    pub rotation_degrees: i32,
}

#[derive(Clone, Debug)]
pub struct CaptureOutcome {
    pub job_id:           Uuid,
    pub output_path:      PathBuf,
    pub rotation_degrees: i32,
    pub icc_embedded:     bool,
    /// Non-fatal problems (probe, rotate, timestamp) in the order they occurred.
    pub warnings:         Vec<String>,
}

#[derive(Clone, Debug)]
pub struct CaptureOptions {
    /// Embedded when the source stream is wide-gamut.
    pub icc_profile: Vec<u8>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self { icc_profile: icc::display_p3() }
    }
}

/// Validates and snapshots. No file is touched unless every precondition holds.
pub fn begin_capture<S>(
    output_dir: Option<&Path>,
    source:     Option<(&S, &VideoEntry)>,
) -> Result<CaptureRequest, CaptureError>
where
    S: FrameSnapshot + ?Sized,
{
    let dir = output_dir.ok_or(CaptureError::NoOutputFolder)?;
    if !dir.is_dir() {
        return Err(CaptureError::OutputFolderMissing(dir.to_path_buf()));
    }
    let (player, entry) = source.ok_or(CaptureError::NoSelection)?;

    let job_id       = Uuid::new_v4();
    let stem         = naming::output_stem(entry);
    let output_path  = naming::resolve_output_path(dir, &stem);
    let partial_path = naming::partial_path(dir, job_id);

    if let Err(e) = player.snapshot(&partial_path) {
        let _ = std::fs::remove_file(&partial_path);
        return Err(e);
    }
    if !partial_path.is_file() {
        return Err(CaptureError::Snapshot("player reported success but wrote nothing".into()));
    }

    info!("[capture] {} snapshot → {}", entry.display_name, output_path.display());
    Ok(CaptureRequest {
        job_id,
        source_entry:     entry.clone(),
        output_directory: dir.to_path_buf(),
        output_path,
        partial_path,
        rotation_degrees: 0,
    })
}

/// Post-processes the partial file and moves it to its final name.
pub fn finish_capture(
    mut req: CaptureRequest,
    probe:   &dyn StreamProbe,
    cancel:  &AtomicBool,
    options: &CaptureOptions,
) -> Result<CaptureOutcome, CaptureError> {
    if cancel.load(Ordering::Relaxed) {
        return Err(abandon(&req));
    }

    let mut warnings = Vec::new();

    let meta = match probe.probe(&req.source_entry.path) {
        Ok(m) => m,
        Err(e) => {
            warn!("[capture] probe {}: {e}", req.source_entry.display_name);
            warnings.push(format!("Could not read stream metadata: {e}"));
            Default::default()
        }
    };

    let mut rotation = meta.rotation_degrees;
    if !postprocess::is_right_angle(rotation) {
        warn!("[capture] skipping unsupported rotation {rotation}°");
        warnings.push(format!("Rotation of {rotation}° is not supported; saved unrotated"));
        rotation = 0;
    }
    let wide_gamut = meta.is_wide_gamut();

    let mut icc_embedded = false;
    if rotation.rem_euclid(360) != 0 || wide_gamut {
        let icc = wide_gamut.then_some(options.icc_profile.as_slice());
        match postprocess::apply(&req.partial_path, rotation, icc) {
            Ok(()) => {
                req.rotation_degrees = rotation;
                icc_embedded = wide_gamut;
            }
            Err(e) => {
                warn!("[capture] post-process: {e}");
                warnings.push(e.to_string());
            }
        }
    }

    let mtime = FileTime::from_system_time(req.source_entry.modified_system_time());
    if let Err(e) = filetime::set_file_times(&req.partial_path, mtime, mtime) {
        warn!("[capture] timestamp copy: {e}");
        warnings.push(format!("Could not copy the modification time: {e}"));
    }

    if cancel.load(Ordering::Relaxed) {
        return Err(abandon(&req));
    }

    let output_path = finalize(&req)?;
    info!(
        "[capture] done {} (rotation {}°, icc {icc_embedded}, {} warning(s))",
        output_path.display(), req.rotation_degrees, warnings.len()
    );
    Ok(CaptureOutcome {
        job_id: req.job_id,
        output_path,
        rotation_degrees: req.rotation_degrees,
        icc_embedded,
        warnings,
    })
}

/// Removes the partial file of a request that will not be finished.
pub fn discard(req: &CaptureRequest) {
    let _ = std::fs::remove_file(&req.partial_path);
}

fn abandon(req: &CaptureRequest) -> CaptureError {
    discard(req);
    info!("[capture] {} cancelled", req.job_id);
    CaptureError::Cancelled
}

fn finalize(req: &CaptureRequest) -> Result<PathBuf, CaptureError> {
    let mut target = req.output_path.clone();
    if target.exists() {
        let stem = naming::output_stem(&req.source_entry);
        target = naming::resolve_output_path(&req.output_directory, &stem);
        warn!("[capture] {} was taken, using {}", req.output_path.display(), target.display());
    }
    std::fs::rename(&req.partial_path, &target).map_err(|source| {
        discard(req);
        CaptureError::Finalize { path: target.clone(), source }
    })?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use vidsnap_core::testing::FakePlayer;

    fn entry() -> VideoEntry {
        VideoEntry::new(PathBuf::from("/videos/clip.mp4"), SystemTime::UNIX_EPOCH)
    }

    #[test]
    fn preconditions_are_checked_in_order() {
        let player = FakePlayer { snapshot_bytes: Some(vec![1]), ..Default::default() };
        let e = entry();

        let err = begin_capture(None, Some((&player, &e))).unwrap_err();
        assert!(matches!(err, CaptureError::NoOutputFolder));

        let gone = Path::new("/definitely/not/a/folder");
        let err = begin_capture(Some(gone), Some((&player, &e))).unwrap_err();
        assert!(matches!(err, CaptureError::OutputFolderMissing(_)));

        let dir = tempfile::tempdir().unwrap();
        let err = begin_capture::<FakePlayer>(Some(dir.path()), None).unwrap_err();
        assert!(matches!(err, CaptureError::NoSelection));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn cancelled_before_start_removes_partial() {
        struct NeverCalled;
        impl StreamProbe for NeverCalled {
            fn probe(&self, _: &Path) -> Result<crate::StreamMetadata, vidsnap_core::ProbeError> {
                panic!("probe should not run for a cancelled job")
            }
        }

        let dir    = tempfile::tempdir().unwrap();
        let player = FakePlayer { snapshot_bytes: Some(vec![1, 2, 3]), ..Default::default() };
        let e      = entry();
        let req    = begin_capture(Some(dir.path()), Some((&player, &e))).unwrap();
        assert!(req.partial_path.exists());

        let cancel = AtomicBool::new(true);
        let err = finish_capture(req.clone(), &NeverCalled, &cancel, &CaptureOptions::default())
            .unwrap_err();
        assert!(matches!(err, CaptureError::Cancelled));
        assert!(!req.partial_path.exists());
        assert!(!req.output_path.exists());
    }
}
