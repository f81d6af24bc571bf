// End-to-end capture runs against FakePlayer and a scripted probe.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver};
use filetime::FileTime;
use image::{DynamicImage, ImageFormat, RgbaImage};
use vidsnap_capture::{
    begin_capture, finish_capture, CaptureEvent, CaptureOptions, CaptureWorker, StreamMetadata,
    StreamProbe,
};
use vidsnap_core::testing::FakePlayer;
use vidsnap_core::{CaptureError, ProbeError, VideoEntry};

const SOURCE_MTIME: i64 = 1_600_000_000;

struct FixedProbe {
    codec:    Option<&'static str>,
    rotation: i32,
}

impl StreamProbe for FixedProbe {
    fn probe(&self, _: &Path) -> Result<StreamMetadata, ProbeError> {
        Ok(StreamMetadata {
            codec_name:       self.codec.map(str::to_string),
            rotation_degrees: self.rotation,
        })
    }
}

struct BrokenProbe;

impl StreamProbe for BrokenProbe {
    fn probe(&self, _: &Path) -> Result<StreamMetadata, ProbeError> {
        Err(ProbeError::Parse("scripted".into()))
    }
}

/// Blocks until the test lets it continue.
struct GatedProbe(Receiver<()>);

impl StreamProbe for GatedProbe {
    fn probe(&self, _: &Path) -> Result<StreamMetadata, ProbeError> {
        let _ = self.0.recv();
        Ok(StreamMetadata::default())
    }
}

struct Fixture {
    _dir:   tempfile::TempDir,
    out:    PathBuf,
    entry:  VideoEntry,
    player: FakePlayer,
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
        image::Rgba([(x * 40) as u8, (y * 40) as u8, 128, 255])
    }));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("holiday.2019.mp4");
    std::fs::write(&src, b"not really a video").unwrap();
    filetime::set_file_mtime(&src, FileTime::from_unix_time(SOURCE_MTIME, 0)).unwrap();

    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();

    Fixture {
        entry:  VideoEntry::from_path(&src).unwrap(),
        player: FakePlayer { snapshot_bytes: Some(png_bytes(4, 2)), ..Default::default() },
        out,
        _dir: dir,
    }
}

fn capture_with(f: &Fixture, probe: &dyn StreamProbe) -> vidsnap_capture::CaptureOutcome {
    let req = begin_capture(Some(&f.out), Some((&f.player, &f.entry))).unwrap();
    finish_capture(req, probe, &AtomicBool::new(false), &CaptureOptions::default()).unwrap()
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir).unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn no_output_folder_writes_nothing() {
    let f = fixture();
    let err = begin_capture(None, Some((&f.player, &f.entry))).unwrap_err();
    assert!(matches!(err, CaptureError::NoOutputFolder));
    assert!(listing(&f.out).is_empty());
}

#[test]
fn consecutive_captures_are_numbered() {
    let f     = fixture();
    let probe = FixedProbe { codec: Some("h264"), rotation: 0 };

    let first  = capture_with(&f, &probe);
    let second = capture_with(&f, &probe);
    assert_eq!(first.output_path, f.out.join("holiday00.png"));
    assert_eq!(second.output_path, f.out.join("holiday01.png"));
    assert_eq!(listing(&f.out), ["holiday00.png", "holiday01.png"]);
}

#[test]
fn existing_files_are_never_overwritten() {
    let f = fixture();
    std::fs::write(f.out.join("holiday00.png"), b"keep me").unwrap();

    let outcome = capture_with(&f, &FixedProbe { codec: None, rotation: 0 });
    assert_eq!(outcome.output_path, f.out.join("holiday01.png"));
    assert_eq!(std::fs::read(f.out.join("holiday00.png")).unwrap(), b"keep me");
}

#[test]
fn name_taken_after_snapshot_is_re_resolved() {
    let f   = fixture();
    let req = begin_capture(Some(&f.out), Some((&f.player, &f.entry))).unwrap();
    assert_eq!(req.output_path, f.out.join("holiday00.png"));

    std::fs::write(f.out.join("holiday00.png"), b"late arrival").unwrap();
    let outcome = finish_capture(
        req,
        &FixedProbe { codec: None, rotation: 0 },
        &AtomicBool::new(false),
        &CaptureOptions::default(),
    ).unwrap();

    assert_eq!(outcome.output_path, f.out.join("holiday01.png"));
    assert_eq!(std::fs::read(f.out.join("holiday00.png")).unwrap(), b"late arrival");
}

#[test]
fn output_carries_source_mtime() {
    let f       = fixture();
    let outcome = capture_with(&f, &FixedProbe { codec: None, rotation: 90 });

    let meta = std::fs::metadata(&outcome.output_path).unwrap();
    assert_eq!(FileTime::from_last_modification_time(&meta).unix_seconds(), SOURCE_MTIME);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn rotation_expands_the_canvas() {
    for (deg, dims) in [(0, (4, 2)), (90, (2, 4)), (180, (4, 2)), (270, (2, 4)), (-90, (2, 4))] {
        let f       = fixture();
        let outcome = capture_with(&f, &FixedProbe { codec: None, rotation: deg });
        let img     = image::open(&outcome.output_path).unwrap();
        assert_eq!((img.width(), img.height()), dims, "{deg}°");
    }
}

#[test]
fn unrotated_capture_is_the_raw_snapshot() {
    let f       = fixture();
    let outcome = capture_with(&f, &FixedProbe { codec: Some("h264"), rotation: 0 });
    assert_eq!(std::fs::read(&outcome.output_path).unwrap(), png_bytes(4, 2));
    assert!(!outcome.icc_embedded);
}

#[test]
fn hevc_sources_get_the_wide_gamut_profile() {
    let f       = fixture();
    let outcome = capture_with(&f, &FixedProbe { codec: Some("hevc"), rotation: 0 });
    assert!(outcome.icc_embedded);

    use image::ImageDecoder;
    let file = std::fs::File::open(&outcome.output_path).unwrap();
    let mut dec = image::codecs::png::PngDecoder::new(std::io::BufReader::new(file)).unwrap();
    let icc = dec.icc_profile().unwrap().expect("profile embedded");
    assert_eq!(&icc[36..40], b"acsp");
}

#[test]
fn probe_failure_keeps_the_raw_snapshot() {
    let f       = fixture();
    let outcome = capture_with(&f, &BrokenProbe);

    assert_eq!(outcome.rotation_degrees, 0);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(std::fs::read(&outcome.output_path).unwrap(), png_bytes(4, 2));
}

#[test]
fn odd_rotation_is_skipped_with_a_warning() {
    let f       = fixture();
    let outcome = capture_with(&f, &FixedProbe { codec: None, rotation: 45 });
    assert_eq!(outcome.rotation_degrees, 0);
    assert!(outcome.warnings[0].contains("45"));
    assert!(outcome.output_path.exists());
}

#[test]
fn snapshot_failure_leaves_nothing_behind() {
    let mut f = fixture();
    f.player.snapshot_bytes = None;

    let err = begin_capture(Some(&f.out), Some((&f.player, &f.entry))).unwrap_err();
    assert!(matches!(err, CaptureError::Snapshot(_)));
    assert!(listing(&f.out).is_empty());
}

#[test]
fn worker_reports_finished_jobs() {
    let f      = fixture();
    let worker = CaptureWorker::new(
        Box::new(FixedProbe { codec: None, rotation: 180 }),
        CaptureOptions::default(),
    );

    let req    = begin_capture(Some(&f.out), Some((&f.player, &f.entry))).unwrap();
    let job_id = worker.submit(req).unwrap();

    match worker.rx.recv_timeout(Duration::from_secs(10)).unwrap() {
        CaptureEvent::Done(outcome) => {
            assert_eq!(outcome.job_id, job_id);
            assert_eq!(outcome.rotation_degrees, 180);
            assert_eq!(listing(&f.out), ["holiday00.png"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn cancelled_job_leaves_no_file() {
    let f              = fixture();
    let (gate_tx, gate) = bounded::<()>(1);
    let worker         = CaptureWorker::new(Box::new(GatedProbe(gate)), CaptureOptions::default());

    let req    = begin_capture(Some(&f.out), Some((&f.player, &f.entry))).unwrap();
    let job_id = worker.submit(req).unwrap();
    assert_eq!(worker.in_flight(), 1);

    worker.cancel(job_id);
    gate_tx.send(()).unwrap();

    let event = worker.rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(matches!(event, CaptureEvent::Cancelled { job_id: id } if id == job_id));
    assert!(listing(&f.out).is_empty());
}

#[test]
fn shutdown_waits_for_a_running_job_to_clean_up() {
    let f               = fixture();
    let (gate_tx, gate) = bounded::<()>(1);
    let mut worker      = CaptureWorker::new(Box::new(GatedProbe(gate)), CaptureOptions::default());

    let req    = begin_capture(Some(&f.out), Some((&f.player, &f.entry))).unwrap();
    let job_id = worker.submit(req).unwrap();
    assert_eq!(listing(&f.out).len(), 1, "partial file exists while the job runs");

    // Released only after shutdown() has started waiting.
    let opener = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        let _ = gate_tx.send(());
    });

    let late = worker.shutdown();
    opener.join().unwrap();

    assert!(listing(&f.out).is_empty());
    assert_eq!(late.len(), 1);
    assert!(matches!(late[0], CaptureEvent::Cancelled { job_id: id } if id == job_id));

    // Submitting after shutdown is refused without leaving a partial behind.
    let req = begin_capture(Some(&f.out), Some((&f.player, &f.entry))).unwrap();
    assert!(matches!(worker.submit(req), Err(CaptureError::Cancelled)));
    assert!(listing(&f.out).is_empty());
    assert!(worker.shutdown().is_empty());
}
