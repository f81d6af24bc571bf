// crates/vidsnap-capture/src/naming.rs
//
// Output file naming. One policy: `<stem><NN>.png`, where the stem is the
// source file name up to its first dot and NN is a zero-padded counter that
// is bumped until the name is free. The counter simply widens past 99.

use std::path::{Path, PathBuf};

use uuid::Uuid;
use vidsnap_core::VideoEntry;

const FALLBACK_STEM: &str = "capture";

/// `clip.final.mp4` → `clip`. Dot-files fall back to a fixed stem.
pub fn output_stem(entry: &VideoEntry) -> String {
    let stem = entry.display_name.split('.').next().unwrap_or_default();
    if stem.is_empty() { FALLBACK_STEM.to_string() } else { stem.to_string() }
}

pub fn candidate(dir: &Path, stem: &str, counter: u32) -> PathBuf {
    dir.join(format!("{stem}{counter:02}.png"))
}

/// First `<stem><NN>.png` in `dir` that does not exist yet.
pub fn resolve_output_path(dir: &Path, stem: &str) -> PathBuf {
    let mut counter = 0;
    loop {
        let path = candidate(dir, stem, counter);
        if !path.exists() {
            return path;
        }
        counter += 1;
    }
}

/// Hidden scratch file the snapshot is written to before it is renamed into
/// place. Never matches the `<stem><NN>.png` pattern.
pub fn partial_path(dir: &Path, job_id: Uuid) -> PathBuf {
    dir.join(format!(".vidsnap-{}.partial.png", job_id.simple()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn entry(name: &str) -> VideoEntry {
        VideoEntry::new(PathBuf::from("/v").join(name), SystemTime::UNIX_EPOCH)
    }

    #[test]
    fn stem_stops_at_first_dot() {
        assert_eq!(output_stem(&entry("holiday.2019.mp4")), "holiday");
        assert_eq!(output_stem(&entry("clip.MOV")), "clip");
        assert_eq!(output_stem(&entry(".hidden.mp4")), "capture");
    }

    #[test]
    fn counter_skips_taken_names() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_output_path(dir.path(), "a"), dir.path().join("a00.png"));

        std::fs::write(dir.path().join("a00.png"), b"x").unwrap();
        std::fs::write(dir.path().join("a01.png"), b"x").unwrap();
        assert_eq!(resolve_output_path(dir.path(), "a"), dir.path().join("a02.png"));
    }

    #[test]
    fn counter_widens_past_two_digits() {
        assert_eq!(candidate(Path::new("/o"), "a", 123), PathBuf::from("/o/a123.png"));
    }

    #[test]
    fn partial_name_is_hidden() {
        let p = partial_path(Path::new("/o"), Uuid::nil());
        let name = p.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with('.'));
        assert!(name.ends_with(".partial.png"));
    }
}
