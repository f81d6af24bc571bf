// crates/vidsnap-ui/src/helpers/format.rs
//
// Display-only string helpers. Clock and progress formatting live in
// vidsnap_core::helpers::time.

use std::path::Path;

const ELLIPSIS: char = '…';

/// Keeps the first `max_chars - 1` characters of `name` and appends "…".
/// Counts characters, not bytes, so multibyte names never split.
pub fn fit_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = name.chars().take(max_chars - 1).collect();
    out.push(ELLIPSIS);
    out
}

/// Folder paths are most recognisable by their tail, so the head is dropped:
/// `/home/me/Videos/holiday` → `…/Videos/holiday`.
pub fn fit_path(path: &Path, max_chars: usize) -> String {
    let full  = path.display().to_string();
    let count = full.chars().count();
    if count <= max_chars {
        return full;
    }
    if max_chars == 0 {
        return String::new();
    }
    let tail: String = full.chars().skip(count - (max_chars - 1)).collect();
    format!("{ELLIPSIS}{tail}")
}

/// Label for an optional folder setting.
pub fn folder_label(folder: Option<&Path>, max_chars: usize) -> String {
    match folder {
        Some(p) => fit_path(p, max_chars),
        None    => "(not set)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn short_names_pass_through() {
        assert_eq!(fit_name("a.mp4", 10), "a.mp4");
        assert_eq!(fit_name("a.mp4", 5), "a.mp4");
    }

    #[test]
    fn long_names_get_ellipsis_within_budget() {
        let s = fit_name("a_very_long_holiday_video.mp4", 10);
        assert_eq!(s.chars().count(), 10);
        assert!(s.ends_with(ELLIPSIS));
        assert!(s.starts_with("a_very_lo"));
    }

    #[test]
    fn multibyte_names_never_split() {
        let s = fit_name("ééééééé.mov", 4);
        assert_eq!(s, "ééé…");
    }

    #[test]
    fn zero_budget_is_empty() {
        assert_eq!(fit_name("x", 0), "");
        assert_eq!(fit_path(Path::new("/x/y"), 0), "");
    }

    #[test]
    fn paths_keep_their_tail() {
        let p = PathBuf::from("/home/me/Videos/holiday");
        let s = fit_path(&p, 12);
        assert_eq!(s.chars().count(), 12);
        assert!(s.ends_with("holiday"));
        assert!(s.starts_with(ELLIPSIS));
    }

    #[test]
    fn unset_folder_has_placeholder() {
        assert_eq!(folder_label(None, 20), "(not set)");
        assert_eq!(folder_label(Some(Path::new("/tmp")), 20), "/tmp");
    }
}
