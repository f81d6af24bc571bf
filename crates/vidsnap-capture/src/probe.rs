// crates/vidsnap-capture/src/probe.rs
//
// Stream metadata from the ffprobe CLI.
//
// Only two facts matter for a capture: the display rotation of the video
// stream and its codec. Encoders disagree on where rotation goes, so every
// side-data entry is checked for a `rotation` key before falling back to the
// legacy `rotate` tag.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use vidsnap_core::ProbeError;

/// Codecs whose sources are usually wide-gamut (Display P3 phone footage).
const WIDE_GAMUT_CODECS: &[&str] = &["hevc"];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamMetadata {
    pub codec_name:       Option<String>,
    /// Degrees as reported (counter-clockwise positive), 0 when absent.
    pub rotation_degrees: i32,
}

impl StreamMetadata {
    pub fn is_wide_gamut(&self) -> bool {
        self.codec_name.as_deref()
            .map(|c| WIDE_GAMUT_CODECS.contains(&c))
            .unwrap_or(false)
    }
}

pub trait StreamProbe: Send {
    fn probe(&self, path: &Path) -> Result<StreamMetadata, ProbeError>;
}

// ── ffprobe JSON ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ProbeDoc {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_name:     Option<String>,
    codec_type:     Option<String>,
    #[serde(default)]
    side_data_list: Vec<Value>,
    #[serde(default)]
    tags:           HashMap<String, Value>,
}

impl ProbeStream {
    fn rotation(&self) -> Option<i32> {
        let from_side_data = self.side_data_list.iter()
            .find_map(|sd| sd.get("rotation").and_then(as_degrees));
        from_side_data.or_else(|| self.tags.get("rotate").and_then(as_degrees))
    }
}

fn as_degrees(v: &Value) -> Option<i32> {
    let f = v.as_f64().or_else(|| v.as_str()?.trim().parse::<f64>().ok())?;
    Some(f.round() as i32)
}

/// Parses `ffprobe -print_format json -show_streams` output.
/// Uses the first video stream, or the first stream of any kind.
pub fn parse_ffprobe_json(json: &str) -> Result<StreamMetadata, ProbeError> {
    let doc: ProbeDoc = serde_json::from_str(json).map_err(|e| ProbeError::Parse(e.to_string()))?;
    let stream = doc.streams.iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .or_else(|| doc.streams.first());

    Ok(match stream {
        Some(s) => StreamMetadata {
            codec_name:       s.codec_name.clone(),
            rotation_degrees: s.rotation().unwrap_or(0),
        },
        None => StreamMetadata::default(),
    })
}

// ── FfprobeCli ───────────────────────────────────────────────────────────────

/// Runs the `ffprobe` executable found on PATH (or at an explicit location).
#[derive(Clone, Debug)]
pub struct FfprobeCli {
    binary: PathBuf,
}

impl Default for FfprobeCli {
    fn default() -> Self {
        let name = if cfg!(target_os = "windows") { "ffprobe.exe" } else { "ffprobe" };
        Self { binary: PathBuf::from(name) }
    }
}

impl FfprobeCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self { Self { binary: binary.into() } }

    /// First line of `ffprobe -version`, or None when it cannot be run.
    pub fn version(&self) -> Option<String> {
        let out = Command::new(&self.binary)
            .arg("-version")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .ok()?;
        if !out.status.success() { return None; }
        String::from_utf8_lossy(&out.stdout).lines().next().map(str::to_string)
    }
}

impl StreamProbe for FfprobeCli {
    fn probe(&self, path: &Path) -> Result<StreamMetadata, ProbeError> {
        let out = Command::new(&self.binary)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        if !out.status.success() {
            return Err(ProbeError::Failed {
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        let meta = parse_ffprobe_json(&String::from_utf8_lossy(&out.stdout))?;
        debug!("[capture] probe {} → {meta:?}", path.display());
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_from_second_side_data_slot() {
        let json = r#"{"streams":[{
            "codec_name":"hevc","codec_type":"video",
            "side_data_list":[
                {"side_data_type":"DOVI configuration record","dv_profile":8},
                {"side_data_type":"Display Matrix","rotation":-90}
            ]}]}"#;
        let meta = parse_ffprobe_json(json).unwrap();
        assert_eq!(meta.rotation_degrees, -90);
        assert!(meta.is_wide_gamut());
    }

    #[test]
    fn legacy_rotate_tag_is_a_fallback() {
        let json = r#"{"streams":[{"codec_name":"h264","codec_type":"video","tags":{"rotate":"180","language":"und"}}]}"#;
        let meta = parse_ffprobe_json(json).unwrap();
        assert_eq!(meta.rotation_degrees, 180);
        assert!(!meta.is_wide_gamut());
    }

    #[test]
    fn video_stream_wins_over_leading_audio() {
        let json = r#"{"streams":[
            {"codec_name":"aac","codec_type":"audio"},
            {"codec_name":"h264","codec_type":"video","side_data_list":[{"rotation":90}]}
        ]}"#;
        let meta = parse_ffprobe_json(json).unwrap();
        assert_eq!(meta.codec_name.as_deref(), Some("h264"));
        assert_eq!(meta.rotation_degrees, 90);
    }

    #[test]
    fn no_streams_means_no_rotation() {
        assert_eq!(parse_ffprobe_json("{}").unwrap(), StreamMetadata::default());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(parse_ffprobe_json("not json"), Err(ProbeError::Parse(_))));
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let probe = FfprobeCli::new("/definitely/not/here/ffprobe");
        assert!(matches!(probe.probe(Path::new("x.mp4")), Err(ProbeError::Spawn(_))));
        assert!(probe.version().is_none());
    }
}
