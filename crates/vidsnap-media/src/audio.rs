// crates/vidsnap-media/src/audio.rs
//
// Audio for the player: the soundtrack is extracted once per load to a temp
// WAV (44.1 kHz stereo f32) on a background thread, then played through a
// rodio sink that follows the playback clock.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, info, warn};
use uuid::Uuid;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::format::sample::{Sample, Type as SampleType};
use ffmpeg::media::Type as MediaType;
use ffmpeg::software::resampling;
use ffmpeg::util::channel_layout::ChannelLayout;
use ffmpeg::util::frame::audio::Audio as AudioFrame;

const OUT_RATE:   u32           = 44_100;
/// Interleaved f32; WAV format tag 3 = IEEE_FLOAT.
const OUT_FMT:    Sample        = Sample::F32(SampleType::Packed);
const OUT_LAYOUT: ChannelLayout = ChannelLayout::STEREO;

const TEMP_PREFIX: &str = "vidsnap_audio_";

// ── Extraction ───────────────────────────────────────────────────────────────

pub fn temp_wav_path() -> PathBuf {
    std::env::temp_dir().join(format!("{TEMP_PREFIX}{}.wav", Uuid::new_v4().simple()))
}

/// Decodes all audio from `src` into a WAV at `dst`. Returns bytes written.
pub fn extract_wav(src: &Path, dst: &Path) -> Result<u64, String> {
    let mut ictx = input(src).map_err(|e| format!("open: {e}"))?;

    let (audio_idx, mut decoder) = {
        let stream = ictx.streams().best(MediaType::Audio)
            .ok_or_else(|| "no audio stream".to_string())?;
        let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| format!("codec context: {e}"))?;
        let decoder = dec_ctx.decoder().audio().map_err(|e| format!("audio decoder: {e}"))?;
        (stream.index(), decoder)
    };

    // Resampler is built on the first frame, once the real source format is known.
    let mut resampler: Option<resampling::Context> = None;
    let mut pcm: Vec<f32> = Vec::new();

    for (stream, packet) in ictx.packets().flatten() {
        if stream.index() != audio_idx { continue; }
        if decoder.send_packet(&packet).is_err() { continue; }
        let mut frame = AudioFrame::empty();
        while decoder.receive_frame(&mut frame).is_ok() {
            append_resampled(&frame, &mut resampler, &mut pcm)?;
        }
    }

    let _ = decoder.send_eof();
    let mut frame = AudioFrame::empty();
    while decoder.receive_frame(&mut frame).is_ok() {
        append_resampled(&frame, &mut resampler, &mut pcm)?;
    }

    if pcm.is_empty() {
        return Err("no audio samples decoded".into());
    }
    let bytes = write_wav(dst, &pcm).map_err(|e| format!("write WAV: {e}"))?;
    info!("[audio] WAV written ({bytes} bytes) ← {}", src.display());
    Ok(bytes)
}

fn append_resampled(
    frame:     &AudioFrame,
    resampler: &mut Option<resampling::Context>,
    out:       &mut Vec<f32>,
) -> Result<(), String> {
    let src_channels = frame.ch_layout().channels();
    let needs_resample = frame.format() != OUT_FMT
        || frame.rate()                != OUT_RATE
        || src_channels                != 2;

    if !needs_resample {
        append_packed_f32(frame, out);
        return Ok(());
    }

    if resampler.is_none() {
        // Mono sources must be declared MONO or swr misreads the channel count.
        let src_layout = if src_channels >= 2 { frame.ch_layout() } else { ChannelLayout::MONO };
        let ctx = resampling::Context::get2(
            frame.format(), src_layout, frame.rate(),
            OUT_FMT,        OUT_LAYOUT, OUT_RATE,
        ).map_err(|e| format!("resampler: {e}"))?;
        *resampler = Some(ctx);
    }
    let Some(rs) = resampler.as_mut() else { return Ok(()) };

    let mut resampled = AudioFrame::empty();
    if rs.run(frame, &mut resampled).is_ok() && resampled.samples() > 0 {
        append_packed_f32(&resampled, out);
    }
    Ok(())
}

/// OUT_FMT is packed, so every channel is in plane 0.
fn append_packed_f32(frame: &AudioFrame, out: &mut Vec<f32>) {
    out.extend(
        frame.data(0)
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
    );
}

/// Writes interleaved stereo f32le PCM as a WAV file.
///
/// ```text
///   RIFF  <file_size - 8>  WAVE
///   fmt   16  <3 IEEE_FLOAT>  <2 ch>  <44100>  <byte_rate>  <block_align 8>  <32 bits>
///   data  <data_size>  <samples…>
/// ```
pub fn write_wav(path: &Path, samples: &[f32]) -> std::io::Result<u64> {
    const CHANNELS:     u16 = 2;
    const BITS:         u16 = 32;
    const FORMAT_FLOAT: u16 = 3;
    const BLOCK_ALIGN:  u16 = CHANNELS * (BITS / 8);

    let data_size = (samples.len() * 4) as u32;
    let byte_rate = OUT_RATE * BLOCK_ALIGN as u32;

    let mut w = std::io::BufWriter::new(File::create(path)?);
    w.write_all(b"RIFF")?;
    w.write_all(&(36u32 + data_size).to_le_bytes())?;
    w.write_all(b"WAVE")?;

    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    w.write_all(&FORMAT_FLOAT.to_le_bytes())?;
    w.write_all(&CHANNELS.to_le_bytes())?;
    w.write_all(&OUT_RATE.to_le_bytes())?;
    w.write_all(&byte_rate.to_le_bytes())?;
    w.write_all(&BLOCK_ALIGN.to_le_bytes())?;
    w.write_all(&BITS.to_le_bytes())?;

    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())?;
    for s in samples {
        w.write_all(&s.to_le_bytes())?;
    }
    w.flush()?;
    Ok((44 + data_size) as u64)
}

/// Deletes a WAV produced by `temp_wav_path`. Anything else is left alone.
pub fn cleanup_temp_wav(path: &Path) {
    let in_temp = path.parent().map(|p| p == std::env::temp_dir()).unwrap_or(false);
    let name    = path.file_name().unwrap_or_default().to_string_lossy();
    if in_temp && name.starts_with(TEMP_PREFIX) && name.ends_with(".wav") {
        match std::fs::remove_file(path) {
            Ok(())  => debug!("[audio] removed {}", path.display()),
            Err(e)  => warn!("[audio] cleanup {}: {e}", path.display()),
        }
    }
}

// ── Output ───────────────────────────────────────────────────────────────────

/// One rodio output stream (opened lazily) and at most one sink.
#[derive(Default)]
pub struct AudioOutput {
    /// Must outlive the sink.
    stream:      Option<OutputStream>,
    sink:        Option<Sink>,
    /// Set after the device failed to open, so it is not retried every tick.
    unavailable: bool,
}

impl AudioOutput {
    pub fn new() -> Self { Self::default() }

    pub fn is_active(&self) -> bool { self.sink.is_some() }

    fn ensure_stream(&mut self) -> Option<&OutputStream> {
        if self.stream.is_none() && !self.unavailable {
            match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => {
                    info!("[audio] output stream ready");
                    self.stream = Some(stream);
                }
                Err(e) => {
                    warn!("[audio] no output device: {e}");
                    self.unavailable = true;
                }
            }
        }
        self.stream.as_ref()
    }

    /// Starts `wav` at `at` with `gain`, replacing any current sink.
    pub fn start(&mut self, wav: &Path, at: Duration, gain: f32) {
        self.sink = None;
        let Some(stream) = self.ensure_stream() else { return };

        let decoder = match File::open(wav).map(BufReader::new).map_err(|e| e.to_string())
            .and_then(|r| Decoder::new(r).map_err(|e| e.to_string()))
        {
            Ok(d)  => d,
            Err(e) => { warn!("[audio] open {}: {e}", wav.display()); return; }
        };
        let sink = Sink::connect_new(stream.mixer());
        sink.append(decoder);
        if let Err(e) = sink.try_seek(at) {
            debug!("[audio] seek to {at:?}: {e}");
        }
        sink.set_volume(gain);
        sink.play();
        debug!("[audio] sink started at {:.3}s gain {gain:.2}", at.as_secs_f64());
        self.sink = Some(sink);
    }

    pub fn pause(&self) {
        if let Some(s) = &self.sink { s.pause(); }
    }

    /// Re-syncs to `at` and continues.
    pub fn resume(&self, at: Duration) {
        if let Some(s) = &self.sink {
            let _ = s.try_seek(at);
            s.play();
        }
    }

    pub fn seek(&self, at: Duration) {
        if let Some(s) = &self.sink {
            if let Err(e) = s.try_seek(at) {
                debug!("[audio] seek to {at:?}: {e}");
            }
        }
    }

    pub fn set_gain(&self, gain: f32) {
        if let Some(s) = &self.sink { s.set_volume(gain); }
    }

    pub fn stop(&mut self) {
        if let Some(s) = self.sink.take() { s.stop(); }
    }
}

/// 0–100 volume plus mute → sink gain.
pub fn gain(volume: u8, muted: bool) -> f32 {
    if muted { 0.0 } else { volume.min(100) as f32 / 100.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_header_sizes() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        let n    = write_wav(&path, &[0.0, 0.5, -0.5, 1.0]).unwrap();
        let raw  = std::fs::read(&path).unwrap();

        assert_eq!(n as usize, raw.len());
        assert_eq!(&raw[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]) as usize, raw.len() - 8);
        assert_eq!(u32::from_le_bytes([raw[40], raw[41], raw[42], raw[43]]), 16);
    }

    #[test]
    fn cleanup_ignores_foreign_files() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("{TEMP_PREFIX}x.wav"));
        std::fs::write(&path, b"x").unwrap();
        cleanup_temp_wav(&path);
        assert!(path.exists(), "outside the temp dir root, must survive");
    }

    #[test]
    fn mute_zeroes_gain() {
        assert_eq!(gain(40, true), 0.0);
        assert_eq!(gain(40, false), 0.4);
        assert_eq!(gain(250, false), 1.0);
    }
}
