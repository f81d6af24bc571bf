// crates/vidsnap-media/src/decode.rs
//
// LiveDecoder: stateful per-file decoder used by the playback thread.
// save_png: one-shot decode of the frame at a timestamp, written as PNG at the
// stream's native resolution. Backs MediaPlayer::snapshot.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _, Result};
use tracing::{debug, info};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};
use ffmpeg::util::frame::video::Video as VideoFrame;

use vidsnap_core::media_types::PlaybackFrame;

/// Frames whose pts is within this many ticks of the target count as "at" it.
const PTS_SLACK: i64 = 2;

pub struct LiveDecoder {
    pub path:      PathBuf,
    ictx:          ffmpeg::format::context::Input,
    decoder:       ffmpeg::decoder::video::Video,
    scaler:        SwsContext,
    video_idx:     usize,
    tb_num:        i32,
    tb_den:        i32,
    /// Stream start in pts units; frame timestamps are reported relative to it.
    start_pts:     i64,
    pub last_pts:  i64,
    pub width:     u32,
    pub height:    u32,
    eof:           bool,
}

impl LiveDecoder {
    /// Opens `path` positioned at the keyframe at or before `timestamp` seconds.
    pub fn open(path: &Path, timestamp: f64) -> Result<Self> {
        let mut ictx = input(path).with_context(|| format!("open {}", path.display()))?;

        // Build the decoder inside a scope so the stream borrow of ictx ends
        // before the seek below.
        let (video_idx, tb_num, tb_den, start_pts, decoder) = {
            let stream = ictx.streams().best(Type::Video)
                .ok_or_else(|| anyhow!("no video stream"))?;
            let tb      = stream.time_base();
            let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
            (stream.index(), tb.numerator(), tb.denominator(), stream.start_time().max(0), dec_ctx.decoder().video()?)
        };
        if tb_num <= 0 || tb_den <= 0 {
            return Err(anyhow!("invalid time base {tb_num}/{tb_den}"));
        }

        let (width, height) = (decoder.width().max(2), decoder.height().max(2));
        let scaler = SwsContext::get(
            decoder.format(), decoder.width(), decoder.height(),
            Pixel::RGBA, width, height, Flags::BILINEAR,
        )?;

        let mut d = Self {
            path: path.to_path_buf(), ictx, decoder, scaler, video_idx,
            tb_num, tb_den, start_pts, last_pts: start_pts, width, height, eof: false,
        };
        d.seek(timestamp);
        Ok(d)
    }

    pub fn ts_to_pts(&self, t: f64) -> i64 {
        self.start_pts + (t * self.tb_den as f64 / self.tb_num as f64) as i64
    }

    pub fn pts_to_secs(&self, pts: i64) -> f64 {
        (pts - self.start_pts) as f64 * self.tb_num as f64 / self.tb_den as f64
    }

    /// Backward seek to the keyframe before `timestamp`. A failed seek is soft:
    /// decoding continues from wherever the demuxer is.
    fn seek(&mut self, timestamp: f64) {
        if timestamp <= 0.0 { return; }
        let target = (timestamp * ffmpeg::ffi::AV_TIME_BASE as f64) as i64;
        if let Err(e) = self.ictx.seek(target, ..=target) {
            debug!("[media] seek soft-fail at {timestamp:.3}s: {e}");
        }
        self.decoder.flush();
        self.eof = false;
    }

    /// Next decoded (unscaled) frame, draining the decoder before reading more
    /// packets. None once the stream is exhausted.
    fn decode_next(&mut self) -> Option<VideoFrame> {
        let mut decoded = VideoFrame::empty();
        loop {
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(self.last_pts + 1);
                self.last_pts = pts;
                return Some(decoded);
            }
            if self.eof { return None; }
            match self.ictx.packets().next() {
                Some(Ok((stream, packet))) => {
                    if stream.index() != self.video_idx { continue; }
                    let _ = self.decoder.send_packet(&packet);
                }
                Some(Err(_)) | None => {
                    let _ = self.decoder.send_eof();
                    self.eof = true;
                }
            }
        }
    }

    fn to_playback(&mut self, decoded: &VideoFrame) -> Option<PlaybackFrame> {
        let mut out = VideoFrame::empty();
        self.scaler.run(decoded, &mut out).ok()?;
        // Destripe: copy only visible pixels, not stride padding.
        let stride    = out.stride(0);
        let raw       = out.data(0);
        let row_bytes = self.width as usize * 4;
        let data: Vec<u8> = (0..self.height as usize)
            .flat_map(|row| &raw[row * stride..row * stride + row_bytes])
            .copied()
            .collect();
        Some(PlaybackFrame {
            timestamp: self.pts_to_secs(self.last_pts).max(0.0),
            width:     self.width,
            height:    self.height,
            data,
        })
    }

    /// Sequential decode. Returns None at EOF.
    pub fn next_frame(&mut self) -> Option<PlaybackFrame> {
        let decoded = self.decode_next()?;
        self.to_playback(&decoded)
    }

    /// First frame at or after `timestamp`. Frames before it are decoded but
    /// not scaled. Falls back to the last frame when the target is past EOF.
    pub fn frame_at(&mut self, timestamp: f64) -> Option<PlaybackFrame> {
        let target = self.ts_to_pts(timestamp);
        let mut last: Option<VideoFrame> = None;
        while let Some(decoded) = self.decode_next() {
            if self.last_pts + PTS_SLACK >= target {
                return self.to_playback(&decoded);
            }
            last = Some(decoded);
        }
        let decoded = last?;
        self.to_playback(&decoded)
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────────────

/// Decodes the frame shown at `timestamp` and writes it to `dest` as RGBA PNG.
pub fn save_png(path: &Path, timestamp: f64, dest: &Path) -> Result<()> {
    let mut d = LiveDecoder::open(path, timestamp)?;
    let frame = d.frame_at(timestamp)
        .ok_or_else(|| anyhow!("no frame found at t={timestamp:.3}"))?;
    write_png(dest, &frame)?;
    info!("[media] PNG saved {}x{} @ {:.3}s → {}", frame.width, frame.height, frame.timestamp, dest.display());
    Ok(())
}

pub fn write_png(dest: &Path, frame: &PlaybackFrame) -> Result<()> {
    let file = File::create(dest).with_context(|| format!("create {}", dest.display()))?;
    let w    = &mut BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, frame.width, frame.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.data)?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_roundtrips_dimensions() {
        let dir   = tempfile::tempdir().unwrap();
        let dest  = dir.path().join("f.png");
        let frame = PlaybackFrame { timestamp: 0.0, width: 3, height: 2, data: vec![200; 3 * 2 * 4] };
        write_png(&dest, &frame).unwrap();

        let decoder = png::Decoder::new(std::io::BufReader::new(File::open(&dest).unwrap()));
        let reader  = decoder.read_info().unwrap();
        assert_eq!((reader.info().width, reader.info().height), (3, 2));
        assert_eq!(reader.info().color_type, png::ColorType::Rgba);
    }
}
