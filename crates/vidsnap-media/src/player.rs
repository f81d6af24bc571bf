// crates/vidsnap-media/src/player.rs
//
// FfmpegPlayer: the MediaPlayer implementation used by the app.
//
//   UI thread      owns FfmpegPlayer; every trait call is non-blocking except
//                  load (probe) and snapshot (one-shot decode).
//   decode thread  one per player; takes the newest command from a CommandSlot,
//                  so a slider drag only ever leaves its latest position
//                  waiting. Opens a LiveDecoder on Play/Show and publishes
//                  frames into the bound FrameSurface, paced against the
//                  shared PlaybackClock.
//   WAV thread     one per load with audio; result picked up in refresh().

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use vidsnap_core::media_types::{PlaybackFrame, StreamInfo};
use vidsnap_core::{CaptureError, FrameSnapshot, LoadError, MediaPlayer, PlaybackError, PlayerState};

use crate::audio::{self, AudioOutput};
use crate::clock::PlaybackClock;
use crate::decode::{self, LiveDecoder};
use crate::probe::probe_stream;
use crate::surface::FrameSurface;

/// Longest sleep between command checks while waiting for a frame's time.
const PACE_SLICE: Duration = Duration::from_millis(10);

// ── Decode thread ────────────────────────────────────────────────────────────

enum DecodeCmd {
    /// Decode continuously from `from` seconds, paced to the clock.
    Play { path: PathBuf, from: f64, surface: Option<FrameSurface> },
    /// Publish the single frame at `at` seconds, then idle.
    Show { path: PathBuf, at: f64, surface: Option<FrameSurface> },
    Halt,
}

/// The player was dropped.
#[derive(Debug, PartialEq)]
struct Closed;

#[derive(Default)]
struct SlotState {
    cmd:    Option<DecodeCmd>,
    closed: bool,
}

/// Latest-wins hand-off to the decode thread. Each command describes the whole
/// desired state, so a newer one replaces anything not yet picked up and the
/// UI thread never waits on a decode in progress.
#[derive(Clone, Default)]
struct CommandSlot {
    inner: Arc<(Mutex<SlotState>, Condvar)>,
}

impl CommandSlot {
    /// Returns false once the slot is closed.
    fn post(&self, cmd: DecodeCmd) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock();
        if state.closed { return false; }
        state.cmd = Some(cmd);
        cvar.notify_one();
        true
    }

    /// Non-blocking.
    fn take(&self) -> Result<Option<DecodeCmd>, Closed> {
        let mut state = self.inner.0.lock();
        if state.closed { Err(Closed) } else { Ok(state.cmd.take()) }
    }

    /// Blocks for the next command; `None` once closed and empty.
    fn wait(&self) -> Option<DecodeCmd> {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock();
        loop {
            if let Some(cmd) = state.cmd.take() { return Some(cmd); }
            if state.closed { return None; }
            cvar.wait(&mut state);
        }
    }

    fn close(&self) {
        let (lock, cvar) = &*self.inner;
        lock.lock().closed = true;
        cvar.notify_all();
    }
}

fn spawn_decode_thread(clock: PlaybackClock, eof: Arc<AtomicBool>) -> CommandSlot {
    let slot = CommandSlot::default();
    let rx   = slot.clone();
    thread::spawn(move || decode_loop(rx, clock, eof));
    slot
}

fn decode_loop(slot: CommandSlot, clock: PlaybackClock, eof: Arc<AtomicBool>) {
    let mut active:  Option<(LiveDecoder, Option<FrameSurface>)> = None;
    // Decoded but not yet due.
    let mut pending: Option<PlaybackFrame> = None;

    loop {
        let cmd = if active.is_some() {
            match slot.take() {
                Ok(c)       => c,
                Err(Closed) => return,
            }
        } else {
            match slot.wait() {
                Some(c) => Some(c),
                None    => return,
            }
        };

        if let Some(cmd) = cmd {
            pending = None;
            match cmd {
                DecodeCmd::Play { path, from, surface } => {
                    active = match LiveDecoder::open(&path, from) {
                        Ok(mut d) => {
                            // Burn the pre-roll from the keyframe so the first
                            // published frame is at `from`.
                            pending = d.frame_at(from);
                            Some((d, surface))
                        }
                        Err(e) => { warn!("[media] playback open: {e:#}"); None }
                    };
                }
                DecodeCmd::Show { path, at, surface } => {
                    active = None;
                    match LiveDecoder::open(&path, at) {
                        Ok(mut d) => {
                            if let (Some(f), Some(s)) = (d.frame_at(at), surface) {
                                s.publish(f);
                            }
                        }
                        Err(e) => warn!("[media] preview open: {e:#}"),
                    }
                }
                DecodeCmd::Halt => active = None,
            }
            continue;
        }

        let Some((d, surface)) = active.as_mut() else { continue };
        let frame = match pending.take().or_else(|| d.next_frame()) {
            Some(f) => f,
            None => {
                debug!("[media] EOF {}", d.path.display());
                eof.store(true, Ordering::Release);
                active = None;
                continue;
            }
        };

        let early = frame.timestamp - clock.secs();
        if early > 0.0 {
            thread::sleep(PACE_SLICE.min(Duration::from_secs_f64(early)));
            pending = Some(frame);
            continue;
        }
        if let Some(s) = surface { s.publish(frame); }
    }
}

// ── FfmpegPlayer ─────────────────────────────────────────────────────────────

struct Loaded {
    path:       PathBuf,
    info:       StreamInfo,
    /// Bumped per load; WAV results from older loads are discarded.
    generation: u64,
    wav:        Option<PathBuf>,
}

pub struct FfmpegPlayer {
    media:      Option<Loaded>,
    state:      PlayerState,
    clock:      PlaybackClock,
    surface:    Option<FrameSurface>,
    decode:     CommandSlot,
    eof:        Arc<AtomicBool>,
    audio:      AudioOutput,
    wav_tx:     Sender<(u64, Result<PathBuf, String>)>,
    wav_rx:     Receiver<(u64, Result<PathBuf, String>)>,
    generation: u64,
    volume:     u8,
    muted:      bool,
}

impl Default for FfmpegPlayer {
    fn default() -> Self { Self::new() }
}

impl FfmpegPlayer {
    pub fn new() -> Self {
        let clock = PlaybackClock::new();
        let eof   = Arc::new(AtomicBool::new(false));
        let (wav_tx, wav_rx) = bounded(4);
        Self {
            media:      None,
            state:      PlayerState::Stopped,
            decode:     spawn_decode_thread(clock.clone(), Arc::clone(&eof)),
            clock,
            surface:    None,
            eof,
            audio:      AudioOutput::new(),
            wav_tx,
            wav_rx,
            generation: 0,
            volume:     100,
            muted:      false,
        }
    }

    fn send(&self, cmd: DecodeCmd) -> bool {
        self.decode.post(cmd)
    }

    fn show_at(&self, secs: f64) {
        if let Some(m) = &self.media {
            self.send(DecodeCmd::Show { path: m.path.clone(), at: secs, surface: self.surface.clone() });
        }
    }

    fn gain(&self) -> f32 { audio::gain(self.volume, self.muted) }

    fn start_audio(&mut self) {
        let gain = self.gain();
        let at   = self.clock.position();
        if let Some(wav) = self.media.as_ref().and_then(|m| m.wav.clone()) {
            self.audio.start(&wav, at, gain);
        }
    }

    fn ended(&self) -> bool {
        self.state == PlayerState::Playing
            && self.eof.load(Ordering::Acquire)
            && self.clock.position().as_millis() as u64 >= self.length_millis()
    }

    fn drop_media(&mut self) {
        self.send(DecodeCmd::Halt);
        self.audio.stop();
        self.clock.reset();
        self.eof.store(false, Ordering::Release);
        if let Some(wav) = self.media.take().and_then(|m| m.wav) {
            audio::cleanup_temp_wav(&wav);
        }
        self.state = PlayerState::Stopped;
    }
}

impl FrameSnapshot for FfmpegPlayer {
    fn snapshot(&self, dest: &Path) -> Result<(), CaptureError> {
        let m = self.media.as_ref()
            .ok_or_else(|| CaptureError::Snapshot("nothing is loaded".into()))?;
        decode::save_png(&m.path, self.clock.secs(), dest)
            .map_err(|e| CaptureError::Snapshot(format!("{e:#}")))
    }
}

impl MediaPlayer for FfmpegPlayer {
    type Surface = FrameSurface;

    fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        // A failed load leaves nothing loaded, never the previous file.
        let probed = if path.is_file() {
            probe_stream(path)
        } else {
            Err(LoadError::Missing(path.to_path_buf()))
        };
        let info = match probed {
            Ok(info) => info,
            Err(e) => {
                self.release();
                return Err(e);
            }
        };

        self.drop_media();
        self.generation += 1;
        let generation = self.generation;

        if info.has_audio {
            let (src, dst, tx) = (path.to_path_buf(), audio::temp_wav_path(), self.wav_tx.clone());
            thread::spawn(move || {
                let result = audio::extract_wav(&src, &dst).map(|_| dst);
                let _ = tx.send((generation, result));
            });
        }

        self.media = Some(Loaded { path: path.to_path_buf(), info, generation, wav: None });
        self.show_at(0.0);
        info!("[media] loaded {}", path.display());
        Ok(())
    }

    fn set_output(&mut self, surface: FrameSurface) {
        self.surface = Some(surface);
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let path = self.media.as_ref()
            .map(|m| m.path.clone())
            .ok_or_else(|| PlaybackError::Play("nothing is loaded".into()))?;

        if self.state == PlayerState::Ended || self.ended() {
            self.clock.seek(Duration::ZERO);
        }
        self.eof.store(false, Ordering::Release);
        self.clock.start();

        let from = self.clock.secs();
        if !self.send(DecodeCmd::Play { path, from, surface: self.surface.clone() }) {
            self.clock.pause();
            return Err(PlaybackError::Play("decode thread is gone".into()));
        }

        if self.state == PlayerState::Paused && self.audio.is_active() {
            self.audio.resume(self.clock.position());
        } else {
            self.start_audio();
        }
        self.state = PlayerState::Playing;
        Ok(())
    }

    fn pause(&mut self) {
        if self.state != PlayerState::Playing { return; }
        self.clock.pause();
        self.send(DecodeCmd::Halt);
        self.audio.pause();
        self.state = PlayerState::Paused;
    }

    fn stop(&mut self) {
        self.send(DecodeCmd::Halt);
        self.audio.stop();
        self.clock.reset();
        self.eof.store(false, Ordering::Release);
        self.state = PlayerState::Stopped;
        self.show_at(0.0);
    }

    fn state(&self) -> PlayerState {
        if self.ended() { PlayerState::Ended } else { self.state }
    }

    fn time_millis(&self) -> u64 {
        let t   = self.clock.position().as_millis() as u64;
        let len = self.length_millis();
        if len > 0 { t.min(len) } else { t }
    }

    fn set_time_millis(&mut self, millis: u64) {
        let Some(path) = self.media.as_ref().map(|m| m.path.clone()) else { return };
        let at = Duration::from_millis(millis);
        self.clock.seek(at);
        self.eof.store(false, Ordering::Release);

        if self.state == PlayerState::Playing {
            self.send(DecodeCmd::Play { path, from: at.as_secs_f64(), surface: self.surface.clone() });
            self.audio.seek(at);
        } else {
            self.show_at(at.as_secs_f64());
        }
    }

    fn length_millis(&self) -> u64 {
        self.media.as_ref().map(|m| m.info.duration_millis).unwrap_or(0)
    }

    fn frame_rate(&self) -> Option<f64> {
        self.media.as_ref().and_then(|m| m.info.frame_rate)
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), PlaybackError> {
        if self.media.is_none() {
            return Err(PlaybackError::NoMedia);
        }
        self.volume = volume.min(100);
        self.audio.set_gain(self.gain());
        Ok(())
    }

    fn set_mute(&mut self, muted: bool) {
        self.muted = muted;
        self.audio.set_gain(self.gain());
    }

    fn release(&mut self) {
        self.drop_media();
        if let Some(s) = &self.surface { s.clear(); }
        info!("[media] released");
    }

    fn refresh(&mut self) {
        while let Ok((generation, result)) = self.wav_rx.try_recv() {
            match (self.media.as_mut(), result) {
                (Some(m), Ok(wav)) if m.generation == generation => m.wav = Some(wav),
                (_, Ok(stale))   => audio::cleanup_temp_wav(&stale),
                (_, Err(e))      => warn!("[audio] extract failed: {e}"),
            }
            if self.state == PlayerState::Playing && !self.audio.is_active() {
                self.start_audio();
            }
        }

        if self.ended() {
            debug!("[media] reached end of stream");
            self.clock.pause();
            self.audio.stop();
            self.state = PlayerState::Ended;
        }
    }
}

impl Drop for FfmpegPlayer {
    fn drop(&mut self) {
        self.drop_media();
        self.decode.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn show(at: f64) -> DecodeCmd {
        DecodeCmd::Show { path: PathBuf::from("clip.mp4"), at, surface: None }
    }

    fn at_of(cmd: Option<DecodeCmd>) -> Option<f64> {
        match cmd {
            Some(DecodeCmd::Show { at, .. }) | Some(DecodeCmd::Play { from: at, .. }) => Some(at),
            _ => None,
        }
    }

    #[test]
    fn drag_burst_never_blocks_and_keeps_only_the_newest() {
        let slot  = CommandSlot::default();
        let start = Instant::now();
        // Nobody is consuming: a bounded channel would have stalled here.
        for i in 0..1_000 {
            assert!(slot.post(show(i as f64)));
        }
        assert!(start.elapsed() < Duration::from_secs(1));

        assert_eq!(at_of(slot.take().unwrap()), Some(999.0));
        assert!(slot.take().unwrap().is_none());
    }

    #[test]
    fn waiting_thread_wakes_on_post_and_exits_on_close() {
        let slot   = CommandSlot::default();
        let reader = slot.clone();
        let worker = thread::spawn(move || {
            let first = at_of(reader.wait());
            let after_close = reader.wait().is_none();
            (first, after_close)
        });

        thread::sleep(Duration::from_millis(20));
        assert!(slot.post(DecodeCmd::Play { path: PathBuf::from("clip.mp4"), from: 2.5, surface: None }));
        thread::sleep(Duration::from_millis(20));
        slot.close();

        assert_eq!(worker.join().unwrap(), (Some(2.5), true));
        assert!(!slot.post(DecodeCmd::Halt));
        assert_eq!(slot.take().err(), Some(Closed));
    }
}
