// crates/vidsnap-core/src/controller.rs
//
// PlaybackController: the play/pause/stop/seek/volume sequencer.
//
// State machine:
//
//   Idle ──load──▶ LoadedStopped ──play──▶ Playing ◀──play/pause──▶ Paused
//                       ▲                     │                       │
//                       └───────stop──────────┴───────────────────────┘
//   any ──close──▶ Idle
//
// Two writers touch the displayed position: the user (seek, step) and the
// poller. User writes land immediately and stamp `last_manual_seek_at`; the
// poller only writes once the grace window since that stamp has elapsed, so a
// drag in progress is never yanked back to the decoder's position.
//
// Every player failure is returned to the caller as a typed error and the
// controller stays in the state it was in before the call.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{ControlError, LoadError, PlaybackError};
use crate::library::VideoEntry;
use crate::player::{MediaPlayer, PlayerState, VideoSurfaceBinder};
use crate::session::PlaybackSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    LoadedStopped,
    Playing,
    Paused,
}

impl ControlState {
    /// Seeking and frame stepping are only meaningful with a running decoder.
    pub fn can_seek(self) -> bool {
        matches!(self, ControlState::Playing | ControlState::Paused)
    }
}

/// Text for the transport controls and window title, derived from the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlLabels {
    pub play_pause: &'static str,
    pub mute:       &'static str,
    pub volume:     String,
    pub title:      String,
}

pub const APP_TITLE: &str = "VidSnap";

pub fn volume_label(volume: u8, muted: bool) -> String {
    format!("{volume}{}", if muted { " (Muted)" } else { "" })
}

pub struct PlaybackController<P: MediaPlayer> {
    player:      P,
    binder:      Box<dyn VideoSurfaceBinder<Surface = P::Surface>>,
    session:     PlaybackSession,
    state:       ControlState,
    seek_grace:  Duration,
    default_fps: f64,
}

impl<P: MediaPlayer> PlaybackController<P> {
    pub fn new(
        player: P,
        binder: Box<dyn VideoSurfaceBinder<Surface = P::Surface>>,
        config: &AppConfig,
    ) -> Self {
        Self {
            player,
            binder,
            session:     PlaybackSession::new(config.initial_volume),
            state:       ControlState::Idle,
            seek_grace:  config.seek_grace(),
            default_fps: config.default_fps,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn session(&self) -> &PlaybackSession { &self.session }
    pub fn state(&self)   -> ControlState     { self.state }
    pub fn player(&self)  -> &P               { &self.player }

    /// The player, if something is loaded that a frame could be taken from.
    /// Shared borrow only: capturing must never alter playback.
    pub fn snapshot_source(&self) -> Option<(&P, &VideoEntry)> {
        if self.state == ControlState::Idle { return None; }
        self.session.current_entry.as_ref().map(|e| (&self.player, e))
    }

    /// Restores persisted audio settings before anything is loaded.
    pub fn restore_audio(&mut self, volume: u8, muted: bool) {
        self.session.volume   = volume.min(100);
        self.session.is_muted = muted;
    }

    pub fn labels(&self) -> ControlLabels {
        let title = match &self.session.current_entry {
            Some(e) => format!("{APP_TITLE} - {}", e.display_name),
            None    => APP_TITLE.to_string(),
        };
        ControlLabels {
            play_pause: if self.state == ControlState::Playing { "Pause (Space)" } else { "Play (Space)" },
            mute:       if self.session.is_muted { "Unmute" } else { "Mute" },
            volume:     format!("Volume {}", volume_label(self.session.volume, self.session.is_muted)),
            title,
        }
    }

    // ── Load / transport ─────────────────────────────────────────────────────

    /// Binds the player to `entry` and the video surface. Does not play.
    /// Whatever was active is stopped first. On failure the controller is Idle.
    pub fn load(&mut self, entry: VideoEntry) -> Result<(), LoadError> {
        if self.state != ControlState::Idle {
            self.player.stop();
        }
        self.session.clear_media();

        self.player.set_output(self.binder.surface());
        if let Err(e) = self.player.load(&entry.path) {
            warn!("[player] load failed: {e}");
            self.state = ControlState::Idle;
            return Err(e);
        }

        info!("[player] loaded {}", entry.path.display());
        self.session.duration_millis = self.player.length_millis();
        self.session.current_entry   = Some(entry);
        self.state = ControlState::LoadedStopped;
        Ok(())
    }

    /// Selection change: load the entry, then start it.
    pub fn select_and_play(&mut self, entry: VideoEntry) -> Result<(), ControlError> {
        self.load(entry)?;
        self.play()?;
        Ok(())
    }

    pub fn play(&mut self) -> Result<(), PlaybackError> {
        match self.state {
            ControlState::Idle    => return Err(PlaybackError::NoMedia),
            ControlState::Playing => return Ok(()),
            ControlState::LoadedStopped | ControlState::Paused => {}
        }

        self.player.play()?;
        self.state = ControlState::Playing;
        self.session.is_playing = true;

        // Players may reset audio on new media; push the last commanded state again.
        if let Err(e) = self.player.set_volume(self.session.volume) {
            debug!("[player] volume re-apply after play: {e}");
        }
        self.player.set_mute(self.session.is_muted);
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state != ControlState::Playing { return; }
        self.player.pause();
        self.state = ControlState::Paused;
        self.session.is_playing = false;
    }

    pub fn toggle_play_pause(&mut self) -> Result<(), PlaybackError> {
        if self.state == ControlState::Playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    pub fn stop(&mut self) {
        if self.state == ControlState::Idle { return; }
        self.player.stop();
        self.state = ControlState::LoadedStopped;
        self.session.is_playing          = false;
        self.session.position_millis     = 0;
        self.session.last_manual_seek_at = None;
    }

    /// Releases the player. The caller terminates the application afterwards.
    pub fn close(&mut self) {
        self.player.release();
        self.session.clear_media();
        self.state = ControlState::Idle;
    }

    // ── Seeking ──────────────────────────────────────────────────────────────

    /// Seeks to `millis`, clamped to the known duration. Ignored (returns false)
    /// unless playing or paused.
    pub fn seek_millis(&mut self, millis: u64, now: Instant) -> bool {
        if !self.state.can_seek() { return false; }
        let duration = self.session.duration_millis;
        let target = if duration > 0 { millis.min(duration) } else { millis };

        self.player.set_time_millis(target);
        self.session.set_position(target);
        self.session.last_manual_seek_at = Some(now);
        true
    }

    /// Seeks to a fraction of the duration; out-of-range fractions are clamped.
    pub fn seek_fraction(&mut self, fraction: f64, now: Instant) -> bool {
        let f = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let target = (f * self.session.duration_millis as f64).round() as u64;
        self.seek_millis(target, now)
    }

    /// Relative seek by whole frames. Uses the stream's rate when known,
    /// otherwise the configured default.
    pub fn step(&mut self, frames: i32, now: Instant) -> bool {
        if !self.state.can_seek() { return false; }
        let fps = self.player.frame_rate()
            .filter(|f| f.is_finite() && *f > 0.0)
            .unwrap_or(self.default_fps);
        // Float-to-int casts saturate; the integer math must too.
        let frame_ms = (1000.0 / fps) as i64;
        let now_ms   = i64::try_from(self.player.time_millis()).unwrap_or(i64::MAX);
        let target   = now_ms.saturating_add(frame_ms.saturating_mul(i64::from(frames))).max(0);
        self.seek_millis(target as u64, now)
    }

    // ── Polling ──────────────────────────────────────────────────────────────

    /// One timer tick: refresh duration, mirror the player's state and, outside
    /// the post-seek grace window, pull the position onto the display.
    pub fn poll(&mut self, now: Instant) {
        if self.state == ControlState::Idle { return; }
        self.player.refresh();

        let length = self.player.length_millis();
        if length > 0 && length != self.session.duration_millis {
            debug!("[player] duration now {length} ms");
            self.session.duration_millis = length;
            let pos = self.session.position_millis;
            self.session.set_position(pos);
        }

        if self.state == ControlState::Playing {
            match self.player.state() {
                PlayerState::Ended | PlayerState::Stopped => {
                    debug!("[player] stream finished");
                    self.state = ControlState::LoadedStopped;
                    self.session.is_playing = false;
                    return;
                }
                PlayerState::Playing | PlayerState::Paused => {}
            }

            let hands_off = self.session.last_manual_seek_at
                .map(|t| now.saturating_duration_since(t) <= self.seek_grace)
                .unwrap_or(false);
            if !hands_off {
                let pos = self.player.time_millis();
                self.session.set_position(pos);
            }
        }
    }

    // ── Audio ────────────────────────────────────────────────────────────────

    /// Clamps to 0–100 before issuing. On failure the displayed volume stays.
    pub fn set_volume(&mut self, volume: i32) -> Result<(), PlaybackError> {
        let clamped = volume.clamp(0, 100) as u8;
        match self.player.set_volume(clamped) {
            Ok(()) => {
                self.session.volume = clamped;
                Ok(())
            }
            Err(e) => {
                warn!("[player] set_volume({clamped}) failed: {e}");
                Err(PlaybackError::Volume { label: volume_label(clamped, self.session.is_muted) })
            }
        }
    }

    pub fn toggle_mute(&mut self) {
        self.session.is_muted = !self.session.is_muted;
        self.player.set_mute(self.session.is_muted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePlayer, NullBinder};
    use std::time::SystemTime;

    fn entry(name: &str) -> VideoEntry {
        VideoEntry::new(format!("/videos/{name}").into(), SystemTime::UNIX_EPOCH)
    }

    fn controller(player: FakePlayer) -> PlaybackController<FakePlayer> {
        PlaybackController::new(player, Box::new(NullBinder), &AppConfig::default())
    }

    fn playing(length: u64) -> PlaybackController<FakePlayer> {
        let mut c = controller(FakePlayer::with_length(length));
        c.select_and_play(entry("a.mp4")).unwrap();
        c
    }

    #[test]
    fn load_binds_surface_without_playing() {
        let mut c = controller(FakePlayer::with_length(10_000));
        c.load(entry("a.mp4")).unwrap();

        assert_eq!(c.state(), ControlState::LoadedStopped);
        assert_eq!(c.player().surfaces_bound, 1);
        assert_eq!(c.player().state(), PlayerState::Stopped);
        assert!(!c.session().is_playing);
        assert_eq!(c.session().duration_millis, 10_000);
    }

    #[test]
    fn failed_load_leaves_controller_idle() {
        let mut player = FakePlayer::with_length(10_000);
        player.fail_load = true;
        let mut c = controller(player);

        assert!(c.load(entry("a.mp4")).is_err());
        assert_eq!(c.state(), ControlState::Idle);
        assert!(c.session().current_entry.is_none());
    }

    #[test]
    fn failed_play_stays_loaded_stopped() {
        let mut player = FakePlayer::with_length(10_000);
        player.fail_play = true;
        let mut c = controller(player);
        c.load(entry("a.mp4")).unwrap();

        assert!(matches!(c.play(), Err(PlaybackError::Play(_))));
        assert_eq!(c.state(), ControlState::LoadedStopped);
        assert_eq!(c.labels().play_pause, "Play (Space)");
    }

    #[test]
    fn play_reapplies_audio_state() {
        let mut c = controller(FakePlayer::with_length(10_000));
        c.restore_audio(35, true);
        c.select_and_play(entry("a.mp4")).unwrap();

        assert_eq!(c.player().volume_calls.last(), Some(&35));
        assert!(c.player().muted);
        assert_eq!(c.labels().play_pause, "Pause (Space)");
    }

    #[test]
    fn pause_toggle_and_stop() {
        let mut c = playing(10_000);
        c.toggle_play_pause().unwrap();
        assert_eq!(c.state(), ControlState::Paused);
        c.toggle_play_pause().unwrap();
        assert_eq!(c.state(), ControlState::Playing);

        let now = Instant::now();
        c.seek_millis(4_000, now);
        c.stop();
        assert_eq!(c.state(), ControlState::LoadedStopped);
        assert_eq!(c.session().position_millis, 0);
        assert_eq!(c.player().state(), PlayerState::Stopped);
    }

    #[test]
    fn loading_new_entry_stops_the_old_one() {
        let mut c = playing(10_000);
        c.load(entry("b.mov")).unwrap();

        assert_eq!(c.player().stop_calls, 1);
        assert_eq!(c.state(), ControlState::LoadedStopped);
        assert_eq!(c.session().current_entry.as_ref().unwrap().display_name, "b.mov");
    }

    #[test]
    fn seek_is_ignored_when_stopped() {
        let mut c = controller(FakePlayer::with_length(10_000));
        c.load(entry("a.mp4")).unwrap();
        assert!(!c.seek_millis(1_000, Instant::now()));
        assert!(c.session().last_manual_seek_at.is_none());
    }

    #[test]
    fn seek_clamps_to_duration() {
        let mut c = playing(10_000);
        assert!(c.seek_millis(99_999, Instant::now()));
        assert_eq!(c.player().time_millis(), 10_000);
        assert_eq!(c.session().position_millis, 10_000);

        assert!(c.seek_fraction(-3.0, Instant::now()));
        assert_eq!(c.player().time_millis(), 0);
        assert!(c.seek_fraction(0.25, Instant::now()));
        assert_eq!(c.player().time_millis(), 2_500);
    }

    #[test]
    fn poller_respects_grace_window_after_seek() {
        let mut c = playing(60_000);
        let t0 = Instant::now();
        c.seek_millis(30_000, t0);

        // The decoder has not caught up yet and reports an old position.
        c.player_mut_for_test().time = 1_000;
        c.poll(t0 + Duration::from_millis(500));
        assert_eq!(c.session().position_millis, 30_000);
        c.poll(t0 + Duration::from_millis(2_000));
        assert_eq!(c.session().position_millis, 30_000);

        c.poll(t0 + Duration::from_millis(2_100));
        assert_eq!(c.session().position_millis, 1_000);
    }

    #[test]
    fn poller_writes_freely_without_manual_seek() {
        let mut c = playing(60_000);
        c.player_mut_for_test().time = 7_250;
        c.poll(Instant::now());
        assert_eq!(c.session().position_millis, 7_250);
    }

    #[test]
    fn paused_poll_does_not_move_slider() {
        let mut c = playing(60_000);
        c.pause();
        c.player_mut_for_test().time = 9_000;
        c.poll(Instant::now());
        assert_eq!(c.session().position_millis, 0);
    }

    #[test]
    fn poll_picks_up_late_duration() {
        let mut c = playing(0);
        assert_eq!(c.session().duration_millis, 0);
        c.player_mut_for_test().length = 42_000;
        c.poll(Instant::now());
        assert_eq!(c.session().duration_millis, 42_000);
    }

    #[test]
    fn end_of_stream_returns_to_stopped() {
        let mut c = playing(5_000);
        c.player_mut_for_test().state = PlayerState::Ended;
        c.poll(Instant::now());
        assert_eq!(c.state(), ControlState::LoadedStopped);
        assert!(!c.session().is_playing);
    }

    #[test]
    fn step_uses_default_fps_and_clamps_at_zero() {
        let mut c = playing(60_000);
        c.player_mut_for_test().time = 1_000;
        c.step(1, Instant::now());
        assert_eq!(c.player().time_millis(), 1_040); // 25 fps → 40 ms

        c.step(-100, Instant::now());
        assert_eq!(c.player().time_millis(), 0);
    }

    #[test]
    fn step_prefers_stream_frame_rate() {
        let mut player = FakePlayer::with_length(60_000);
        player.fps = Some(50.0);
        let mut c = controller(player);
        c.select_and_play(entry("a.mp4")).unwrap();
        c.step(3, Instant::now());
        assert_eq!(c.player().time_millis(), 60);
    }

    #[test]
    fn step_with_absurd_frame_rate_saturates() {
        let mut player = FakePlayer::with_length(0);
        player.fps = Some(1e-12);
        let mut c = controller(player);
        c.select_and_play(entry("a.mp4")).unwrap();

        c.step(i32::MAX, Instant::now());
        assert_eq!(c.player().time_millis(), i64::MAX as u64);

        c.step(i32::MIN, Instant::now());
        assert_eq!(c.player().time_millis(), 0);
    }

    #[test]
    fn set_volume_clamps_before_issuing() {
        let mut c = playing(1_000);
        c.set_volume(250).unwrap();
        assert_eq!(c.player().volume_calls.last(), Some(&100));
        c.set_volume(-7).unwrap();
        assert_eq!(c.player().volume_calls.last(), Some(&0));
        assert_eq!(c.session().volume, 0);
    }

    #[test]
    fn failed_volume_keeps_displayed_level() {
        let mut c = playing(1_000);
        c.set_volume(60).unwrap();
        c.player_mut_for_test().fail_volume = true;

        let err = c.set_volume(20).unwrap_err();
        assert!(matches!(err, PlaybackError::Volume { .. }));
        assert_eq!(c.session().volume, 60);
    }

    #[test]
    fn mute_toggle_relabels() {
        let mut c = playing(1_000);
        c.set_volume(40).unwrap();
        c.toggle_mute();
        assert!(c.player().muted);
        let labels = c.labels();
        assert_eq!(labels.mute, "Unmute");
        assert_eq!(labels.volume, "Volume 40 (Muted)");
        c.toggle_mute();
        assert_eq!(c.labels().mute, "Mute");
    }

    #[test]
    fn close_releases_player() {
        let mut c = playing(1_000);
        c.close();
        assert_eq!(c.state(), ControlState::Idle);
        assert!(c.player().released);
        assert!(c.snapshot_source().is_none());
    }

    impl PlaybackController<FakePlayer> {
        fn player_mut_for_test(&mut self) -> &mut FakePlayer { &mut self.player }
    }
}
