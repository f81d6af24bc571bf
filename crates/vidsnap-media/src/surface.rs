// crates/vidsnap-media/src/surface.rs
//
// FrameSurface: latest-wins slot the decode thread publishes into and the
// preview panel uploads from. Cloning shares the slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use vidsnap_core::media_types::PlaybackFrame;

type Notify = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone, Default)]
pub struct FrameSurface {
    slot:       Arc<Mutex<Option<PlaybackFrame>>>,
    generation: Arc<AtomicU64>,
    /// Called after every publish, e.g. to wake the UI for a repaint.
    notify:     Option<Notify>,
}

impl std::fmt::Debug for FrameSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSurface")
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

impl FrameSurface {
    pub fn new() -> Self { Self::default() }

    pub fn with_notify(notify: impl Fn() + Send + Sync + 'static) -> Self {
        Self { notify: Some(Arc::new(notify)), ..Self::default() }
    }

    pub fn generation(&self) -> u64 { self.generation.load(Ordering::Acquire) }

    pub fn publish(&self, frame: PlaybackFrame) {
        *self.slot.lock() = Some(frame);
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(n) = &self.notify { n(); }
    }

    pub fn clear(&self) {
        *self.slot.lock() = None;
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(n) = &self.notify { n(); }
    }

    /// The current frame if anything changed since `seen`. `Some((gen, None))`
    /// means the surface was cleared.
    pub fn latest_since(&self, seen: u64) -> Option<(u64, Option<PlaybackFrame>)> {
        let gen = self.generation();
        if gen == seen { return None; }
        Some((gen, self.slot.lock().clone()))
    }
}
