// crates/vidsnap-capture/src/worker.rs
//
// CaptureWorker: one background thread that finishes captures in submission
// order. The UI submits a CaptureRequest right after the snapshot and drains
// `rx` once per frame.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;
use vidsnap_core::CaptureError;

use crate::pipeline::{discard, finish_capture, CaptureOptions, CaptureOutcome, CaptureRequest};
use crate::probe::StreamProbe;

/// Pending jobs beyond this are refused with `CaptureError::Busy`.
const QUEUE_DEPTH: usize = 16;

#[derive(Debug)]
pub enum CaptureEvent {
    Done(CaptureOutcome),
    Failed { job_id: Uuid, error: CaptureError },
    Cancelled { job_id: Uuid },
}

impl CaptureEvent {
    pub fn job_id(&self) -> Uuid {
        match self {
            CaptureEvent::Done(o)                => o.job_id,
            CaptureEvent::Failed { job_id, .. }  => *job_id,
            CaptureEvent::Cancelled { job_id }   => *job_id,
        }
    }
}

struct Job {
    req:    CaptureRequest,
    cancel: Arc<AtomicBool>,
}

type CancelMap = Arc<Mutex<HashMap<Uuid, Arc<AtomicBool>>>>;

pub struct CaptureWorker {
    pub rx:  Receiver<CaptureEvent>,
    job_tx:  Option<Sender<Job>>,
    /// Per-job cancel flags, removed once the job reports back.
    cancels: CancelMap,
    thread:  Option<JoinHandle<()>>,
}

impl CaptureWorker {
    pub fn new(probe: Box<dyn StreamProbe>, options: CaptureOptions) -> Self {
        let (job_tx, job_rx) = bounded::<Job>(QUEUE_DEPTH);
        let (tx, rx)         = bounded::<CaptureEvent>(64);
        let cancels: CancelMap = Arc::new(Mutex::new(HashMap::new()));

        let cancels_ref = Arc::clone(&cancels);
        let thread = thread::spawn(move || {
            // Ends when every Sender<Job> is gone.
            for Job { req, cancel } in job_rx.iter() {
                let job_id = req.job_id;
                let event = match finish_capture(req, probe.as_ref(), &cancel, &options) {
                    Ok(outcome)                 => CaptureEvent::Done(outcome),
                    Err(CaptureError::Cancelled) => CaptureEvent::Cancelled { job_id },
                    Err(error)                  => CaptureEvent::Failed { job_id, error },
                };
                cancels_ref.lock().remove(&job_id);
                if tx.send(event).is_err() { return; }
            }
            debug!("[capture] worker exiting");
        });

        Self { rx, job_tx: Some(job_tx), cancels, thread: Some(thread) }
    }

    /// Queues `req`. On refusal the partial file is removed before returning.
    pub fn submit(&self, req: CaptureRequest) -> Result<Uuid, CaptureError> {
        let Some(job_tx) = &self.job_tx else {
            discard(&req);
            return Err(CaptureError::Cancelled);
        };
        let job_id = req.job_id;
        let cancel = Arc::new(AtomicBool::new(false));

        // Register before sending so an immediate cancel() finds the flag.
        self.cancels.lock().insert(job_id, Arc::clone(&cancel));

        match job_tx.try_send(Job { req, cancel }) {
            Ok(()) => Ok(job_id),
            Err(e) => {
                self.cancels.lock().remove(&job_id);
                let busy = matches!(e, TrySendError::Full(_));
                discard(&e.into_inner().req);
                warn!("[capture] refused {job_id} (queue full: {busy})");
                Err(if busy { CaptureError::Busy } else { CaptureError::Cancelled })
            }
        }
    }

    /// Flags `job_id`; the worker drops it at its next checkpoint.
    pub fn cancel(&self, job_id: Uuid) {
        if let Some(flag) = self.cancels.lock().get(&job_id) {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Jobs submitted but not yet reported on `rx`.
    pub fn in_flight(&self) -> usize {
        self.cancels.lock().len()
    }

    /// Cancels everything outstanding and waits for the thread to run dry, so
    /// no partial file outlives the worker. Returns the events nobody drained.
    pub fn shutdown(&mut self) -> Vec<CaptureEvent> {
        for flag in self.cancels.lock().values() {
            flag.store(true, Ordering::Relaxed);
        }
        self.job_tx = None;

        let Some(thread) = self.thread.take() else { return Vec::new() };

        // Draining keeps the worker from blocking on a full event channel.
        // Disconnected means it dropped its sender on the way out.
        let late: Vec<CaptureEvent> = self.rx.iter().collect();
        if thread.join().is_err() {
            warn!("[capture] worker panicked");
        }
        debug!("[capture] shut down with {} undrained event(s)", late.len());
        late
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
