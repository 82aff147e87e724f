//! Platform abstraction layer
//!
//! Frame scheduling behind a small trait: `requestAnimationFrame` on the web,
//! a manually pumped scheduler natively and in tests. [`FrameLoop`] keeps at
//! most one callback outstanding and cancels it on stop.

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Something that can invoke the frame callback once per display refresh
pub trait FrameScheduler {
    type Handle: Copy + PartialEq + std::fmt::Debug;

    /// Schedule one callback. `None` if the platform refused.
    fn request(&mut self) -> Option<Self::Handle>;

    /// Cancel a pending callback
    fn cancel(&mut self, handle: Self::Handle);
}

/// Owns the single pending frame request
#[derive(Debug)]
pub struct FrameLoop<S: FrameScheduler> {
    scheduler: S,
    pending: Option<S::Handle>,
}

impl<S: FrameScheduler> FrameLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            pending: None,
        }
    }

    /// Schedule the next frame unless one is already outstanding
    pub fn start(&mut self) {
        if self.pending.is_none() {
            self.pending = self.scheduler.request();
            if self.pending.is_none() {
                log::warn!("Frame request refused by platform");
            }
        }
    }

    /// Cancel the outstanding request; no frame fires afterwards
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Called when a callback fires. Returns false for a stale or cancelled callback.
    pub fn on_frame(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

/// Scheduler pumped by hand at a fixed frame interval
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    next_id: u32,
    outstanding: Vec<u32>,
    /// Timestamp handed to the next fired frame (ms)
    pub now_ms: f64,
    pub frame_ms: f64,
}

impl ManualScheduler {
    pub fn new(frame_ms: f64) -> Self {
        Self {
            next_id: 1,
            outstanding: Vec::new(),
            now_ms: 0.0,
            frame_ms,
        }
    }

    /// Number of callbacks currently scheduled
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Fire the oldest scheduled callback, returning its timestamp
    pub fn fire(&mut self) -> Option<f64> {
        if self.outstanding.is_empty() {
            return None;
        }
        self.outstanding.remove(0);
        let now = self.now_ms;
        self.now_ms += self.frame_ms;
        Some(now)
    }
}

impl FrameScheduler for ManualScheduler {
    type Handle = u32;

    fn request(&mut self) -> Option<u32> {
        let id = self.next_id;
        self.next_id += 1;
        self.outstanding.push(id);
        Some(id)
    }

    fn cancel(&mut self, handle: u32) {
        self.outstanding.retain(|id| *id != handle);
    }
}
