//! Host-side frame loop.
//!
//! One thread ticks: read the clock, snapshot the parameters, render, hand the
//! frame to the caller. Parameter writers on other threads go through
//! [`SharedParameters`]; each write is visible in full at the next snapshot
//! and never mid-frame. Cancellation is checked only between frames.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use log::{debug, info};

use crate::frame::{render_frame, FrameBuffer, FrameSettings};
use crate::params::SurfaceParameters;
use crate::shading::SurfaceShader;

// ── Shared parameters ────────────────────────────────────────────────────────

/// Cloneable handle to the live parameter set.
#[derive(Debug, Clone, Default)]
pub struct SharedParameters {
    inner: Arc<RwLock<SurfaceParameters>>,
}

impl SharedParameters {
    pub fn new(params: SurfaceParameters) -> Self {
        Self { inner: Arc::new(RwLock::new(params)) }
    }

    /// Apply a write under the lock. The closure's result is passed through.
    pub fn update<R>(&self, f: impl FnOnce(&mut SurfaceParameters) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    /// Consistent copy of the current parameters. Textures are shared, not copied.
    pub fn snapshot(&self) -> SurfaceParameters {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}

// ── Clocks ───────────────────────────────────────────────────────────────────

/// Source of elapsed seconds for each frame.
pub trait FrameClock {
    fn elapsed_seconds(&mut self) -> f32;
}

/// Wall clock, measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn elapsed_seconds(&mut self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Advances by a fixed step on every read: `start`, `start + step`, ...
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStepClock {
    pub start: f32,
    pub step: f32,
    frames: u64,
}

impl FixedStepClock {
    pub fn new(start: f32, step: f32) -> Self {
        Self { start, step, frames: 0 }
    }
}

impl FrameClock for FixedStepClock {
    fn elapsed_seconds(&mut self) -> f32 {
        let t = self.start + self.step * self.frames as f32;
        self.frames += 1;
        t
    }
}

// ── Loop ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Cross-thread stop request, honoured at the next frame boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// What the callback receives each tick.
#[derive(Debug)]
pub struct RenderedFrame<'a> {
    pub index: u64,
    pub time: f32,
    pub params: &'a SurfaceParameters,
    pub buffer: FrameBuffer,
}

pub struct FrameLoop<C: FrameClock> {
    pub settings: FrameSettings,
    params: SharedParameters,
    clock: C,
    shader: SurfaceShader,
    cancel: CancelHandle,
}

impl<C: FrameClock> FrameLoop<C> {
    pub fn new(params: SharedParameters, clock: C, settings: FrameSettings) -> Self {
        Self { settings, params, clock, shader: SurfaceShader::new(), cancel: CancelHandle::default() }
    }

    pub fn parameters(&self) -> SharedParameters {
        self.params.clone()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Tick until the callback stops or the loop is cancelled.
    /// Returns the number of frames delivered.
    pub fn run<F>(&mut self, mut on_frame: F) -> u64
    where
        F: FnMut(RenderedFrame<'_>) -> LoopControl,
    {
        info!(
            "Frame loop started: {}x{} px",
            self.settings.width, self.settings.height
        );
        let mut index = 0u64;
        while !self.cancel.is_cancelled() {
            let time = self.clock.elapsed_seconds();
            let params = self.params.snapshot().at_time(time);
            let buffer = render_frame(&self.shader, &params, &self.settings);
            debug!("frame {index} at t={time:.3}");

            let control = on_frame(RenderedFrame { index, time, params: &params, buffer });
            index += 1;
            if control == LoopControl::Stop {
                break;
            }
        }
        info!("Frame loop stopped after {index} frames");
        index
    }
}
