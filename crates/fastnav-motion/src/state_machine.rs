//! Quality/Fast mode controller driven by motion events and frame ticks.
//!
//! ```text
//!            motion                      countdown <= 0
//!  Quality ─────────▶ Fast ──────────────────────────────▶ Fast + recovery pending
//!     ▲               ▲  │ motion: restart countdown              │      │
//!     │               │  └───────┘                                 │      │
//!     │               └────────────────── motion (interrupt) ──────┘      │
//!     └─────────────────────────── restore delay elapsed ─────────────────┘
//! ```
//!
//! The machine owns no rendering state. It tells a [`MotionHooks`]
//! implementation what to do and when.

use tracing::{debug, info};

use crate::timer::Timer;

/// Default idle time before leaving fast mode, in seconds.
pub const DEFAULT_IDLE_TIMEOUT: f32 = 0.6;
/// Default delay between starting the crossfade and restoring effects, in seconds.
pub const DEFAULT_RESTORE_DELAY: f32 = 0.1;

/// Rendering fidelity mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MotionState {
    /// Full fidelity. Nothing suppressed.
    #[default]
    Quality,
    /// Effects suppressed and detail culling active.
    Fast,
}

/// What kind of motion put the controller into fast mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionTrigger {
    CameraView,
    CameraProjection,
    CanvasResize,
    PointerDrag,
}

/// Actions the state machine requests from its owner.
pub trait MotionHooks {
    /// Suppress effects, apply detail culling, invalidate the frustum.
    fn enter_fast(&mut self, trigger: MotionTrigger);

    /// The idle timeout elapsed. Start masking the upcoming switch back to
    /// quality mode. Returns false if no masking transition could be started,
    /// in which case recovery completes immediately.
    fn begin_recovery(&mut self) -> bool;

    /// Re-enable suppressed effects and release detail culling.
    fn finish_recovery(&mut self);

    /// Abort any in-flight recovery transition.
    fn cancel_recovery(&mut self);
}

/// Idle timeout and restore delay, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionTimings {
    pub idle_timeout: f32,
    pub restore_delay: f32,
}

impl Default for MotionTimings {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            restore_delay: DEFAULT_RESTORE_DELAY,
        }
    }
}

#[derive(Debug, Default)]
pub struct MotionStateMachine {
    state: MotionState,
    /// Seconds of idleness left before recovery may start.
    countdown: f32,
    pending_recovery: Option<Timer>,
    timings: MotionTimings,
}

impl MotionStateMachine {
    pub fn new(timings: MotionTimings) -> Self {
        Self {
            timings,
            ..Default::default()
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn countdown(&self) -> f32 {
        self.countdown
    }

    pub fn is_recovery_pending(&self) -> bool {
        self.pending_recovery.is_some()
    }

    pub fn timings(&self) -> &MotionTimings {
        &self.timings
    }

    /// Applies from the next motion event.
    pub fn set_timings(&mut self, timings: MotionTimings) {
        self.timings = timings;
    }

    /// Camera, canvas or pointer motion happened.
    pub fn on_motion<H: MotionHooks + ?Sized>(&mut self, trigger: MotionTrigger, hooks: &mut H) {
        self.countdown = self.timings.idle_timeout;

        match (self.state, self.pending_recovery.take()) {
            (MotionState::Fast, None) => {}
            (MotionState::Fast, Some(_)) => {
                hooks.cancel_recovery();
                debug!(?trigger, "recovery interrupted by motion");
            }
            (MotionState::Quality, _) => {
                hooks.cancel_recovery();
                self.state = MotionState::Fast;
                hooks.enter_fast(trigger);
                debug!(?trigger, "entered fast mode");
            }
        }
    }

    /// Advance by one frame of `dt` seconds.
    pub fn tick<H: MotionHooks + ?Sized>(&mut self, dt: f32, hooks: &mut H) {
        if self.state != MotionState::Fast {
            return;
        }

        if let Some(timer) = self.pending_recovery.as_mut() {
            if timer.advance(dt) {
                self.finish(hooks);
            }
            return;
        }

        self.countdown -= dt;
        if self.countdown > 0.0 {
            return;
        }

        if hooks.begin_recovery() {
            self.pending_recovery = Some(Timer::new(self.timings.restore_delay));
            debug!(
                delay = self.timings.restore_delay,
                "idle timeout reached, recovery scheduled"
            );
        } else {
            self.finish(hooks);
        }
    }

    /// Drop all pending work and return to quality mode without calling any hook.
    pub fn reset(&mut self) {
        self.state = MotionState::Quality;
        self.countdown = 0.0;
        self.pending_recovery = None;
    }

    fn finish<H: MotionHooks + ?Sized>(&mut self, hooks: &mut H) {
        self.pending_recovery = None;
        self.state = MotionState::Quality;
        hooks.finish_recovery();
        info!("restored quality mode");
    }
}
