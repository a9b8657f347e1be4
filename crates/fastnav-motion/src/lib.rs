//! Adaptive fast navigation: drops expensive effects and small geometry while
//! the camera moves, then crossfades back to full quality once it settles.

pub mod compositor;
pub mod effects;
mod error;
pub mod fast_nav;
pub mod state_machine;
pub mod timer;

pub use compositor::{
    DEFAULT_FADE_DURATION, DEFAULT_FADE_INTERVAL, FadeSettings, OverlaySurface, RenderSurface,
    SurfaceRect, TransitionCompositor,
};
pub use effects::{Effect, EffectSuppression, EffectToggles, SuppressedEffects};
pub use error::CaptureError;
pub use fast_nav::{FastNav, FastNavSettings, Viewer, ViewerEvent};
pub use state_machine::{
    DEFAULT_IDLE_TIMEOUT, DEFAULT_RESTORE_DELAY, MotionHooks, MotionState, MotionStateMachine,
    MotionTimings, MotionTrigger,
};
pub use timer::{Interval, Timer};
