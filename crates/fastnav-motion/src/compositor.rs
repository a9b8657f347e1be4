//! Crossfade overlay that masks the pop when expensive effects come back on.
//!
//! On recovery the last fast-mode frame is captured and shown over the render
//! surface at full opacity, then faded out in fixed steps. The overlay is
//! re-synced to the render surface on every step since the canvas may move or
//! resize mid-fade.

use image::RgbaImage;
use tracing::{debug, trace};

use crate::error::CaptureError;
use crate::timer::Interval;

/// Default fade-out duration in seconds.
pub const DEFAULT_FADE_DURATION: f32 = 0.5;
/// Default time between opacity steps in seconds.
pub const DEFAULT_FADE_INTERVAL: f32 = 0.05;

/// Position and size of a surface, in host pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// The canvas being rendered to.
pub trait RenderSurface {
    fn surface_rect(&self) -> SurfaceRect;

    /// Read back the most recently rendered frame.
    fn capture_frame(&mut self) -> Result<RgbaImage, CaptureError>;
}

/// An image layer the host can place above the render surface.
pub trait OverlaySurface {
    /// Insert the overlay into the host's layer stack.
    fn attach(&mut self, rect: SurfaceRect);
    /// Display `image` covering `rect` at `opacity`.
    fn show(&mut self, image: RgbaImage, rect: SurfaceRect, opacity: f32);
    fn reposition(&mut self, rect: SurfaceRect);
    fn set_opacity(&mut self, opacity: f32);
    fn hide(&mut self);
    /// Remove the overlay from the host's layer stack.
    fn detach(&mut self);
}

/// Fade timing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeSettings {
    /// Seconds from full opacity to hidden.
    pub duration: f32,
    /// Seconds between opacity steps.
    pub interval: f32,
}

impl FadeSettings {
    /// Opacity removed per step.
    pub fn step_size(&self) -> f32 {
        if self.duration > 0.0 && self.interval > 0.0 {
            self.interval / self.duration
        } else {
            1.0
        }
    }
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self {
            duration: DEFAULT_FADE_DURATION,
            interval: DEFAULT_FADE_INTERVAL,
        }
    }
}

#[derive(Debug)]
struct FadeSession {
    opacity: f32,
    steps: Interval,
}

/// Owns the overlay surface and at most one running fade.
#[derive(Debug)]
pub struct TransitionCompositor<O: OverlaySurface> {
    overlay: O,
    attached: bool,
    settings: FadeSettings,
    fade: Option<FadeSession>,
}

impl<O: OverlaySurface> TransitionCompositor<O> {
    pub fn new(overlay: O, settings: FadeSettings) -> Self {
        Self {
            overlay,
            attached: false,
            settings,
            fade: None,
        }
    }

    pub fn settings(&self) -> &FadeSettings {
        &self.settings
    }

    /// Applies to the next fade started.
    pub fn set_settings(&mut self, settings: FadeSettings) {
        self.settings = settings;
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Current overlay opacity, or `None` when no fade is running.
    pub fn opacity(&self) -> Option<f32> {
        self.fade.as_ref().map(|f| f.opacity)
    }

    /// Capture the current frame and start fading it out. Any running fade
    /// is cancelled first. On error nothing is left running.
    pub fn start_fade<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<(), CaptureError> {
        self.cancel();

        let rect = surface.surface_rect();
        if rect.is_empty() {
            return Err(CaptureError::EmptySurface {
                width: rect.width,
                height: rect.height,
            });
        }
        let image = surface.capture_frame()?;

        if !self.attached {
            self.overlay.attach(rect);
            self.attached = true;
        }
        self.overlay.show(image, rect, 1.0);
        self.fade = Some(FadeSession {
            opacity: 1.0,
            steps: Interval::new(self.settings.interval),
        });
        debug!(duration = self.settings.duration, "crossfade started");
        Ok(())
    }

    /// Advance the fade by `dt` seconds. Returns true while still fading.
    pub fn step<S: RenderSurface + ?Sized>(&mut self, dt: f32, surface: &S) -> bool {
        let Some(session) = self.fade.as_mut() else {
            return false;
        };

        let steps = session.steps.advance(dt);
        if steps == 0 {
            return true;
        }

        session.opacity -= steps as f32 * self.settings.step_size();
        if session.opacity <= 0.0 {
            self.overlay.hide();
            self.fade = None;
            debug!("crossfade finished");
            return false;
        }

        let opacity = session.opacity;
        self.overlay.reposition(surface.surface_rect());
        self.overlay.set_opacity(opacity);
        trace!(opacity, "crossfade step");
        true
    }

    /// Hide the overlay and stop any fade. Safe to call at any time.
    pub fn cancel(&mut self) {
        if self.fade.take().is_some() {
            debug!("crossfade cancelled");
        }
        if self.attached {
            self.overlay.hide();
        }
    }

    /// Cancel and remove the overlay from the host.
    pub fn teardown(&mut self) {
        self.cancel();
        if self.attached {
            self.overlay.detach();
            self.attached = false;
        }
    }

    /// Tear down and hand the overlay back.
    pub fn into_overlay(mut self) -> O {
        self.teardown();
        self.overlay
    }
}
