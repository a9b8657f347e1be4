//! Tick-driven timers. Every scheduled callback in the controller is one of
//! these, advanced from `tick(dt)`; cancelling is dropping the handle.

/// One-shot countdown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timer {
    remaining: f32,
    fired: bool,
}

impl Timer {
    /// A timer that fires once `delay` seconds have been advanced.
    pub fn new(delay: f32) -> Self {
        Self {
            remaining: delay,
            fired: false,
        }
    }

    /// Seconds left before firing (may be negative after firing).
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Advance by `dt` seconds. Returns true on the one call that fires.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.fired {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.fired = true;
        }
        self.fired
    }
}

/// Repeating timer with a fixed period.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    period: f32,
    accumulated: f32,
}

impl Interval {
    pub fn new(period: f32) -> Self {
        Self {
            period,
            accumulated: 0.0,
        }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    /// Advance by `dt` seconds and return how many periods elapsed.
    /// A non-positive period elapses once per call.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if self.period <= 0.0 {
            return 1;
        }
        self.accumulated += dt.max(0.0);
        let elapsed = (self.accumulated / self.period).floor();
        self.accumulated -= elapsed * self.period;
        elapsed as u32
    }
}
