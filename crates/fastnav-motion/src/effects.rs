//! Expensive shading effects that are switched off while the camera moves.

/// A suppressible rendering effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Physically-based shading.
    Pbr,
    /// Screen-space ambient occlusion.
    AmbientOcclusion,
    /// Edge enhancement.
    Edges,
}

impl Effect {
    pub const ALL: [Effect; 3] = [Effect::Pbr, Effect::AmbientOcclusion, Effect::Edges];
}

/// Host-side effect switches.
pub trait EffectToggles {
    fn effect_enabled(&self, effect: Effect) -> bool;
    fn set_effect_enabled(&mut self, effect: Effect, enabled: bool);
}

/// Which effects to hide while moving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectSuppression {
    pub pbr: bool,
    pub ambient_occlusion: bool,
    pub edges: bool,
}

impl EffectSuppression {
    /// Suppress nothing.
    pub const NONE: EffectSuppression = EffectSuppression {
        pbr: false,
        ambient_occlusion: false,
        edges: false,
    };

    pub fn hides(&self, effect: Effect) -> bool {
        match effect {
            Effect::Pbr => self.pbr,
            Effect::AmbientOcclusion => self.ambient_occlusion,
            Effect::Edges => self.edges,
        }
    }
}

impl Default for EffectSuppression {
    fn default() -> Self {
        Self {
            pbr: true,
            ambient_occlusion: true,
            edges: true,
        }
    }
}

/// Effects this controller has switched off and still owes a re-enable.
///
/// Only effects that were on when suppression began are recorded, so an
/// effect the host had disabled itself is never turned back on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuppressedEffects {
    effects: Vec<Effect>,
}

impl SuppressedEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch off every enabled effect that `flags` hides.
    pub fn suppress<T: EffectToggles + ?Sized>(&mut self, flags: &EffectSuppression, toggles: &mut T) {
        for effect in Effect::ALL {
            if flags.hides(effect) && toggles.effect_enabled(effect) {
                toggles.set_effect_enabled(effect, false);
                if !self.effects.contains(&effect) {
                    self.effects.push(effect);
                }
            }
        }
    }

    /// Re-enable everything previously suppressed. Returns how many effects
    /// were switched back on.
    pub fn restore<T: EffectToggles + ?Sized>(&mut self, toggles: &mut T) -> usize {
        let count = self.effects.len();
        for effect in self.effects.drain(..) {
            toggles.set_effect_enabled(effect, true);
        }
        count
    }

    pub fn contains(&self, effect: Effect) -> bool {
        self.effects.contains(&effect)
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Toggles {
        enabled: [bool; 3],
        writes: usize,
    }

    fn slot(effect: Effect) -> usize {
        match effect {
            Effect::Pbr => 0,
            Effect::AmbientOcclusion => 1,
            Effect::Edges => 2,
        }
    }

    impl EffectToggles for Toggles {
        fn effect_enabled(&self, effect: Effect) -> bool {
            self.enabled[slot(effect)]
        }

        fn set_effect_enabled(&mut self, effect: Effect, enabled: bool) {
            self.enabled[slot(effect)] = enabled;
            self.writes += 1;
        }
    }

    #[test]
    fn test_suppress_and_restore() {
        let mut toggles = Toggles {
            enabled: [true; 3],
            writes: 0,
        };
        let mut suppressed = SuppressedEffects::new();
        suppressed.suppress(&EffectSuppression::default(), &mut toggles);
        assert_eq!(toggles.enabled, [false; 3]);

        assert_eq!(suppressed.restore(&mut toggles), 3);
        assert_eq!(toggles.enabled, [true; 3]);
        assert!(suppressed.is_empty());
    }

    #[test]
    fn test_only_flagged_effects_are_touched() {
        let mut toggles = Toggles {
            enabled: [true; 3],
            writes: 0,
        };
        let flags = EffectSuppression {
            edges: false,
            ..Default::default()
        };
        let mut suppressed = SuppressedEffects::new();
        suppressed.suppress(&flags, &mut toggles);
        assert_eq!(toggles.enabled, [false, false, true]);
        assert!(!suppressed.contains(Effect::Edges));
    }

    #[test]
    fn test_host_disabled_effect_stays_disabled() {
        let mut toggles = Toggles {
            enabled: [true, false, true],
            writes: 0,
        };
        let mut suppressed = SuppressedEffects::new();
        suppressed.suppress(&EffectSuppression::default(), &mut toggles);
        suppressed.restore(&mut toggles);
        assert_eq!(toggles.enabled, [true, false, true]);
    }

    #[test]
    fn test_repeated_suppress_keeps_record() {
        let mut toggles = Toggles {
            enabled: [true; 3],
            writes: 0,
        };
        let mut suppressed = SuppressedEffects::new();
        suppressed.suppress(&EffectSuppression::default(), &mut toggles);
        // Second call sees everything already off but must not forget it.
        suppressed.suppress(&EffectSuppression::default(), &mut toggles);
        assert_eq!(toggles.writes, 3);
        assert_eq!(suppressed.restore(&mut toggles), 3);
        assert_eq!(toggles.enabled, [true; 3]);
    }

    #[test]
    fn test_none_suppresses_nothing() {
        let mut toggles = Toggles {
            enabled: [true; 3],
            writes: 0,
        };
        let mut suppressed = SuppressedEffects::new();
        suppressed.suppress(&EffectSuppression::NONE, &mut toggles);
        assert_eq!(toggles.writes, 0);
        assert!(suppressed.is_empty());
    }
}
