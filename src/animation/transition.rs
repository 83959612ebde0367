//! Exponentially smoothed progress toward the current mode's target

use super::mode::Mode;

/// Fraction of the remaining distance to close this frame, `dt * rate`
/// capped at 1 so a long frame lands on the target instead of overshooting.
#[inline]
pub fn approach_factor(dt: f32, rate: f32) -> f32 {
    (dt * rate).clamp(0.0, 1.0)
}

/// A single smoothed scalar in `[0, 1]`
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    progress: f32,
    /// Smoothing rate per second
    pub rate: f32,
}

impl Transition {
    pub fn new(rate: f32) -> Self {
        Self { progress: 0.0, rate }
    }

    /// Start already settled in a mode
    pub fn settled(rate: f32, mode: Mode) -> Self {
        Self {
            progress: mode.target_progress(),
            rate,
        }
    }

    /// Advance one frame toward the mode's target and return the new progress
    pub fn step(&mut self, mode: Mode, dt: f32) -> f32 {
        let target = mode.target_progress();
        self.progress += (target - self.progress) * approach_factor(dt, self.rate);
        self.progress
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_settled(&self, mode: Mode, epsilon: f32) -> bool {
        (self.progress - mode.target_progress()).abs() <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_chaos() {
        assert_eq!(Transition::new(2.5).progress(), 0.0);
    }

    #[test]
    fn test_monotonic_without_overshoot() {
        let mut t = Transition::new(2.5);
        let deltas = [0.016, 0.033, 0.1, 0.25, 0.008, 0.5, 0.016, 0.3];
        let mut prev = t.progress();
        for _ in 0..4 {
            for &dt in &deltas {
                let p = t.step(Mode::Formed, dt);
                assert!(p > prev || p == 1.0, "progress stalled at {}", p);
                assert!(p <= 1.0 && p >= 0.0);
                prev = p;
            }
        }
    }

    #[test]
    fn test_huge_delta_lands_on_target() {
        let mut t = Transition::new(2.5);
        assert_eq!(t.step(Mode::Formed, 10.0), 1.0);
        assert_eq!(t.step(Mode::Chaos, 10.0), 0.0);
    }

    #[test]
    fn test_reverses_toward_chaos() {
        let mut t = Transition::settled(2.5, Mode::Formed);
        let p = t.step(Mode::Chaos, 0.1);
        assert!(p < 1.0 && p > 0.0);
        assert!((p - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_zero_delta_holds() {
        let mut t = Transition::new(2.5);
        t.step(Mode::Formed, 0.1);
        let held = t.progress();
        assert_eq!(t.step(Mode::Formed, 0.0), held);
    }

    #[test]
    fn test_settled_check() {
        let mut t = Transition::new(2.5);
        for _ in 0..600 {
            t.step(Mode::Formed, 1.0 / 60.0);
        }
        assert!(t.is_settled(Mode::Formed, 1e-3));
        assert!(!t.is_settled(Mode::Chaos, 1e-3));
    }
}
