use std::fmt;

/// Which formation the scene is heading toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Scattered cloud
    #[default]
    Chaos,
    /// Assembled tree
    Formed,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Chaos => Mode::Formed,
            Mode::Formed => Mode::Chaos,
        }
    }

    pub fn is_formed(self) -> bool {
        self == Mode::Formed
    }

    /// Progress value a smoothed transition converges to in this mode
    pub fn target_progress(self) -> f32 {
        match self {
            Mode::Chaos => 0.0,
            Mode::Formed => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Chaos => "CHAOS",
            Mode::Formed => "FORMED",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single writer of the scene mode; animated components only read it
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    mode: Mode,
    toggles: u64,
}

impl ModeController {
    pub fn new(mode: Mode) -> Self {
        Self { mode, toggles: 0 }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Flip between chaos and formed, returning the new mode
    pub fn toggle(&mut self) -> Mode {
        self.set(self.mode.toggled())
    }

    pub fn set(&mut self, mode: Mode) -> Mode {
        if mode != self.mode {
            self.mode = mode;
            self.toggles += 1;
            tracing::info!(mode = %mode, toggles = self.toggles, "scene mode changed");
        }
        self.mode
    }

    /// Number of effective mode changes since construction
    pub fn toggle_count(&self) -> u64 {
        self.toggles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_chaos() {
        assert_eq!(ModeController::default().mode(), Mode::Chaos);
    }

    #[test]
    fn test_toggle_flips() {
        let mut ctl = ModeController::default();
        assert_eq!(ctl.toggle(), Mode::Formed);
        assert_eq!(ctl.toggle(), Mode::Chaos);
        assert_eq!(ctl.toggle_count(), 2);
    }

    #[test]
    fn test_double_toggle_restores_target() {
        let mut ctl = ModeController::new(Mode::Formed);
        let before = ctl.mode().target_progress();
        ctl.toggle();
        ctl.toggle();
        assert_eq!(ctl.mode().target_progress(), before);
    }

    #[test]
    fn test_set_same_mode_is_not_a_toggle() {
        let mut ctl = ModeController::default();
        ctl.set(Mode::Chaos);
        assert_eq!(ctl.toggle_count(), 0);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Mode::Chaos.to_string(), "CHAOS");
        assert_eq!(Mode::Formed.to_string(), "FORMED");
    }
}
