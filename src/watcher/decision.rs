//! Whether the indicator should be shown.

/// What the indicator should look like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityDecision {
    pub visible: bool,
    /// Never set without `visible`.
    pub animating: bool,
}

impl VisibilityDecision {
    pub const HIDDEN: Self = Self {
        visible: false,
        animating: false,
    };

    pub const PULSING: Self = Self {
        visible: true,
        animating: true,
    };
}

/// What the service is doing, from its `ActiveState`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activity {
    Active,
    Activating,
    /// Anything else, including an unknown state.
    Inactive,
}

impl Activity {
    pub fn classify(active_state: Option<&str>) -> Self {
        match active_state {
            Some("active") => Self::Active,
            Some("activating") => Self::Activating,
            _ => Self::Inactive,
        }
    }

    pub fn is_running(self) -> bool {
        matches!(self, Self::Active | Self::Activating)
    }
}

/// Whether the timer `UnitFileState` means updates are scheduled.
pub fn timer_enabled(unit_file_state: Option<&str>) -> bool {
    unit_file_state == Some("enabled")
}

/// Combine the timer state and the service `ActiveState` into what to display.
pub fn decide(timer_enabled: bool, active_state: Option<&str>) -> VisibilityDecision {
    if !timer_enabled {
        return VisibilityDecision::HIDDEN;
    }

    if Activity::classify(active_state).is_running() {
        VisibilityDecision::PULSING
    } else {
        VisibilityDecision::HIDDEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVE_STATES: [Option<&str>; 7] = [
        Some("active"),
        Some("activating"),
        Some("inactive"),
        Some("failed"),
        Some("deactivating"),
        Some(""),
        None,
    ];

    #[test]
    fn visible_only_when_enabled_and_running() {
        for timer_enabled in [true, false] {
            for active_state in ACTIVE_STATES {
                let decision = decide(timer_enabled, active_state);
                let expected =
                    timer_enabled && matches!(active_state, Some("active" | "activating"));
                assert_eq!(
                    decision.visible, expected,
                    "timer_enabled={timer_enabled} active_state={active_state:?}"
                );
                assert_eq!(decision.animating, decision.visible);
            }
        }
    }

    #[test]
    fn activating_is_the_same_as_active() {
        assert_eq!(decide(true, Some("activating")), decide(true, Some("active")));
        assert!(Activity::classify(Some("activating")).is_running());
        assert!(Activity::classify(Some("active")).is_running());
    }

    #[test]
    fn unknown_states_are_inactive() {
        assert_eq!(Activity::classify(None), Activity::Inactive);
        assert_eq!(Activity::classify(Some("reloading")), Activity::Inactive);
        assert_eq!(Activity::classify(Some("ACTIVE")), Activity::Inactive);
    }

    #[test]
    fn timer_state() {
        assert!(timer_enabled(Some("enabled")));
        assert!(!timer_enabled(Some("disabled")));
        assert!(!timer_enabled(Some("enabled-runtime")));
        assert!(!timer_enabled(Some("masked")));
        assert!(!timer_enabled(None));
    }
}
