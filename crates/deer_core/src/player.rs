use crate::health::HealthEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayerState {
    #[default]
    Alive,
    Dead,
}

/// Tracks whether the run is still going. Health drives it; the host reacts
/// to the returned transitions (freeze movement, play the death animation).
#[derive(Debug, Clone, Default)]
pub struct PlayerController {
    state: PlayerState,
}

impl PlayerController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state == PlayerState::Alive
    }

    /// Returns the new state only when the event actually changed it.
    pub fn handle(&mut self, event: &HealthEvent) -> Option<PlayerState> {
        match event {
            HealthEvent::Depleted => self.set_state(PlayerState::Dead),
            _ => None,
        }
    }

    pub fn reset(&mut self) -> Option<PlayerState> {
        self.set_state(PlayerState::Alive)
    }

    fn set_state(&mut self, state: PlayerState) -> Option<PlayerState> {
        if self.state == state {
            return None;
        }
        log::info!("Player state: {:?} -> {:?}", self.state, state);
        self.state = state;
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depletion_kills_once() {
        let mut player = PlayerController::new();
        assert_eq!(player.handle(&HealthEvent::Depleted), Some(PlayerState::Dead));
        assert_eq!(player.handle(&HealthEvent::Depleted), None);
        assert!(!player.is_alive());
    }

    #[test]
    fn other_events_do_not_change_state() {
        let mut player = PlayerController::new();
        for event in [
            HealthEvent::CriticalEntered,
            HealthEvent::AntidoteCollected,
            HealthEvent::Changed {
                current: 1.0,
                max: 100.0,
            },
        ] {
            assert_eq!(player.handle(&event), None);
        }
        assert_eq!(player.state(), PlayerState::Alive);
    }

    #[test]
    fn reset_revives_and_reports_change() {
        let mut player = PlayerController::new();
        assert_eq!(player.reset(), None);
        player.handle(&HealthEvent::Depleted);
        assert_eq!(player.reset(), Some(PlayerState::Alive));
        assert!(player.is_alive());
    }
}
