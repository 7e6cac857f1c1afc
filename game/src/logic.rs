use engine::GameLogic;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::GameError;
use crate::floor::HudLayout;
use crate::pile::{DigInput, PileId};
use crate::session::{GameSession, SessionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionInput {
    Tick { dt: f32, dig: DigInput },
    SpawnPile,
    EnterPile(PileId),
    LeavePile(PileId),
    MineHits(u8),
    Reinforce,
    BuyLight,
    Restart,
}

/// Replayable wrapper around [`GameSession`] for the headless runner.
#[derive(Debug, Clone)]
pub struct CavernLogic {
    template: GameSession,
}

impl CavernLogic {
    pub fn new(config: GameConfig, layout: &HudLayout) -> Result<Self, GameError> {
        Ok(Self {
            template: GameSession::new(config, layout)?,
        })
    }
}

impl GameLogic for CavernLogic {
    type State = GameSession;
    type Input = SessionInput;
    type Event = SessionEvent;

    fn initial_state(&self) -> Self::State {
        self.template.clone()
    }

    fn step(
        &self,
        state: &Self::State,
        input: Self::Input,
        events: &mut Vec<Self::Event>,
    ) -> Self::State {
        let mut next = state.clone();

        let outcome = match input {
            SessionInput::Tick { dt, dig } => Ok(next.tick(dt, dig)),
            SessionInput::SpawnPile => next.spawn_pile().map(|_| Vec::new()),
            SessionInput::EnterPile(id) => next.player_entered_pile(id).map(|()| Vec::new()),
            SessionInput::LeavePile(id) => next.player_left_pile(id),
            SessionInput::MineHits(hits) => next.report_mine_hits(hits),
            SessionInput::Reinforce => Ok(next.purchase_reinforcement()),
            SessionInput::BuyLight => Ok(next.purchase_light()),
            SessionInput::Restart => Ok(next.restart()),
        };

        match outcome {
            Ok(emitted) => events.extend(emitted),
            Err(err) if logs_rejection(&err) => log::warn!("input {input:?} rejected: {err}"),
            Err(_) => {}
        }
        next
    }
}

/// Hit counts are logged by the floor counter when it rejects them.
fn logs_rejection(err: &GameError) -> bool {
    !matches!(err, GameError::InvalidHitCount { .. })
}

#[cfg(test)]
mod tests {
    use engine::HeadlessRunner;

    use super::*;

    fn runner() -> HeadlessRunner<CavernLogic> {
        let logic = CavernLogic::new(GameConfig::default(), &HudLayout::default())
            .expect("default setup is valid");
        HeadlessRunner::new(logic)
    }

    #[test]
    fn rejected_input_still_records_a_frame() {
        let mut r = runner();
        r.step(SessionInput::MineHits(4));
        assert_eq!(r.frame(), 1);
        assert_eq!(r.state().counter().hits(), 0);
        assert!(r.events().is_empty());
    }

    #[test]
    fn rejections_are_logged_where_they_are_detected() {
        assert!(!logs_rejection(&GameError::InvalidHitCount {
            hits: 4,
            max: 3,
            reinforced: false
        }));
        assert!(logs_rejection(&GameError::UnknownPile(PileId(9))));
    }

    #[test]
    fn restart_input_recovers_from_game_over() {
        let mut config = GameConfig::default();
        config.oxygen.initial = 1.0;
        let logic = CavernLogic::new(config, &HudLayout::default()).expect("valid setup");
        let mut r = HeadlessRunner::new(logic);

        r.step(SessionInput::Tick {
            dt: 10.0,
            dig: DigInput::NONE,
        });
        assert!(r.state().is_over());

        r.step(SessionInput::Restart);
        assert!(!r.state().is_over());
        assert_eq!(r.state().display_floor(), 1);
    }

    #[test]
    fn rewinding_undoes_a_floor_break() {
        let mut r = runner();
        r.run([SessionInput::MineHits(1), SessionInput::MineHits(3)]);
        assert_eq!(r.state().display_floor(), 2);

        r.rewind(1);
        assert_eq!(r.state().display_floor(), 1);
        assert_eq!(r.state().counter().hits(), 1);
    }
}
