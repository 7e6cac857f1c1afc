use std::fmt;

use engine::lerp::Segment;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::dig::{DigPhase, DigProgressTracker, DigTick};
use crate::error::GameError;

/// Uniform scale the hole reaches when the pile is fully dug.
pub const HOLE_FULL_SCALE: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PileId(pub u32);

impl fmt::Display for PileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pile#{}", self.0)
    }
}

/// Scene values a pile is spawned with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PileSetup {
    pub pile_scale: Vec3,
    pub prize_position: Vec3,
    pub unearthed_height: f32,
    pub dig_rate: f32,
}

/// The dig key's state for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigInput {
    pub pressed: bool,
    pub held: bool,
    pub released: bool,
}

impl DigInput {
    pub const NONE: Self = Self {
        pressed: false,
        held: false,
        released: false,
    };

    pub fn press() -> Self {
        Self {
            pressed: true,
            held: true,
            released: false,
        }
    }

    pub fn hold() -> Self {
        Self {
            pressed: false,
            held: true,
            released: false,
        }
    }

    pub fn release() -> Self {
        Self {
            pressed: false,
            held: false,
            released: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PileTransform {
    pub pile_scale: Vec3,
    pub hole_scale: Vec3,
    pub prize_position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PileEvent {
    /// Dirt particles should start.
    DirtStarted,
    DirtStopped,
    /// Player is locked in place and crouching.
    PlayerCrouched,
    PlayerReleased,
    PrizeUnearthed,
    DisposePile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PileFrame {
    pub transform: Option<PileTransform>,
    pub events: Vec<PileEvent>,
}

/// A mound of dirt with a prize buried inside.
///
/// The tracker's progress drives three tweens at once: the pile flattens on
/// its z axis, the hole under it opens, and the prize rises to its unearthed
/// height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiggablePile {
    id: PileId,
    tracker: DigProgressTracker,
    pile: Segment,
    hole: Segment,
    prize: Segment,
    player_in_range: bool,
    player_crouched: bool,
    /// Dirt particles are running; every `DirtStarted` gets one `DirtStopped`.
    #[serde(default)]
    dirt_playing: bool,
    disposed: bool,
}

impl DiggablePile {
    pub fn new(id: PileId, setup: PileSetup) -> Result<Self, GameError> {
        let tracker = DigProgressTracker::new(setup.dig_rate)?;
        let flattened = Vec3::new(setup.pile_scale.x, setup.pile_scale.y, 0.0);
        Ok(Self {
            id,
            tracker,
            pile: Segment::new(setup.pile_scale, flattened),
            hole: Segment::new(Vec3::ZERO, Vec3::splat(HOLE_FULL_SCALE)),
            prize: Segment::new(
                setup.prize_position,
                Vec3::new(0.0, setup.unearthed_height, 0.0),
            ),
            player_in_range: false,
            player_crouched: false,
            dirt_playing: false,
            disposed: false,
        })
    }

    pub fn id(&self) -> PileId {
        self.id
    }

    pub fn progress(&self) -> f32 {
        self.tracker.progress()
    }

    pub fn phase(&self) -> DigPhase {
        self.tracker.phase()
    }

    pub fn player_in_range(&self) -> bool {
        self.player_in_range
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn transform(&self) -> PileTransform {
        let t = self.tracker.progress();
        self.transform_at(t, t, t)
    }

    fn transform_at(&self, shrink: f32, open: f32, rise: f32) -> PileTransform {
        PileTransform {
            pile_scale: self.pile.at(shrink),
            hole_scale: self.hole.at(open),
            prize_position: self.prize.at(rise),
        }
    }

    pub fn player_entered(&mut self) {
        if self.disposed {
            return;
        }
        log::debug!("player entered {}", self.id);
        self.player_in_range = true;
        self.tracker.set_active(true);
    }

    pub fn player_left(&mut self) -> Vec<PileEvent> {
        if self.disposed {
            return Vec::new();
        }
        log::debug!("player left {}", self.id);
        self.player_in_range = false;
        self.tracker.set_active(false);

        let mut events = Vec::new();
        self.stop_dirt(&mut events);
        self.release_player(&mut events);
        events
    }

    pub fn dirt_playing(&self) -> bool {
        self.dirt_playing
    }

    fn stop_dirt(&mut self, events: &mut Vec<PileEvent>) {
        if self.dirt_playing {
            self.dirt_playing = false;
            events.push(PileEvent::DirtStopped);
        }
    }

    fn release_player(&mut self, events: &mut Vec<PileEvent>) {
        if self.player_crouched {
            self.player_crouched = false;
            events.push(PileEvent::PlayerReleased);
        }
    }

    pub fn update(&mut self, dt_seconds: f32, input: DigInput) -> PileFrame {
        let mut frame = PileFrame::default();
        if self.disposed || !self.player_in_range {
            return frame;
        }

        if input.pressed && !self.dirt_playing {
            self.dirt_playing = true;
            frame.events.push(PileEvent::DirtStarted);
        }

        if input.held {
            if !self.player_crouched {
                self.player_crouched = true;
                frame.events.push(PileEvent::PlayerCrouched);
            }
            let tick = self.tracker.tick(dt_seconds);
            frame.transform = Some(self.apply(tick));
            if tick.completed {
                self.finish(&mut frame.events);
                return frame;
            }
        }

        if input.released {
            self.stop_dirt(&mut frame.events);
            self.release_player(&mut frame.events);
        }

        frame
    }

    fn apply(&self, tick: DigTick) -> PileTransform {
        self.transform_at(tick.pile_shrink, tick.hole_open, tick.prize_rise)
    }

    fn finish(&mut self, events: &mut Vec<PileEvent>) {
        log::debug!("{} dug up", self.id);
        self.stop_dirt(events);
        events.push(PileEvent::PrizeUnearthed);
        self.release_player(events);
        events.push(PileEvent::DisposePile);
        self.player_in_range = false;
        self.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> PileSetup {
        PileSetup {
            pile_scale: Vec3::new(2.0, 2.0, 4.0),
            prize_position: Vec3::new(0.0, -3.0, 0.0),
            unearthed_height: 1.0,
            dig_rate: 0.5,
        }
    }

    fn pile() -> DiggablePile {
        DiggablePile::new(PileId(1), setup()).expect("valid setup")
    }

    #[test]
    fn fresh_pile_starts_full_with_closed_hole() {
        let p = pile();
        let t = p.transform();
        assert_eq!(t.pile_scale, Vec3::new(2.0, 2.0, 4.0));
        assert_eq!(t.hole_scale, Vec3::ZERO);
        assert_eq!(t.prize_position, Vec3::new(0.0, -3.0, 0.0));
    }

    #[test]
    fn digging_out_of_range_does_nothing() {
        let mut p = pile();
        let frame = p.update(1.0, DigInput::press());
        assert!(frame.events.is_empty());
        assert_eq!(p.progress(), 0.0);
    }

    #[test]
    fn half_dig_moves_every_tween_halfway() {
        let mut p = pile();
        p.player_entered();
        let frame = p.update(1.0, DigInput::press());

        assert_eq!(
            frame.events,
            vec![PileEvent::DirtStarted, PileEvent::PlayerCrouched]
        );
        let t = frame.transform.expect("held input reshapes the pile");
        assert_eq!(t.pile_scale, Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(t.hole_scale, Vec3::splat(15.0));
        assert_eq!(t.prize_position, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn releasing_stops_dirt_and_frees_player() {
        let mut p = pile();
        p.player_entered();
        p.update(0.5, DigInput::press());
        let frame = p.update(0.0, DigInput::release());
        assert_eq!(
            frame.events,
            vec![PileEvent::DirtStopped, PileEvent::PlayerReleased]
        );
        assert!(frame.transform.is_none());
    }

    #[test]
    fn leaving_mid_dig_releases_player_and_keeps_progress() {
        let mut p = pile();
        p.player_entered();
        p.update(1.0, DigInput::press());
        assert_eq!(
            p.player_left(),
            vec![PileEvent::DirtStopped, PileEvent::PlayerReleased]
        );
        assert_eq!(p.phase(), DigPhase::Idle);

        p.player_entered();
        p.update(0.5, DigInput::hold());
        assert_eq!(p.progress(), 0.75);
    }

    #[test]
    fn leaving_mid_dig_stops_the_dirt_it_started() {
        let mut p = pile();
        p.player_entered();
        let started = p.update(0.5, DigInput::press());
        assert!(started.events.contains(&PileEvent::DirtStarted));
        assert!(p.dirt_playing());

        assert_eq!(
            p.player_left(),
            vec![PileEvent::DirtStopped, PileEvent::PlayerReleased]
        );
        assert!(!p.dirt_playing());
        assert_eq!(p.update(0.0, DigInput::release()), PileFrame::default());
    }

    #[test]
    fn leaving_without_digging_emits_nothing() {
        let mut p = pile();
        p.player_entered();
        assert!(p.player_left().is_empty());
    }

    #[test]
    fn completing_frame_unearths_prize_and_disposes() {
        let mut p = pile();
        p.player_entered();
        p.update(1.0, DigInput::press());
        let frame = p.update(1.0, DigInput::hold());

        assert_eq!(
            frame.events,
            vec![
                PileEvent::DirtStopped,
                PileEvent::PrizeUnearthed,
                PileEvent::PlayerReleased,
                PileEvent::DisposePile,
            ]
        );
        let t = frame.transform.expect("final transform");
        assert_eq!(t.pile_scale.z, 0.0);
        assert_eq!(t.prize_position, Vec3::new(0.0, 1.0, 0.0));
        assert!(p.is_disposed());

        p.player_entered();
        assert_eq!(p.update(1.0, DigInput::hold()), PileFrame::default());
    }
}
