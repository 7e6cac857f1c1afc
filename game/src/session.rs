use std::time::Duration;

use engine::scheduler::{DeferredQueue, TaskId};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::GameError;
use crate::floor::{
    FloorAdvanced, FloorProgressionCounter, HudLayout, IconPanel, lava_volume_for_floor,
};
use crate::oxygen::OxygenMeter;
use crate::pile::{DigInput, DiggablePile, PileEvent, PileId, PileSetup, PileTransform};
use crate::sfx::{MusicState, SoundCue};
use crate::shop::{ShopItem, ShopListing, ShopPrices};

pub const GAME_OVER_BANNER: &str = "GAME OVER";

/// Everything the host has to act on after a session call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    PlaySound { cue: SoundCue, volume: Option<f32> },
    StopSound(SoundCue),
    LavaVolume(f32),
    FloorText(u32),
    FloorHidden(usize),
    BigLight { lit: bool },
    OxygenDecayRate(f32),
    ShopUpdated(ShopListing),
    Icons(IconPanel),
    PileMoved { id: PileId, transform: PileTransform },
    Pile { id: PileId, event: PileEvent },
    PlayerMovement { can_move: bool },
    Banner(String),
    GameOver,
    FadeOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverState {
    Playing,
    /// Out of air; the fade-out task is pending.
    Over { fade: TaskId },
    FadedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Deferred {
    FadeOut,
}

/// One run of the game: owns the floor counter, the piles and every
/// collaborator they used to reach through globals.
///
/// All mutation happens through the methods below, each returning the
/// events the host should render or play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    config: GameConfig,
    counter: FloorProgressionCounter,
    oxygen: OxygenMeter,
    shop: ShopPrices,
    ground_floors: Vec<bool>,
    big_light: Option<bool>,
    music: MusicState,
    lava_volume: f32,
    piles: Vec<DiggablePile>,
    next_pile: u32,
    player_can_move: bool,
    banner: Option<String>,
    game_over: GameOverState,
    timers: DeferredQueue<Deferred>,
}

impl GameSession {
    pub fn new(config: GameConfig, layout: &HudLayout) -> Result<Self, GameError> {
        let config = config.sanitized();
        let counter = FloorProgressionCounter::new(layout)?;
        Ok(Self {
            counter,
            oxygen: OxygenMeter::new(config.oxygen.initial, config.oxygen.decay_rate),
            shop: ShopPrices::new(config.shop.base_light_price, config.shop.base_wall_price),
            ground_floors: vec![true; config.floors.ground_floors],
            big_light: config.floors.big_light.then_some(false),
            music: MusicState::default(),
            lava_volume: lava_volume_for_floor(0),
            piles: Vec::new(),
            next_pile: 0,
            player_can_move: true,
            banner: None,
            game_over: GameOverState::Playing,
            timers: DeferredQueue::new(),
            config,
        })
    }

    /// Cues the host plays when the scene opens.
    pub fn opening_events(&self) -> Vec<SessionEvent> {
        vec![
            SessionEvent::Icons(self.counter.icons()),
            SessionEvent::FloorText(self.display_floor()),
            SessionEvent::PlaySound {
                cue: self.music.track(),
                volume: None,
            },
            SessionEvent::PlaySound {
                cue: SoundCue::Lava,
                volume: Some(self.lava_volume),
            },
        ]
    }

    /// Starts a fresh run on the first floor. A pending fade-out is cancelled
    /// so it cannot fire into the new run.
    pub fn restart(&mut self) -> Vec<SessionEvent> {
        if let GameOverState::Over { fade } = self.game_over {
            if self.timers.cancel(fade).is_some() {
                log::debug!("cancelled pending fade-out");
            }
        }
        log::info!("restarting from floor {}", self.display_floor());

        let mut events = vec![
            SessionEvent::StopSound(self.music.track()),
            SessionEvent::StopSound(SoundCue::Lava),
        ];
        self.set_player_can_move(true, &mut events);

        let config = &self.config;
        self.counter.reset();
        self.oxygen = OxygenMeter::new(config.oxygen.initial, config.oxygen.decay_rate);
        self.shop = ShopPrices::new(config.shop.base_light_price, config.shop.base_wall_price);
        self.ground_floors = vec![true; config.floors.ground_floors];
        self.big_light = config.floors.big_light.then_some(false);
        self.music = MusicState::default();
        self.lava_volume = lava_volume_for_floor(0);
        self.piles.clear();
        self.banner = None;
        self.game_over = GameOverState::Playing;

        events.extend(self.opening_events());
        events
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn counter(&self) -> &FloorProgressionCounter {
        &self.counter
    }

    pub fn oxygen(&self) -> &OxygenMeter {
        &self.oxygen
    }

    pub fn shop(&self) -> &ShopPrices {
        &self.shop
    }

    pub fn ground_floors(&self) -> &[bool] {
        &self.ground_floors
    }

    pub fn big_light_lit(&self) -> Option<bool> {
        self.big_light
    }

    pub fn music(&self) -> MusicState {
        self.music
    }

    pub fn lava_volume(&self) -> f32 {
        self.lava_volume
    }

    pub fn display_floor(&self) -> u32 {
        self.counter.current_floor().saturating_add(1)
    }

    pub fn piles(&self) -> &[DiggablePile] {
        &self.piles
    }

    pub fn pile(&self, id: PileId) -> Option<&DiggablePile> {
        self.piles.iter().find(|p| p.id() == id)
    }

    pub fn player_can_move(&self) -> bool {
        self.player_can_move
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn game_over(&self) -> GameOverState {
        self.game_over
    }

    pub fn is_over(&self) -> bool {
        self.game_over != GameOverState::Playing
    }

    pub fn spawn_pile(&mut self) -> Result<PileId, GameError> {
        self.spawn_pile_with(self.config.dig.pile_setup())
    }

    pub fn spawn_pile_with(&mut self, setup: PileSetup) -> Result<PileId, GameError> {
        let id = PileId(self.next_pile);
        let pile = DiggablePile::new(id, setup)?;
        self.next_pile += 1;
        self.piles.push(pile);
        log::debug!("spawned {id}");
        Ok(id)
    }

    pub fn player_entered_pile(&mut self, id: PileId) -> Result<(), GameError> {
        if self.is_over() {
            return Ok(());
        }
        self.pile_mut(id)?.player_entered();
        Ok(())
    }

    pub fn player_left_pile(&mut self, id: PileId) -> Result<Vec<SessionEvent>, GameError> {
        if self.is_over() {
            return Ok(Vec::new());
        }
        let pile_events = self.pile_mut(id)?.player_left();
        let mut events = Vec::new();
        self.forward_pile_events(id, pile_events, &mut events);
        Ok(events)
    }

    fn pile_mut(&mut self, id: PileId) -> Result<&mut DiggablePile, GameError> {
        self.piles
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(GameError::UnknownPile(id))
    }

    pub fn purchase_reinforcement(&mut self) -> Vec<SessionEvent> {
        if self.is_over() {
            return Vec::new();
        }
        self.counter.set_reinforced(true);
        vec![SessionEvent::Icons(self.counter.icons())]
    }

    pub fn purchase_light(&mut self) -> Vec<SessionEvent> {
        if self.is_over() {
            return Vec::new();
        }
        match self.big_light.as_mut() {
            Some(lit) => {
                *lit = true;
                vec![SessionEvent::BigLight { lit: true }]
            }
            None => Vec::new(),
        }
    }

    /// Reports the cumulative mine hits for the current floor. Invalid counts
    /// are rejected and leave the session untouched.
    pub fn report_mine_hits(&mut self, hits: u8) -> Result<Vec<SessionEvent>, GameError> {
        if self.is_over() {
            return Ok(Vec::new());
        }
        let report = self.counter.report_hits(hits)?;

        let mut events = Vec::new();
        if let Some(advanced) = report.advanced {
            self.apply_floor_advance(advanced, &mut events);
        }
        events.push(SessionEvent::Icons(report.icons));
        Ok(events)
    }

    fn apply_floor_advance(&mut self, advanced: FloorAdvanced, events: &mut Vec<SessionEvent>) {
        if let Some(lit) = self.big_light.as_mut() {
            *lit = false;
            events.push(SessionEvent::BigLight { lit: false });
        }
        events.push(SessionEvent::PlaySound {
            cue: SoundCue::Break,
            volume: None,
        });
        if self.music == MusicState::FirstFloor {
            events.push(SessionEvent::StopSound(SoundCue::Floor1));
            events.push(SessionEvent::PlaySound {
                cue: SoundCue::Floor2,
                volume: None,
            });
            self.music = MusicState::Deeper;
        }

        let configured = self.ground_floors.len();
        let index = usize::try_from(advanced.broken_floor).unwrap_or(usize::MAX);
        if let Some(visible) = self.ground_floors.get_mut(index) {
            *visible = false;
            events.push(SessionEvent::FloorHidden(index));
        } else {
            log::warn!(
                "no ground floor {} to break ({configured} configured)",
                advanced.broken_floor
            );
        }

        self.lava_volume = advanced.lava_volume;
        events.push(SessionEvent::LavaVolume(advanced.lava_volume));
        events.push(SessionEvent::FloorText(advanced.display_floor()));

        self.oxygen.scale_decay(advanced.decay_multiplier);
        events.push(SessionEvent::OxygenDecayRate(self.oxygen.decay_rate()));

        if self.big_light.is_some() {
            for listing in self.shop.reprice(advanced.price_factor()) {
                events.push(SessionEvent::ShopUpdated(listing));
            }
        }
    }

    pub fn price(&self, item: ShopItem) -> u32 {
        self.shop.price(item)
    }

    /// Advances the session by one frame.
    pub fn tick(&mut self, dt_seconds: f32, dig: DigInput) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if !self.is_over() {
            self.oxygen.tick(dt_seconds);
            self.update_piles(dt_seconds, dig, &mut events);
        }

        let dt = Duration::try_from_secs_f32(dt_seconds).unwrap_or(Duration::ZERO);
        for action in self.timers.advance(dt) {
            match action {
                Deferred::FadeOut => {
                    log::info!("fading out");
                    self.game_over = GameOverState::FadedOut;
                    events.push(SessionEvent::FadeOut);
                }
            }
        }

        if self.game_over == GameOverState::Playing && self.oxygen.is_empty() {
            self.enter_game_over(&mut events);
        }

        events
    }

    fn update_piles(&mut self, dt_seconds: f32, dig: DigInput, events: &mut Vec<SessionEvent>) {
        let mut frames = Vec::new();
        for pile in &mut self.piles {
            let frame = pile.update(dt_seconds, dig);
            frames.push((pile.id(), frame));
        }
        self.piles.retain(|p| !p.is_disposed());

        for (id, frame) in frames {
            if let Some(transform) = frame.transform {
                events.push(SessionEvent::PileMoved { id, transform });
            }
            self.forward_pile_events(id, frame.events, events);
        }
    }

    fn forward_pile_events(
        &mut self,
        id: PileId,
        pile_events: Vec<PileEvent>,
        events: &mut Vec<SessionEvent>,
    ) {
        for event in pile_events {
            match event {
                PileEvent::PlayerCrouched => self.set_player_can_move(false, events),
                PileEvent::PlayerReleased => self.set_player_can_move(true, events),
                _ => {}
            }
            events.push(SessionEvent::Pile { id, event });
        }
    }

    fn set_player_can_move(&mut self, can_move: bool, events: &mut Vec<SessionEvent>) {
        if self.player_can_move != can_move {
            self.player_can_move = can_move;
            events.push(SessionEvent::PlayerMovement { can_move });
        }
    }

    fn enter_game_over(&mut self, events: &mut Vec<SessionEvent>) {
        log::info!("game over on floor {}", self.display_floor());
        self.set_player_can_move(false, events);
        self.banner = Some(GAME_OVER_BANNER.to_string());
        events.push(SessionEvent::Banner(GAME_OVER_BANNER.to_string()));
        events.push(SessionEvent::GameOver);

        let fade = self
            .timers
            .schedule(self.config.game_over.fade_delay, Deferred::FadeOut);
        self.game_over = GameOverState::Over { fade };
    }
}
