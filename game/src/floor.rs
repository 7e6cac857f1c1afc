use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Icon slots per HUD row. The index mapping below assumes exactly this many.
pub const ICON_SLOTS: usize = 5;
/// Hard ceiling on cumulative hits, reinforced or not.
pub const MAX_HITS: u8 = 5;
pub const BASE_CAPACITY: u8 = 3;
pub const REINFORCED_CAPACITY: u8 = 5;
/// Factor applied to the oxygen decay rate on every floor advance.
pub const DECAY_MULTIPLIER: f32 = 2.0;

/// Ambient lava volume per floor; anything past the table uses the first entry.
pub const LAVA_VOLUME_BY_FLOOR: [f32; 4] = [0.02, 0.04, 0.08, 0.12];

pub fn lava_volume_for_floor(floor: u32) -> f32 {
    usize::try_from(floor)
        .ok()
        .and_then(|i| LAVA_VOLUME_BY_FLOOR.get(i).copied())
        .unwrap_or(LAVA_VOLUME_BY_FLOOR[0])
}

/// How many icon slots the HUD actually provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudLayout {
    pub mine_icon_slots: usize,
    pub hit_icon_slots: usize,
}

impl Default for HudLayout {
    fn default() -> Self {
        Self {
            mine_icon_slots: ICON_SLOTS,
            hit_icon_slots: ICON_SLOTS,
        }
    }
}

impl HudLayout {
    pub fn validate(&self) -> Result<(), GameError> {
        for (name, slots) in [
            ("mine icons", self.mine_icon_slots),
            ("hit icons", self.hit_icon_slots),
        ] {
            if slots < ICON_SLOTS {
                return Err(GameError::MissingCollaborator {
                    name,
                    detail: format!("expected {ICON_SLOTS} slots, found {slots}"),
                });
            }
        }
        Ok(())
    }
}

pub type IconRow = [bool; ICON_SLOTS];

/// Which mine and hit icons should be visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconPanel {
    pub mines: IconRow,
    pub hits: IconRow,
}

impl IconPanel {
    /// Mines: every slot when reinforced, otherwise the top three (4, 3, 2).
    /// Hits fill from slot 4 downwards, one per hit.
    pub fn for_state(hits: u8, reinforced: bool) -> Self {
        let mut panel = Self::default();
        let first_mine = if reinforced { 0 } else { 2 };
        for slot in first_mine..ICON_SLOTS {
            panel.mines[slot] = true;
        }
        let shown = usize::from(hits).min(ICON_SLOTS);
        for slot in (ICON_SLOTS - shown)..ICON_SLOTS {
            panel.hits[slot] = true;
        }
        panel
    }

    pub fn mines_shown(&self) -> usize {
        self.mines.iter().filter(|&&on| on).count()
    }

    pub fn hits_shown(&self) -> usize {
        self.hits.iter().filter(|&&on| on).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorAdvanced {
    /// Zero-based floor the player is now on.
    pub floor: u32,
    /// The floor that just broke away.
    pub broken_floor: u32,
    pub lava_volume: f32,
    pub decay_multiplier: f32,
}

impl FloorAdvanced {
    /// One-based floor number shown in the HUD.
    pub fn display_floor(&self) -> u32 {
        self.floor.saturating_add(1)
    }

    /// Multiplier applied to base shop prices on the new floor.
    pub fn price_factor(&self) -> u32 {
        self.display_floor()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitReport {
    pub hits: u8,
    pub icons: IconPanel,
    pub advanced: Option<FloorAdvanced>,
}

/// Mine hits on the current floor. Reaching capacity breaks the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorProgressionCounter {
    hits: u8,
    reinforced: bool,
    current_floor: u32,
}

impl FloorProgressionCounter {
    pub fn new(layout: &HudLayout) -> Result<Self, GameError> {
        layout.validate()?;
        Ok(Self {
            hits: 0,
            reinforced: false,
            current_floor: 0,
        })
    }

    pub fn hits(&self) -> u8 {
        self.hits
    }

    pub fn is_reinforced(&self) -> bool {
        self.reinforced
    }

    pub fn current_floor(&self) -> u32 {
        self.current_floor
    }

    pub fn capacity(&self) -> u8 {
        if self.reinforced {
            REINFORCED_CAPACITY
        } else {
            BASE_CAPACITY
        }
    }

    pub fn icons(&self) -> IconPanel {
        IconPanel::for_state(self.hits, self.reinforced)
    }

    /// Returns whether the flag changed. Dropping reinforcement is refused
    /// once the floor already holds more hits than an unreinforced floor can.
    pub fn set_reinforced(&mut self, reinforced: bool) -> bool {
        if !reinforced && self.hits > BASE_CAPACITY {
            log::warn!(
                "cannot drop reinforcement with {} hits on floor {} (unreinforced capacity {BASE_CAPACITY})",
                self.hits,
                self.current_floor
            );
            return false;
        }
        let changed = self.reinforced != reinforced;
        self.reinforced = reinforced;
        changed
    }

    /// Back to the first floor with no hits, as at game start.
    pub fn reset(&mut self) {
        self.hits = 0;
        self.reinforced = false;
        self.current_floor = 0;
    }

    /// `hits` is the running total for this floor, not a delta.
    pub fn report_hits(&mut self, hits: u8) -> Result<HitReport, GameError> {
        let max = if self.reinforced { MAX_HITS } else { BASE_CAPACITY };
        if hits > MAX_HITS || hits > max {
            let err = GameError::InvalidHitCount {
                hits,
                max,
                reinforced: self.reinforced,
            };
            log::error!("rejected mine hit report: {err}");
            return Err(err);
        }

        self.hits = hits;
        let advanced = (self.hits == self.capacity()).then(|| self.advance_floor());

        Ok(HitReport {
            hits,
            icons: self.icons(),
            advanced,
        })
    }

    pub fn advance_floor(&mut self) -> FloorAdvanced {
        let broken_floor = self.current_floor;
        self.current_floor = self.current_floor.saturating_add(1);
        self.hits = 0;
        self.reinforced = false;

        let event = FloorAdvanced {
            floor: self.current_floor,
            broken_floor,
            lava_volume: lava_volume_for_floor(self.current_floor),
            decay_multiplier: DECAY_MULTIPLIER,
        };
        log::info!("floor {} broke, now on floor {}", broken_floor, event.display_floor());
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> FloorProgressionCounter {
        FloorProgressionCounter::new(&HudLayout::default()).expect("full HUD")
    }

    #[test]
    fn volume_table_and_fallback() {
        assert_eq!(lava_volume_for_floor(0), 0.02);
        assert_eq!(lava_volume_for_floor(1), 0.04);
        assert_eq!(lava_volume_for_floor(2), 0.08);
        assert_eq!(lava_volume_for_floor(3), 0.12);
        assert_eq!(lava_volume_for_floor(4), 0.02);
        assert_eq!(lava_volume_for_floor(u32::MAX), 0.02);
    }

    #[test]
    fn short_hud_is_rejected() {
        let err = FloorProgressionCounter::new(&HudLayout {
            mine_icon_slots: 5,
            hit_icon_slots: 4,
        })
        .expect_err("four hit slots is not enough");
        assert!(matches!(
            err,
            GameError::MissingCollaborator {
                name: "hit icons",
                ..
            }
        ));
    }

    #[test]
    fn unreinforced_icons_show_top_three_mines() {
        let panel = IconPanel::for_state(0, false);
        assert_eq!(panel.mines, [false, false, true, true, true]);
        assert_eq!(panel.hits, [false; ICON_SLOTS]);
    }

    #[test]
    fn hit_icons_fill_from_the_last_slot() {
        let panel = IconPanel::for_state(2, true);
        assert_eq!(panel.mines, [true; ICON_SLOTS]);
        assert_eq!(panel.hits, [false, false, false, true, true]);
    }

    #[test]
    fn four_hits_unreinforced_is_rejected() {
        let mut c = counter();
        c.report_hits(2).expect("two hits fit");
        let err = c.report_hits(4).expect_err("over capacity");
        assert_eq!(
            err,
            GameError::InvalidHitCount {
                hits: 4,
                max: 3,
                reinforced: false
            }
        );
        assert_eq!(c.hits(), 2);
    }

    #[test]
    fn six_hits_is_always_rejected() {
        let mut c = counter();
        c.set_reinforced(true);
        assert!(c.report_hits(6).is_err());
        assert_eq!(c.hits(), 0);
        assert!(c.is_reinforced());
    }

    #[test]
    fn third_hit_breaks_an_unreinforced_floor() {
        let mut c = counter();
        let report = c.report_hits(3).expect("three hits fit");
        let advanced = report.advanced.expect("floor broke");

        assert_eq!(advanced.floor, 1);
        assert_eq!(advanced.broken_floor, 0);
        assert_eq!(advanced.display_floor(), 2);
        assert_eq!(advanced.lava_volume, 0.04);
        assert_eq!(advanced.decay_multiplier, 2.0);
        assert_eq!(c.hits(), 0);
        assert!(!c.is_reinforced());
        assert_eq!(report.icons, IconPanel::for_state(0, false));
    }

    #[test]
    fn reinforced_floor_takes_five_hits() {
        let mut c = counter();
        c.set_reinforced(true);
        assert!(c.report_hits(3).expect("fits").advanced.is_none());
        assert!(c.report_hits(4).expect("fits").advanced.is_none());
        assert!(c.report_hits(5).expect("fits").advanced.is_some());
        assert_eq!(c.current_floor(), 1);
        assert!(!c.is_reinforced());
    }

    #[test]
    fn five_hits_unreinforced_fails() {
        let mut c = counter();
        assert!(c.report_hits(5).is_err());
        assert_eq!(c.current_floor(), 0);
    }

    #[test]
    fn reinforcement_cannot_be_dropped_above_base_capacity() {
        let mut c = counter();
        c.set_reinforced(true);
        c.report_hits(4).expect("fits when reinforced");

        assert!(!c.set_reinforced(false));
        assert!(c.is_reinforced());
        assert_eq!(c.hits(), 4);
        assert!(c.hits() <= c.capacity());
    }

    #[test]
    fn reinforcement_can_be_dropped_while_hits_fit() {
        let mut c = counter();
        c.set_reinforced(true);
        c.report_hits(3).expect("fits");

        assert!(c.set_reinforced(false));
        assert_eq!(c.capacity(), 3);
        assert_eq!(c.hits(), 3);
    }

    #[test]
    fn reset_returns_to_the_first_floor() {
        let mut c = counter();
        c.report_hits(3).expect("fits");
        c.set_reinforced(true);
        c.report_hits(2).expect("fits");
        c.reset();
        assert_eq!(c.current_floor(), 0);
        assert_eq!(c.hits(), 0);
        assert!(!c.is_reinforced());
    }

    #[test]
    fn reinforcing_does_not_touch_existing_hits() {
        let mut c = counter();
        c.report_hits(2).expect("fits");
        c.set_reinforced(true);
        assert_eq!(c.hits(), 2);
        assert_eq!(c.capacity(), 5);
    }
}
