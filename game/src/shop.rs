use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShopItem {
    Light,
    FloorReinforcement,
}

impl ShopItem {
    pub const ALL: [ShopItem; 2] = [ShopItem::Light, ShopItem::FloorReinforcement];

    pub fn title(self) -> &'static str {
        match self {
            Self::Light => "Shine Light",
            Self::FloorReinforcement => "Reinforce Floor",
        }
    }
}

pub const BUY_LABEL: &str = "BUY";

/// A shop entry as the HUD should draw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopListing {
    pub item: ShopItem,
    pub title: String,
    pub button: String,
    pub price: u32,
}

/// Prices scale linearly with the one-based floor number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopPrices {
    base_light: u32,
    base_wall: u32,
    light: u32,
    wall: u32,
}

impl ShopPrices {
    pub fn new(base_light: u32, base_wall: u32) -> Self {
        Self {
            base_light,
            base_wall,
            light: base_light,
            wall: base_wall,
        }
    }

    pub fn price(&self, item: ShopItem) -> u32 {
        match item {
            ShopItem::Light => self.light,
            ShopItem::FloorReinforcement => self.wall,
        }
    }

    pub fn base_price(&self, item: ShopItem) -> u32 {
        match item {
            ShopItem::Light => self.base_light,
            ShopItem::FloorReinforcement => self.base_wall,
        }
    }

    pub fn reprice(&mut self, factor: u32) -> Vec<ShopListing> {
        self.light = self.base_light.saturating_mul(factor);
        self.wall = self.base_wall.saturating_mul(factor);
        ShopItem::ALL.iter().map(|&item| self.listing(item)).collect()
    }

    pub fn listing(&self, item: ShopItem) -> ShopListing {
        ShopListing {
            item,
            title: item.title().to_string(),
            button: BUY_LABEL.to_string(),
            price: self.price(item),
        }
    }
}
