use serde::{Deserialize, Serialize};

/// Named sounds the audio collaborator knows how to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Music for the first floor.
    Floor1,
    /// Music once the first floor has broken.
    Floor2,
    /// Looping lava ambience; volume follows the current floor.
    Lava,
    Break,
}

impl SoundCue {
    pub fn name(self) -> &'static str {
        match self {
            Self::Floor1 => "Floor1",
            Self::Floor2 => "Floor2",
            Self::Lava => "Lava",
            Self::Break => "Break",
        }
    }
}

/// Which music track is playing. The swap to `Floor2` happens once per game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicState {
    #[default]
    FirstFloor,
    Deeper,
}

impl MusicState {
    pub fn track(self) -> SoundCue {
        match self {
            Self::FirstFloor => SoundCue::Floor1,
            Self::Deeper => SoundCue::Floor2,
        }
    }
}
