use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Affliction {
    Yellow = 0,
    Red = 1,
    Black = 2,
    Blue = 3,
    Faded = 4,
}

impl Affliction {
    pub const ALL: [Affliction; 5] = [
        Affliction::Yellow,
        Affliction::Red,
        Affliction::Black,
        Affliction::Blue,
        Affliction::Faded,
    ];

    /// Faded locations worsen whenever their card comes off the discovery deck.
    pub const fn infects_on_draw(self) -> bool {
        matches!(self, Affliction::Faded)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Affliction::Yellow => "Yellow",
            Affliction::Red => "Red",
            Affliction::Black => "Black",
            Affliction::Blue => "Blue",
            Affliction::Faded => "Faded",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|affliction| affliction.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for Affliction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
