use core::str::FromStr;

use serde::{Deserialize, Serialize};

use tiredesk_core::{DomainError, ValueObject};

/// Mounting price tier, derived from the rim diameter in inches ("Zoll").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RimTier {
    /// Up to 17".
    Low,
    /// 18" and 19".
    Mid,
    /// 20" and larger.
    High,
}

impl RimTier {
    pub fn from_diameter(rim_diameter: u32) -> Self {
        match rim_diameter {
            0..=17 => RimTier::Low,
            18..=19 => RimTier::Mid,
            _ => RimTier::High,
        }
    }
}

/// Wheel change ("Radwechsel") package: how many wheels are swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WheelChangeTier {
    One,
    Two,
    Three,
    Four,
}

impl ValueObject for WheelChangeTier {}

impl WheelChangeTier {
    pub const ALL: [WheelChangeTier; 4] = [
        WheelChangeTier::One,
        WheelChangeTier::Two,
        WheelChangeTier::Three,
        WheelChangeTier::Four,
    ];

    pub fn wheels(self) -> u8 {
        match self {
            WheelChangeTier::One => 1,
            WheelChangeTier::Two => 2,
            WheelChangeTier::Three => 3,
            WheelChangeTier::Four => 4,
        }
    }

    /// Human label used on quotes, e.g. "4 wheels".
    pub fn label(self) -> &'static str {
        match self {
            WheelChangeTier::One => "1 wheel",
            WheelChangeTier::Two => "2 wheels",
            WheelChangeTier::Three => "3 wheels",
            WheelChangeTier::Four => "4 wheels",
        }
    }
}

impl TryFrom<u8> for WheelChangeTier {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(WheelChangeTier::One),
            2 => Ok(WheelChangeTier::Two),
            3 => Ok(WheelChangeTier::Three),
            4 => Ok(WheelChangeTier::Four),
            other => Err(DomainError::validation(format!(
                "wheel change tier must be 1-4, got {other}"
            ))),
        }
    }
}

impl From<WheelChangeTier> for u8 {
    fn from(value: WheelChangeTier) -> Self {
        value.wheels()
    }
}

impl FromStr for WheelChangeTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u8 = s.trim().parse().map_err(|_| {
            DomainError::validation(format!("wheel change tier must be 1-4, got '{s}'"))
        })?;
        Self::try_from(n)
    }
}
