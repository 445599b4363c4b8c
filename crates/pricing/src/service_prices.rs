use core::str::FromStr;

use serde::{Deserialize, Serialize};

use tiredesk_core::{DomainError, DomainResult, Money};

use crate::tier::{RimTier, WheelChangeTier};

/// Key of one entry in the service price table.
///
/// The string forms are the keys used in the shop's price files
/// (`montage_bis_17`, `radwechsel_2_raeder`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceKey {
    MountingUpTo17,
    Mounting18To19,
    MountingFrom20,
    WheelChange1,
    WheelChange2,
    WheelChange3,
    WheelChange4,
    Storage,
}

impl ServiceKey {
    pub const ALL: [ServiceKey; 8] = [
        ServiceKey::MountingUpTo17,
        ServiceKey::Mounting18To19,
        ServiceKey::MountingFrom20,
        ServiceKey::WheelChange1,
        ServiceKey::WheelChange2,
        ServiceKey::WheelChange3,
        ServiceKey::WheelChange4,
        ServiceKey::Storage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKey::MountingUpTo17 => "montage_bis_17",
            ServiceKey::Mounting18To19 => "montage_18_19",
            ServiceKey::MountingFrom20 => "montage_ab_20",
            ServiceKey::WheelChange1 => "radwechsel_1_rad",
            ServiceKey::WheelChange2 => "radwechsel_2_raeder",
            ServiceKey::WheelChange3 => "radwechsel_3_raeder",
            ServiceKey::WheelChange4 => "radwechsel_4_raeder",
            ServiceKey::Storage => "nur_einlagerung",
        }
    }

    pub fn for_rim(tier: RimTier) -> Self {
        match tier {
            RimTier::Low => ServiceKey::MountingUpTo17,
            RimTier::Mid => ServiceKey::Mounting18To19,
            RimTier::High => ServiceKey::MountingFrom20,
        }
    }

    pub fn for_wheel_change(tier: WheelChangeTier) -> Self {
        match tier {
            WheelChangeTier::One => ServiceKey::WheelChange1,
            WheelChangeTier::Two => ServiceKey::WheelChange2,
            WheelChangeTier::Three => ServiceKey::WheelChange3,
            WheelChangeTier::Four => ServiceKey::WheelChange4,
        }
    }
}

impl core::fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ServiceKey::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| DomainError::validation(format!("unknown service key '{needle}'")))
    }
}

/// Fees for the workshop services offered with a tire purchase.
///
/// Every field has a default; a price file only needs to list the fees it
/// changes. Unknown keys are rejected so a typo never silently falls back to
/// the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServicePrices {
    #[serde(rename = "montage_bis_17")]
    pub mounting_up_to_17: Money,
    #[serde(rename = "montage_18_19")]
    pub mounting_18_to_19: Money,
    #[serde(rename = "montage_ab_20")]
    pub mounting_from_20: Money,
    #[serde(rename = "radwechsel_1_rad")]
    pub wheel_change_1: Money,
    #[serde(rename = "radwechsel_2_raeder")]
    pub wheel_change_2: Money,
    #[serde(rename = "radwechsel_3_raeder")]
    pub wheel_change_3: Money,
    #[serde(rename = "radwechsel_4_raeder")]
    pub wheel_change_4: Money,
    #[serde(rename = "nur_einlagerung")]
    pub storage: Money,
}

impl Default for ServicePrices {
    fn default() -> Self {
        Self {
            mounting_up_to_17: Money::from_cents(2_500),
            mounting_18_to_19: Money::from_cents(3_000),
            mounting_from_20: Money::from_cents(4_000),
            wheel_change_1: Money::from_cents(995),
            wheel_change_2: Money::from_cents(1_995),
            wheel_change_3: Money::from_cents(2_995),
            wheel_change_4: Money::from_cents(3_990),
            storage: Money::from_cents(5_500),
        }
    }
}

impl ServicePrices {
    /// Mounting fee for one tire on a rim of the given diameter.
    pub fn mounting_fee(&self, rim_diameter: u32) -> Money {
        self.get(ServiceKey::for_rim(RimTier::from_diameter(rim_diameter)))
    }

    /// Flat fee for a wheel change package, independent of tire count.
    pub fn wheel_change_fee(&self, tier: WheelChangeTier) -> Money {
        self.get(ServiceKey::for_wheel_change(tier))
    }

    /// Flat storage fee, independent of tire count.
    pub fn storage_fee(&self) -> Money {
        self.storage
    }

    pub fn get(&self, key: ServiceKey) -> Money {
        match key {
            ServiceKey::MountingUpTo17 => self.mounting_up_to_17,
            ServiceKey::Mounting18To19 => self.mounting_18_to_19,
            ServiceKey::MountingFrom20 => self.mounting_from_20,
            ServiceKey::WheelChange1 => self.wheel_change_1,
            ServiceKey::WheelChange2 => self.wheel_change_2,
            ServiceKey::WheelChange3 => self.wheel_change_3,
            ServiceKey::WheelChange4 => self.wheel_change_4,
            ServiceKey::Storage => self.storage,
        }
    }

    pub fn set(&mut self, key: ServiceKey, fee: Money) {
        let slot = match key {
            ServiceKey::MountingUpTo17 => &mut self.mounting_up_to_17,
            ServiceKey::Mounting18To19 => &mut self.mounting_18_to_19,
            ServiceKey::MountingFrom20 => &mut self.mounting_from_20,
            ServiceKey::WheelChange1 => &mut self.wheel_change_1,
            ServiceKey::WheelChange2 => &mut self.wheel_change_2,
            ServiceKey::WheelChange3 => &mut self.wheel_change_3,
            ServiceKey::WheelChange4 => &mut self.wheel_change_4,
            ServiceKey::Storage => &mut self.storage,
        };
        *slot = fee;
    }

    /// Set a fee by its string key, as typed into the admin panel.
    pub fn set_by_key(&mut self, key: &str, fee: Money) -> DomainResult<()> {
        let key: ServiceKey = key.parse()?;
        self.set(key, fee);
        Ok(())
    }

    /// All entries in table order.
    pub fn entries(&self) -> impl Iterator<Item = (ServiceKey, Money)> + '_ {
        ServiceKey::ALL.into_iter().map(|k| (k, self.get(k)))
    }
}
