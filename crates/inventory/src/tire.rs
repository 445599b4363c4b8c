use core::str::FromStr;

use serde::{Deserialize, Serialize};

use tiredesk_core::{DomainError, Entity, Money, PartNumber, ValueObject};

/// EU tire label grade (fuel efficiency or wet grip), A best to G worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EuLabel {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl ValueObject for EuLabel {}

impl EuLabel {
    pub fn as_char(self) -> char {
        match self {
            EuLabel::A => 'A',
            EuLabel::B => 'B',
            EuLabel::C => 'C',
            EuLabel::D => 'D',
            EuLabel::E => 'E',
            EuLabel::F => 'F',
            EuLabel::G => 'G',
        }
    }
}

impl core::fmt::Display for EuLabel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for EuLabel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(EuLabel::A),
            "B" => Ok(EuLabel::B),
            "C" => Ok(EuLabel::C),
            "D" => Ok(EuLabel::D),
            "E" => Ok(EuLabel::E),
            "F" => Ok(EuLabel::F),
            "G" => Ok(EuLabel::G),
            other => Err(DomainError::validation(format!(
                "EU label must be A-G, got '{other}'"
            ))),
        }
    }
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TireRecord {
    pub width: u32,
    /// Aspect ratio in percent.
    pub height: u32,
    /// Rim diameter in inches.
    pub rim_diameter: u32,
    pub manufacturer: String,
    pub product_line: String,
    pub part_number: PartNumber,
    pub price: Money,
    /// `None` when the supplier did not report stock. Negative values mean
    /// "reorder needed" and are kept as-is.
    pub stock: Option<i64>,
    pub fuel_efficiency: Option<EuLabel>,
    pub wet_grip: Option<EuLabel>,
}

impl TireRecord {
    /// Size as printed on the sidewall, e.g. `205/55 R16`.
    pub fn size_label(&self) -> String {
        format!("{}/{} R{}", self.width, self.height, self.rim_diameter)
    }

    /// Combined EU label text, e.g. `Fuel C / Wet B`, if any grade is known.
    pub fn eu_label(&self) -> Option<String> {
        match (self.fuel_efficiency, self.wet_grip) {
            (None, None) => None,
            (fuel, wet) => {
                let grade = |l: Option<EuLabel>| {
                    l.map(|l| l.to_string()).unwrap_or_else(|| "-".into())
                };
                Some(format!("Fuel {} / Wet {}", grade(fuel), grade(wet)))
            }
        }
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock.is_some_and(|s| s > 0)
    }
}

impl Entity for TireRecord {
    type Id = PartNumber;

    fn id(&self) -> &Self::Id {
        &self.part_number
    }
}
