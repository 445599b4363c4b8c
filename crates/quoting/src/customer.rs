use serde::{Deserialize, Serialize};

use tiredesk_core::ValueObject;

/// Free-form customer details printed on a quote. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerData {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub vehicle: String,
    pub notes: String,
}

impl ValueObject for CustomerData {}

impl CustomerData {
    /// `(label, value)` pairs for the non-blank fields, in print order.
    pub fn filled_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("Name", self.name.as_str()),
            ("Company", self.company.as_str()),
            ("Email", self.email.as_str()),
            ("Phone", self.phone.as_str()),
            ("Vehicle", self.vehicle.as_str()),
            ("Notes", self.notes.as_str()),
        ]
        .into_iter()
        .map(|(label, value)| (label, value.trim()))
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.filled_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_counts_as_empty() {
        let customer = CustomerData {
            name: "   ".to_string(),
            ..CustomerData::default()
        };
        assert!(customer.is_empty());
    }

    #[test]
    fn filled_fields_keep_order() {
        let customer = CustomerData {
            vehicle: "VW Golf VII".to_string(),
            name: " Anna Berger ".to_string(),
            ..CustomerData::default()
        };
        assert_eq!(
            customer.filled_fields(),
            vec![("Name", "Anna Berger"), ("Vehicle", "VW Golf VII")]
        );
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let customer: CustomerData = toml::from_str("phone = \"0171 555 0101\"").unwrap();
        assert_eq!(customer.phone, "0171 555 0101");
        assert!(customer.email.is_empty());
    }
}
