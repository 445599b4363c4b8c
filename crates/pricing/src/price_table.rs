//! CSV form of the service price table (`service,price`).
//!
//! Rows override the defaults; keys that are not listed keep their default
//! fee.

use std::collections::HashSet;
use std::io::Read;

use tiredesk_core::{DomainError, DomainResult, Money};

use crate::service_prices::{ServiceKey, ServicePrices};

const KEY_HEADERS: [&str; 3] = ["service", "key", "leistung"];
const PRICE_HEADERS: [&str; 3] = ["price", "preis", "fee"];

fn csv_error(err: csv::Error) -> DomainError {
    let row = err.position().map(|p| p.line() as usize).unwrap_or(1);
    DomainError::parse(row, err.to_string())
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

impl ServicePrices {
    /// Read a price table, starting from the defaults.
    pub fn from_csv_reader<R: Read>(reader: R) -> DomainResult<Self> {
        let mut prices = ServicePrices::default();
        prices.apply_csv(reader)?;
        Ok(prices)
    }

    /// Override the fees listed in a price table, keeping the rest.
    ///
    /// Nothing changes unless the whole file parses.
    pub fn apply_csv<R: Read>(&mut self, reader: R) -> DomainResult<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().map_err(csv_error)?.clone();
        let key_col = find_column(&headers, &KEY_HEADERS)
            .ok_or_else(|| DomainError::validation("missing required column: service"))?;
        let price_col = find_column(&headers, &PRICE_HEADERS)
            .ok_or_else(|| DomainError::validation("missing required column: price"))?;

        let mut prices = self.clone();
        let mut seen = HashSet::new();

        for (idx, result) in reader.records().enumerate() {
            let record = result.map_err(csv_error)?;
            let row = idx + 2;

            let key_text = record.get(key_col).unwrap_or("");
            let price_text = record.get(price_col).unwrap_or("");
            if key_text.is_empty() && price_text.is_empty() {
                continue;
            }

            let key: ServiceKey = key_text.parse()?;
            if !seen.insert(key) {
                return Err(DomainError::validation(format!(
                    "service key '{key}' is listed twice"
                )));
            }
            let fee = Money::parse(price_text)
                .map_err(|e| DomainError::parse(row, format!("{key}: {e}")))?;
            prices.set(key, fee);
        }

        tracing::debug!(overrides = seen.len(), "service price table loaded");
        *self = prices;
        Ok(())
    }

    /// Write every entry, defaults included, as `service,price` CSV.
    pub fn to_csv(&self) -> DomainResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["service", "price"]).map_err(csv_error)?;
        for (key, fee) in self.entries() {
            writer
                .write_record([key.as_str(), fee.to_string().as_str()])
                .map_err(csv_error)?;
        }
        writer
            .into_inner()
            .map_err(|e| DomainError::validation(format!("failed to flush CSV: {e}")))
    }
}
