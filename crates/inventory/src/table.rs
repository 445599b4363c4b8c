use core::str::FromStr;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use tiredesk_core::{DomainError, DomainResult, Entity, PartNumber};

use crate::tire::TireRecord;

/// Which stored table an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    /// Baseline catalog, read-mostly.
    Master,
    /// Operational overrides and additions; checkout writes here.
    Central,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Master => "master",
            Table::Central => "central",
        }
    }
}

impl core::fmt::Display for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "master" => Ok(Table::Master),
            "central" => Ok(Table::Central),
            other => Err(DomainError::validation(format!(
                "unknown table '{other}' (expected master or central)"
            ))),
        }
    }
}

/// A stored table or the derived combined view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableView {
    Master,
    Central,
    Combined,
}

impl TableView {
    pub fn as_str(self) -> &'static str {
        match self {
            TableView::Master => "master",
            TableView::Central => "central",
            TableView::Combined => "combined",
        }
    }
}

impl From<Table> for TableView {
    fn from(value: Table) -> Self {
        match value {
            Table::Master => TableView::Master,
            Table::Central => TableView::Central,
        }
    }
}

impl core::fmt::Display for TableView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableView {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "combined" => Ok(TableView::Combined),
            other => other.parse::<Table>().map(TableView::from),
        }
    }
}

/// Ordered set of tire records, unique by part number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TireTable {
    records: Vec<TireRecord>,
}

impl TireTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, rejecting repeated part numbers.
    pub fn from_records(records: Vec<TireRecord>) -> DomainResult<Self> {
        let mut seen: HashMap<&PartNumber, usize> = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if let Some(first) = seen.insert(record.id(), idx) {
                return Err(DomainError::validation(format!(
                    "part number '{}' appears more than once (entries {} and {})",
                    record.part_number,
                    first + 1,
                    idx + 1
                )));
            }
        }
        Ok(Self { records })
    }

    /// Build a table from records already known to be unique.
    pub(crate) fn from_unique(records: Vec<TireRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TireRecord] {
        &self.records
    }

    pub fn iter(&self) -> core::slice::Iter<'_, TireRecord> {
        self.records.iter()
    }

    pub fn get(&self, part_number: &PartNumber) -> Option<&TireRecord> {
        self.records.iter().find(|r| r.has_id(part_number))
    }

    pub fn get_mut(&mut self, part_number: &PartNumber) -> Option<&mut TireRecord> {
        self.records.iter_mut().find(|r| r.has_id(part_number))
    }

    pub fn contains(&self, part_number: &PartNumber) -> bool {
        self.get(part_number).is_some()
    }

    /// Insert or replace by part number. Returns `true` when a row was replaced.
    pub fn upsert(&mut self, record: TireRecord) -> bool {
        match self.get_mut(&record.part_number) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => {
                self.records.push(record);
                false
            }
        }
    }

    pub fn remove(&mut self, part_number: &PartNumber) -> Option<TireRecord> {
        let idx = self.records.iter().position(|r| r.has_id(part_number))?;
        Some(self.records.remove(idx))
    }

    pub fn into_records(self) -> Vec<TireRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a TireTable {
    type Item = &'a TireRecord;
    type IntoIter = core::slice::Iter<'a, TireRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tire::fixtures::tire;

    #[test]
    fn duplicate_part_numbers_are_rejected() {
        let err = TireTable::from_records(vec![
            tire("A", 100, None),
            tire("B", 100, None),
            tire("A", 120, None),
        ])
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("'A'")));
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut table =
            TireTable::from_records(vec![tire("A", 100, None), tire("B", 200, None)]).unwrap();

        assert!(table.upsert(tire("A", 150, Some(2))));
        assert!(!table.upsert(tire("C", 300, None)));

        let parts: Vec<&str> = table.iter().map(|r| r.part_number.as_str()).collect();
        assert_eq!(parts, ["A", "B", "C"]);
        assert_eq!(
            table.get(&PartNumber::new("A").unwrap()).unwrap().stock,
            Some(2)
        );
    }

    #[test]
    fn remove_returns_the_row() {
        let mut table = TireTable::from_records(vec![tire("A", 100, None)]).unwrap();
        let a = PartNumber::new("A").unwrap();
        assert!(table.remove(&a).is_some());
        assert!(table.remove(&a).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn table_names_parse() {
        assert_eq!("Central".parse::<Table>().unwrap(), Table::Central);
        assert_eq!("combined".parse::<TableView>().unwrap(), TableView::Combined);
        assert_eq!("master".parse::<TableView>().unwrap(), TableView::Master);
        assert!("archive".parse::<Table>().is_err());
    }
}
