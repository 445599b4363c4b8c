use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek};

use tiredesk_core::{DomainError, DomainResult, PartNumber};

use crate::csv_io;
use crate::table::{Table, TableView, TireTable};
use crate::tire::TireRecord;

/// Merge Master and Central into the combined view.
///
/// A Central record replaces the Master record with the same part number
/// (keeping the Master position); Master-only records pass through;
/// Central-only records are appended in Central order. Price is not part of
/// the key.
pub fn merge_tables(master: &TireTable, central: &TireTable) -> TireTable {
    let overrides: HashMap<&PartNumber, &TireRecord> =
        central.iter().map(|r| (&r.part_number, r)).collect();
    let master_keys: HashSet<&PartNumber> = master.iter().map(|r| &r.part_number).collect();

    let mut records = Vec::with_capacity(master.len() + central.len());
    for record in master {
        let winner = overrides.get(&record.part_number).copied().unwrap_or(record);
        records.push(winner.clone());
    }
    records.extend(
        central
            .iter()
            .filter(|r| !master_keys.contains(&r.part_number))
            .cloned(),
    );

    TireTable::from_unique(records)
}

/// The two stored tables of one session.
///
/// `version` increases on every successful mutation so derived views can be
/// cached (see [`CombinedViewCache`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryStore {
    master: TireTable,
    central: TireTable,
    version: u64,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(master: TireTable, central: TireTable) -> Self {
        Self {
            master,
            central,
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn table(&self, table: Table) -> &TireTable {
        match table {
            Table::Master => &self.master,
            Table::Central => &self.central,
        }
    }

    fn table_mut(&mut self, table: Table) -> &mut TireTable {
        match table {
            Table::Master => &mut self.master,
            Table::Central => &mut self.central,
        }
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    /// Replace a table wholesale.
    pub fn replace_table(&mut self, table: Table, rows: TireTable) {
        tracing::info!(table = %table, rows = rows.len(), "table replaced");
        *self.table_mut(table) = rows;
        self.touch();
    }

    /// Import a CSV document into `table`, replacing its contents.
    ///
    /// On error the table is left untouched.
    pub fn import_table<R: Read>(&mut self, reader: R, table: Table) -> DomainResult<usize> {
        let rows = csv_io::parse_records(&csv_io::read_csv(reader)?)?;
        let count = rows.len();
        self.replace_table(table, rows);
        Ok(count)
    }

    /// Import the first worksheet of an XLSX workbook into `table`.
    pub fn import_spreadsheet<RS: Read + Seek>(
        &mut self,
        reader: RS,
        table: Table,
    ) -> DomainResult<usize> {
        let rows = csv_io::parse_records(&csv_io::read_xlsx(reader)?)?;
        let count = rows.len();
        self.replace_table(table, rows);
        Ok(count)
    }

    /// Derive the combined view. Pure; see [`merge_tables`].
    pub fn combined_view(&self) -> TireTable {
        merge_tables(&self.master, &self.central)
    }

    /// Serialize a table or the combined view as CSV.
    ///
    /// Refuses to produce a file for a view with zero rows.
    pub fn export_csv(&self, view: TableView) -> DomainResult<Vec<u8>> {
        let combined;
        let rows = match view {
            TableView::Master => &self.master,
            TableView::Central => &self.central,
            TableView::Combined => {
                combined = self.combined_view();
                &combined
            }
        };
        if rows.is_empty() {
            return Err(DomainError::empty(format!("the {view} table has no rows")));
        }
        csv_io::write_csv(rows)
    }

    /// Add `delta` to the stock of `part_number` in `table`.
    ///
    /// Unknown stock counts as zero. The result may go negative, which marks
    /// a backorder rather than an error. Returns the new stock.
    pub fn update_stock(
        &mut self,
        part_number: &PartNumber,
        delta: i64,
        table: Table,
    ) -> DomainResult<i64> {
        let record = self.table_mut(table).get_mut(part_number).ok_or_else(|| {
            DomainError::not_found(format!("part number '{part_number}' in the {table} table"))
        })?;

        let new_stock = record.stock.unwrap_or(0).saturating_add(delta);
        record.stock = Some(new_stock);
        self.touch();

        tracing::info!(
            table = %table,
            part_number = %part_number,
            delta,
            new_stock,
            "stock adjusted"
        );
        if new_stock < 0 {
            tracing::warn!(
                part_number = %part_number,
                new_stock,
                "stock below zero, reorder needed"
            );
        }
        Ok(new_stock)
    }

    /// Empty a table. Irreversible; the surface asks for confirmation first.
    pub fn clear_table(&mut self, table: Table) {
        self.replace_table(table, TireTable::new());
    }

    /// Insert or replace a single record. Returns `true` when a row was replaced.
    pub fn upsert_record(&mut self, table: Table, record: TireRecord) -> bool {
        let part_number = record.part_number.clone();
        let replaced = self.table_mut(table).upsert(record);
        self.touch();
        tracing::info!(table = %table, part_number = %part_number, replaced, "record saved");
        replaced
    }

    pub fn remove_record(
        &mut self,
        table: Table,
        part_number: &PartNumber,
    ) -> DomainResult<TireRecord> {
        let removed = self.table_mut(table).remove(part_number).ok_or_else(|| {
            DomainError::not_found(format!("part number '{part_number}' in the {table} table"))
        })?;
        self.touch();
        tracing::info!(table = %table, part_number = %part_number, "record removed");
        Ok(removed)
    }
}

/// Combined view memoized on the store version.
///
/// Use one cache per store: the version counter is only meaningful for the
/// store that produced it.
#[derive(Debug, Clone, Default)]
pub struct CombinedViewCache {
    cached: Option<(u64, TireTable)>,
}

impl CombinedViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, store: &InventoryStore) -> &TireTable {
        let version = store.version();
        if self.cached.as_ref().map(|(v, _)| *v) != Some(version) {
            tracing::debug!(version, "combined view rebuilt");
            self.cached = None;
        }
        &self
            .cached
            .get_or_insert_with(|| (version, store.combined_view()))
            .1
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tire::fixtures::tire;
    use proptest::prelude::*;
    use tiredesk_core::Money;

    fn part(s: &str) -> PartNumber {
        PartNumber::new(s).unwrap()
    }

    fn store(master: Vec<TireRecord>, central: Vec<TireRecord>) -> InventoryStore {
        InventoryStore::with_tables(
            TireTable::from_records(master).unwrap(),
            TireTable::from_records(central).unwrap(),
        )
    }

    #[test]
    fn central_wins_on_key_collision() {
        let store = store(
            vec![tire("A", 1_000, None)],
            vec![tire("A", 1_200, None), tire("B", 500, None)],
        );
        let combined = store.combined_view();

        let prices: Vec<(&str, Money)> = combined
            .iter()
            .map(|r| (r.part_number.as_str(), r.price))
            .collect();
        assert_eq!(
            prices,
            [("A", Money::from_cents(1_200)), ("B", Money::from_cents(500))]
        );
    }

    #[test]
    fn master_only_rows_pass_through_in_order() {
        let store = store(
            vec![tire("A", 100, None), tire("B", 200, None), tire("C", 300, None)],
            vec![tire("B", 250, Some(1)), tire("D", 400, None)],
        );
        let parts: Vec<String> = store
            .combined_view()
            .iter()
            .map(|r| r.part_number.to_string())
            .collect();
        assert_eq!(parts, ["A", "B", "C", "D"]);
    }

    #[test]
    fn update_stock_on_absent_part_is_not_found() {
        let mut store = store(vec![tire("X", 100, Some(3))], vec![]);
        let err = store.update_stock(&part("X"), -5, Table::Central).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn update_stock_may_go_negative() {
        let mut store = store(vec![], vec![tire("X", 100, Some(3))]);
        assert_eq!(store.update_stock(&part("X"), -5, Table::Central).unwrap(), -2);
        assert_eq!(
            store.table(Table::Central).get(&part("X")).unwrap().stock,
            Some(-2)
        );
    }

    #[test]
    fn unknown_stock_counts_as_zero() {
        let mut store = store(vec![tire("X", 100, None)], vec![]);
        assert_eq!(store.update_stock(&part("X"), 4, Table::Master).unwrap(), 4);
    }

    #[test]
    fn exporting_an_empty_table_is_refused() {
        let store = InventoryStore::new();
        for view in [TableView::Master, TableView::Central, TableView::Combined] {
            assert!(matches!(
                store.export_csv(view).unwrap_err(),
                DomainError::Empty(_)
            ));
        }
    }

    #[test]
    fn combined_export_contains_merged_rows() {
        let store = store(vec![tire("A", 1_000, None)], vec![tire("A", 1_200, Some(1))]);
        let text = String::from_utf8(store.export_csv(TableView::Combined).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains(",A,12.00,1,,"));
    }

    #[test]
    fn failed_import_keeps_previous_table() {
        let mut store = store(vec![tire("A", 1_000, None)], vec![]);
        let bad = "width,height,rimDiameter,manufacturer,productLine,partNumber\n1,2,3,C,P,B\n";
        assert!(store.import_table(bad.as_bytes(), Table::Master).is_err());
        assert_eq!(store.table(Table::Master).len(), 1);
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn import_replaces_wholesale() {
        let mut store = store(vec![tire("A", 1_000, None)], vec![]);
        let csv = "width,height,rimDiameter,manufacturer,productLine,partNumber,price\n\
                   225,45,17,Pirelli,P7,PI-1,120\n225,45,17,Pirelli,P Zero,PI-2,150\n";
        assert_eq!(store.import_table(csv.as_bytes(), Table::Master).unwrap(), 2);
        assert!(!store.table(Table::Master).contains(&part("A")));
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn clear_and_record_edits_bump_version() {
        let mut store = store(vec![tire("A", 100, None)], vec![]);
        store.upsert_record(Table::Central, tire("Z", 900, Some(2)));
        assert!(store.remove_record(Table::Master, &part("A")).is_ok());
        assert!(matches!(
            store.remove_record(Table::Master, &part("A")).unwrap_err(),
            DomainError::NotFound(_)
        ));
        store.clear_table(Table::Central);
        assert!(store.table(Table::Central).is_empty());
        assert_eq!(store.version(), 3);
    }

    #[test]
    fn cache_follows_store_version() {
        let mut store = store(vec![tire("A", 100, None)], vec![]);
        let mut cache = CombinedViewCache::new();
        assert_eq!(cache.get(&store).len(), 1);

        store.upsert_record(Table::Central, tire("B", 200, None));
        assert_eq!(cache.get(&store).len(), 2);
        assert_eq!(cache.get(&store), &store.combined_view());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the combined view holds exactly the union of part numbers,
        /// and every Central row appears unchanged.
        #[test]
        fn merge_is_union_with_central_precedence(
            master_keys in prop::collection::btree_set("[A-F][0-9]", 0..12),
            central_keys in prop::collection::btree_set("[A-F][0-9]", 0..12),
        ) {
            let master: Vec<TireRecord> = master_keys.iter().map(|k| tire(k, 100, None)).collect();
            let central: Vec<TireRecord> =
                central_keys.iter().map(|k| tire(k, 200, Some(1))).collect();
            let store = store(master, central);
            let combined = store.combined_view();

            let union: HashSet<&String> = master_keys.union(&central_keys).collect();
            prop_assert_eq!(combined.len(), union.len());

            for record in &combined {
                let key = record.part_number.to_string();
                if central_keys.contains(&key) {
                    prop_assert_eq!(record.price, Money::from_cents(200));
                } else {
                    prop_assert_eq!(record.price, Money::from_cents(100));
                }
            }
        }
    }
}
