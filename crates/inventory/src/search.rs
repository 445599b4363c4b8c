//! Filtering, sorting and paging over an in-memory table.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use tiredesk_core::{DomainError, DomainResult};

use crate::table::TireTable;
use crate::tire::TireRecord;

pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Table order (Master order, then Central additions).
    #[default]
    Table,
    PriceAsc,
    PriceDesc,
    /// Highest stock first; unknown stock last.
    StockDesc,
    /// Width, then height, then rim diameter.
    Size,
}

/// Search criteria as entered in the search form. Every filter is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TireQuery {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rim_diameter: Option<u32>,
    /// Case-insensitive substring of the manufacturer.
    pub manufacturer: Option<String>,
    /// Case-insensitive substring of manufacturer, product line or part number.
    pub text: Option<String>,
    pub in_stock_only: bool,
    pub sort: SortOrder,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for TireQuery {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            rim_diameter: None,
            manufacturer: None,
            text: None,
            in_stock_only: false,
            sort: SortOrder::Table,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TireQuery {
    fn matches(&self, record: &TireRecord) -> bool {
        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.trim().to_lowercase())
        };

        self.width.is_none_or(|w| record.width == w)
            && self.height.is_none_or(|h| record.height == h)
            && self.rim_diameter.is_none_or(|r| record.rim_diameter == r)
            && self
                .manufacturer
                .as_deref()
                .is_none_or(|m| contains(&record.manufacturer, m))
            && self.text.as_deref().is_none_or(|t| {
                contains(&record.manufacturer, t)
                    || contains(&record.product_line, t)
                    || contains(record.part_number.as_str(), t)
            })
            && (!self.in_stock_only || record.is_in_stock())
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPage<'a> {
    pub items: Vec<&'a TireRecord>,
    /// Matches across all pages.
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
}

/// Run a query. A page past the end yields no items but correct totals.
pub fn search<'a>(table: &'a TireTable, query: &TireQuery) -> DomainResult<SearchPage<'a>> {
    if query.page_size == 0 {
        return Err(DomainError::validation("page size must be at least 1"));
    }
    let page = query.page.max(1);

    let mut hits: Vec<&TireRecord> = table.iter().filter(|r| query.matches(r)).collect();
    match query.sort {
        SortOrder::Table => {}
        SortOrder::PriceAsc => hits.sort_by_key(|r| r.price),
        SortOrder::PriceDesc => hits.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::StockDesc => hits.sort_by(|a, b| b.stock.cmp(&a.stock)),
        SortOrder::Size => hits.sort_by_key(|r| (r.width, r.height, r.rim_diameter)),
    }

    let total = hits.len();
    let page_count = total.div_ceil(query.page_size);
    let items = hits
        .into_iter()
        .skip((page - 1).saturating_mul(query.page_size))
        .take(query.page_size)
        .collect();

    Ok(SearchPage {
        items,
        total,
        page,
        page_count,
    })
}

/// Distinct manufacturers, sorted, for the filter menu.
pub fn manufacturers(table: &TireTable) -> Vec<String> {
    table
        .iter()
        .map(|r| r.manufacturer.trim())
        .filter(|m| !m.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tire::fixtures::tire;
    use tiredesk_core::Money;

    fn catalog() -> TireTable {
        let mut a = tire("CT-1", 9_000, Some(8));
        a.manufacturer = "Continental".into();
        let mut b = tire("MI-1", 12_000, None);
        b.manufacturer = "Michelin".into();
        b.rim_diameter = 18;
        b.width = 225;
        let mut c = tire("MI-2", 7_000, Some(-1));
        c.manufacturer = "Michelin".into();
        c.product_line = "CrossClimate 2".into();
        let mut d = tire("HK-1", 6_000, Some(2));
        d.manufacturer = "Hankook".into();
        TireTable::from_records(vec![a, b, c, d]).unwrap()
    }

    fn parts(page: &SearchPage<'_>) -> Vec<String> {
        page.items.iter().map(|r| r.part_number.to_string()).collect()
    }

    #[test]
    fn filters_combine() {
        let table = catalog();
        let query = TireQuery {
            manufacturer: Some("michelin".into()),
            rim_diameter: Some(16),
            ..TireQuery::default()
        };
        assert_eq!(parts(&search(&table, &query).unwrap()), ["MI-2"]);

        let query = TireQuery {
            text: Some("climate".into()),
            ..TireQuery::default()
        };
        assert_eq!(parts(&search(&table, &query).unwrap()), ["MI-2"]);
    }

    #[test]
    fn in_stock_only_drops_unknown_and_negative() {
        let table = catalog();
        let query = TireQuery {
            in_stock_only: true,
            ..TireQuery::default()
        };
        assert_eq!(parts(&search(&table, &query).unwrap()), ["CT-1", "HK-1"]);
    }

    #[test]
    fn sorting_orders_hits() {
        let table = catalog();
        let by = |sort: SortOrder| {
            let query = TireQuery {
                sort,
                ..TireQuery::default()
            };
            parts(&search(&table, &query).unwrap())
        };
        assert_eq!(by(SortOrder::PriceAsc), ["HK-1", "MI-2", "CT-1", "MI-1"]);
        assert_eq!(by(SortOrder::PriceDesc), ["MI-1", "CT-1", "MI-2", "HK-1"]);
        assert_eq!(by(SortOrder::StockDesc), ["CT-1", "HK-1", "MI-2", "MI-1"]);
        assert_eq!(by(SortOrder::Size)[3], "MI-1");
    }

    #[test]
    fn paging_reports_totals() {
        let table = catalog();
        let query = TireQuery {
            page: 2,
            page_size: 3,
            ..TireQuery::default()
        };
        let page = search(&table, &query).unwrap();
        assert_eq!(parts(&page), ["HK-1"]);
        assert_eq!(page.total, 4);
        assert_eq!(page.page_count, 2);

        let beyond = TireQuery {
            page: 9,
            page_size: 3,
            ..TireQuery::default()
        };
        let page = search(&table, &beyond).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 4);

        let zero = TireQuery {
            page_size: 0,
            ..TireQuery::default()
        };
        assert!(search(&table, &zero).is_err());
    }

    #[test]
    fn manufacturers_are_distinct_and_sorted() {
        assert_eq!(
            manufacturers(&catalog()),
            ["Continental", "Hankook", "Michelin"]
        );
        assert_eq!(catalog().records()[0].price, Money::from_cents(9_000));
    }
}
