use serde::Serialize;

use tiredesk_core::{DomainError, PartNumber};
use tiredesk_inventory::{InventoryStore, Table};

use crate::cart::Cart;

/// Outcome of a checkout.
///
/// Checkout is best effort: one missing part does not stop the others from
/// being booked, so the report carries every failure next to the count of
/// lines that went through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutReport {
    pub stock_reduced: bool,
    pub attempted: usize,
    pub succeeded: usize,
    #[serde(serialize_with = "serialize_failures")]
    pub failures: Vec<(PartNumber, DomainError)>,
}

impl CheckoutReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// User-facing summary line.
    pub fn message(&self) -> String {
        if !self.stock_reduced {
            return "Order completed without stock changes.".to_string();
        }
        if self.is_complete() {
            return format!(
                "Stock reduced for {} of {} items.",
                self.succeeded, self.attempted
            );
        }
        let missing: Vec<&str> = self.failures.iter().map(|(p, _)| p.as_str()).collect();
        format!(
            "Stock reduced for {} of {} items; not updated: {}.",
            self.succeeded,
            self.attempted,
            missing.join(", ")
        )
    }
}

fn serialize_failures<S: serde::Serializer>(
    failures: &[(PartNumber, DomainError)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;

    let mut seq = serializer.serialize_seq(Some(failures.len()))?;
    for (part, err) in failures {
        seq.serialize_element(&FailureEntry {
            part_number: part.as_str(),
            kind: err.kind(),
            message: err.to_string(),
        })?;
    }
    seq.end()
}

#[derive(Serialize)]
struct FailureEntry<'a> {
    part_number: &'a str,
    kind: &'static str,
    message: String,
}

/// Book a cart against the central table.
///
/// With `reduce_stock` off nothing is touched. Otherwise each line's quantity
/// is subtracted from the matching central record. Lines whose part only
/// exists in the master table are reported, never silently skipped. The cart
/// is left as is; clearing it is the caller's decision.
pub fn process(cart: &Cart, store: &mut InventoryStore, reduce_stock: bool) -> CheckoutReport {
    let mut report = CheckoutReport {
        stock_reduced: reduce_stock,
        attempted: 0,
        succeeded: 0,
        failures: Vec::new(),
    };
    if !reduce_stock {
        tracing::info!(items = cart.len(), "checkout without stock reduction");
        return report;
    }

    for item in cart.items() {
        report.attempted += 1;
        let part = &item.tire.part_number;
        match store.update_stock(part, -i64::from(item.quantity), Table::Central) {
            Ok(_) => report.succeeded += 1,
            Err(err) => {
                tracing::warn!(part_number = %part, error = %err, "stock not reduced");
                report.failures.push((part.clone(), err));
            }
        }
    }

    tracing::info!(
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failures.len(),
        "checkout processed"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::ServiceSelection;
    use tiredesk_core::Money;
    use tiredesk_inventory::{TireRecord, TireTable};

    fn tire(part: &str, stock: Option<i64>) -> TireRecord {
        TireRecord {
            width: 195,
            height: 65,
            rim_diameter: 15,
            manufacturer: "Bridgestone".to_string(),
            product_line: "Turanza T005".to_string(),
            part_number: PartNumber::new(part).unwrap(),
            price: Money::from_cents(6_500),
            stock,
            fuel_efficiency: None,
            wet_grip: None,
        }
    }

    fn store() -> InventoryStore {
        let master =
            TireTable::from_records(vec![tire("M-ONLY", Some(9)), tire("BOTH", Some(1))]).unwrap();
        let central =
            TireTable::from_records(vec![tire("BOTH", Some(6)), tire("C-ONLY", None)]).unwrap();
        InventoryStore::with_tables(master, central)
    }

    fn cart_of(parts: &[(&str, u32)]) -> Cart {
        let mut cart = Cart::new();
        for (part, qty) in parts {
            cart.add_item(&tire(part, None), *qty, ServiceSelection::none()).unwrap();
        }
        cart
    }

    fn central_stock(store: &InventoryStore, part: &str) -> Option<i64> {
        let part = PartNumber::new(part).unwrap();
        store.table(Table::Central).get(&part).and_then(|r| r.stock)
    }

    #[test]
    fn reduces_central_stock() {
        let mut store = store();
        let report = process(&cart_of(&[("BOTH", 4), ("C-ONLY", 2)]), &mut store, true);

        assert!(report.is_complete());
        assert_eq!(report.succeeded, 2);
        assert_eq!(central_stock(&store, "BOTH"), Some(2));
        assert_eq!(central_stock(&store, "C-ONLY"), Some(-2));
        assert_eq!(report.message(), "Stock reduced for 2 of 2 items.");
    }

    #[test]
    fn master_only_part_is_reported() {
        let mut store = store();
        let report = process(&cart_of(&[("M-ONLY", 1), ("BOTH", 1)]), &mut store, true);

        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].1, DomainError::NotFound(_)));
        assert!(report.message().contains("M-ONLY"));
        // master rows are never written by checkout
        let part = PartNumber::new("M-ONLY").unwrap();
        assert_eq!(store.table(Table::Master).get(&part).unwrap().stock, Some(9));
    }

    #[test]
    fn without_reduction_nothing_changes() {
        let mut store = store();
        let version = store.version();
        let report = process(&cart_of(&[("BOTH", 4)]), &mut store, false);

        assert_eq!(report.attempted, 0);
        assert_eq!(store.version(), version);
        assert_eq!(central_stock(&store, "BOTH"), Some(6));
        assert_eq!(report.message(), "Order completed without stock changes.");
    }

    #[test]
    fn report_serializes_failures() {
        let mut store = store();
        let report = process(&cart_of(&[("NOPE", 1)]), &mut store, true);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["failures"][0]["part_number"], "NOPE");
        assert_eq!(json["failures"][0]["kind"], "not_found");
    }
}
