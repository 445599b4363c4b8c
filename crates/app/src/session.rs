//! Per-user session state.
//!
//! One `Session` per counter user; nothing is shared between sessions.

use std::io::{Read, Seek};

use chrono::NaiveDateTime;

use tiredesk_auth::AdminGate;
use tiredesk_core::{DomainError, DomainResult, Money, PartNumber, SessionId};
use tiredesk_inventory::{
    CombinedViewCache, InventoryStore, SearchPage, Table, TableView, TireQuery, TireRecord,
    TireTable, manufacturers, search,
};
use tiredesk_pricing::ServicePrices;
use tiredesk_quoting::{CustomerData, QuoteFormatter, RenderedQuote};
use tiredesk_sales::{Cart, CartItemId, CartTotal, CheckoutReport, ServiceSelection, checkout};

use crate::config::AppConfig;

/// Result of a finished sale.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedCheckout {
    pub quote: RenderedQuote,
    pub report: CheckoutReport,
}

#[derive(Debug)]
pub struct Session {
    id: SessionId,
    store: InventoryStore,
    combined: CombinedViewCache,
    cart: Cart,
    prices: ServicePrices,
    gate: AdminGate,
    quotes: QuoteFormatter,
    page_size: usize,
}

impl Session {
    pub fn new(config: &AppConfig, store: InventoryStore, prices: ServicePrices) -> Self {
        let id = SessionId::new();
        tracing::debug!(session = %id, "session started");
        Self {
            id,
            store,
            combined: CombinedViewCache::new(),
            cart: Cart::new(),
            prices,
            gate: AdminGate::new(config.admin_password.clone()),
            quotes: QuoteFormatter::new(config.quote_settings()),
            page_size: config.page_size,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn store(&self) -> &InventoryStore {
        &self.store
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn prices(&self) -> &ServicePrices {
        &self.prices
    }

    // -- browsing ---------------------------------------------------------

    pub fn view(&mut self, view: TableView) -> &TireTable {
        match view {
            TableView::Master => self.store.table(Table::Master),
            TableView::Central => self.store.table(Table::Central),
            TableView::Combined => self.combined.get(&self.store),
        }
    }

    /// A blank query using the configured page size.
    pub fn new_query(&self) -> TireQuery {
        TireQuery {
            page_size: self.page_size,
            ..TireQuery::default()
        }
    }

    pub fn search(&mut self, view: TableView, query: &TireQuery) -> DomainResult<SearchPage<'_>> {
        search(self.view(view), query)
    }

    pub fn manufacturers(&mut self, view: TableView) -> Vec<String> {
        manufacturers(self.view(view))
    }

    // -- cart -------------------------------------------------------------

    /// Put a tire from `view` into the cart.
    pub fn add_to_cart(
        &mut self,
        view: TableView,
        part_number: &PartNumber,
        quantity: u32,
        services: ServiceSelection,
    ) -> DomainResult<CartItemId> {
        let record = self
            .view(view)
            .get(part_number)
            .cloned()
            .ok_or_else(|| {
                DomainError::not_found(format!("part number '{part_number}' in the {view} view"))
            })?;
        let item = self.cart.add_item(&record, quantity, services)?;
        Ok(item.id.clone())
    }

    pub fn remove_from_cart(&mut self, id: &CartItemId) -> bool {
        self.cart.remove_item(id)
    }

    pub fn set_quantity(&mut self, id: &CartItemId, quantity: u32) -> DomainResult<()> {
        self.cart.set_quantity(id, quantity)
    }

    pub fn set_services(
        &mut self,
        id: &CartItemId,
        services: ServiceSelection,
    ) -> DomainResult<()> {
        self.cart.set_services(id, services)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    pub fn cart_total(&self) -> CartTotal {
        self.cart.compute_total(&self.prices)
    }

    // -- quotes and checkout ---------------------------------------------

    pub fn render_quote(
        &self,
        customer: &CustomerData,
        at: NaiveDateTime,
    ) -> DomainResult<RenderedQuote> {
        self.quotes.render(&self.cart, customer, &self.prices, at)
    }

    /// Render the final quote, book the cart, then empty it.
    ///
    /// If rendering fails nothing is booked and the cart is kept.
    pub fn complete_checkout(
        &mut self,
        customer: &CustomerData,
        reduce_stock: bool,
        at: NaiveDateTime,
    ) -> DomainResult<CompletedCheckout> {
        let quote = self.render_quote(customer, at)?;
        let report = checkout::process(&self.cart, &mut self.store, reduce_stock);
        self.cart.clear();
        tracing::info!(session = %self.id, file = %quote.filename, "checkout completed");
        Ok(CompletedCheckout { quote, report })
    }

    // -- admin ------------------------------------------------------------

    pub fn unlock(&mut self, attempt: &str) -> DomainResult<()> {
        self.gate.unlock(attempt).map_err(DomainError::from)
    }

    pub fn lock(&mut self) {
        self.gate.lock();
    }

    pub fn is_admin(&self) -> bool {
        self.gate.is_unlocked()
    }

    fn require_admin(&self) -> DomainResult<()> {
        self.gate.require_unlocked().map_err(DomainError::from)
    }

    pub fn import_csv<R: Read>(&mut self, reader: R, table: Table) -> DomainResult<usize> {
        self.require_admin()?;
        self.store.import_table(reader, table)
    }

    pub fn import_spreadsheet<RS: Read + Seek>(
        &mut self,
        reader: RS,
        table: Table,
    ) -> DomainResult<usize> {
        self.require_admin()?;
        self.store.import_spreadsheet(reader, table)
    }

    pub fn export_csv(&self, view: TableView) -> DomainResult<Vec<u8>> {
        self.require_admin()?;
        self.store.export_csv(view)
    }

    pub fn update_stock(
        &mut self,
        part_number: &PartNumber,
        delta: i64,
        table: Table,
    ) -> DomainResult<i64> {
        self.require_admin()?;
        self.store.update_stock(part_number, delta, table)
    }

    pub fn clear_table(&mut self, table: Table) -> DomainResult<()> {
        self.require_admin()?;
        self.store.clear_table(table);
        Ok(())
    }

    pub fn upsert_record(&mut self, table: Table, record: TireRecord) -> DomainResult<bool> {
        self.require_admin()?;
        Ok(self.store.upsert_record(table, record))
    }

    pub fn remove_record(
        &mut self,
        table: Table,
        part_number: &PartNumber,
    ) -> DomainResult<TireRecord> {
        self.require_admin()?;
        self.store.remove_record(table, part_number)
    }

    pub fn set_service_price(&mut self, key: &str, fee: Money) -> DomainResult<()> {
        self.require_admin()?;
        self.prices.set_by_key(key, fee)
    }

    pub fn import_service_prices<R: Read>(&mut self, reader: R) -> DomainResult<()> {
        self.require_admin()?;
        self.prices.apply_csv(reader)
    }
}
