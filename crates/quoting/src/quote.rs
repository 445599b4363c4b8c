use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use tiredesk_core::{DomainError, DomainResult, Money};
use tiredesk_pricing::ServicePrices;
use tiredesk_sales::{Cart, CartItem, LineTotal};

use crate::customer::CustomerData;

const RULE: &str = "----------------------------------------";

/// Letterhead and currency used on every quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteSettings {
    pub vendor: String,
    pub address_lines: Vec<String>,
    /// Appended to every amount, e.g. `614.90 €`.
    pub currency: String,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            vendor: "Reifenservice".to_string(),
            address_lines: Vec::new(),
            currency: "€".to_string(),
        }
    }
}

/// A rendered quote with the file name it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQuote {
    pub filename: String,
    pub text: String,
}

/// `Quote_<vendor>_<YYYYMMDD_HHMMSS>.txt`, with whitespace and path
/// separators in the vendor name replaced by `_`.
pub fn quote_filename(vendor: &str, issued_at: NaiveDateTime) -> String {
    let vendor: String = vendor
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("Quote_{vendor}_{}.txt", issued_at.format("%Y%m%d_%H%M%S"))
}

#[derive(Debug, Clone, Default)]
pub struct QuoteFormatter {
    settings: QuoteSettings,
}

impl QuoteFormatter {
    pub fn new(settings: QuoteSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &QuoteSettings {
        &self.settings
    }

    fn amount(&self, money: Money) -> String {
        format!("{money} {}", self.settings.currency)
    }

    /// Render the quote text for `cart`.
    ///
    /// Totals come from the cart's own pricing so the printed grand total is
    /// always the figure the cart shows. An empty cart is refused.
    pub fn format(
        &self,
        cart: &Cart,
        customer: &CustomerData,
        prices: &ServicePrices,
        issued_at: NaiveDateTime,
    ) -> DomainResult<String> {
        if cart.is_empty() {
            return Err(DomainError::empty("the cart has no items to quote"));
        }

        let mut out: Vec<String> = Vec::new();
        self.header(&mut out, issued_at);
        self.customer_block(&mut out, customer);

        out.push("ITEMS".to_string());
        out.push(RULE.to_string());
        let lines = cart.line_totals(prices);
        for (n, (item, line)) in cart.items().iter().zip(&lines).enumerate() {
            self.item_block(&mut out, n + 1, item, line, prices);
        }

        let total = cart.compute_total(prices);
        out.push("SUMMARY".to_string());
        out.push(RULE.to_string());
        out.push(self.summary_row("Tires", total.tires));
        out.push(self.summary_row("Mounting", total.mounting));
        out.push(self.summary_row("Wheel change", total.wheel_change));
        out.push(self.summary_row("Storage", total.storage));
        out.push(RULE.to_string());
        out.push(self.summary_row("TOTAL", total.total));
        out.push(String::new());

        tracing::debug!(items = cart.len(), total = %total.total, "quote formatted");
        Ok(out.join("\n"))
    }

    /// Format and pair the text with its file name.
    pub fn render(
        &self,
        cart: &Cart,
        customer: &CustomerData,
        prices: &ServicePrices,
        issued_at: NaiveDateTime,
    ) -> DomainResult<RenderedQuote> {
        let text = self.format(cart, customer, prices, issued_at)?;
        Ok(RenderedQuote {
            filename: quote_filename(&self.settings.vendor, issued_at),
            text,
        })
    }

    fn header(&self, out: &mut Vec<String>, issued_at: NaiveDateTime) {
        out.push(format!("QUOTE  {}", self.settings.vendor));
        out.extend(self.settings.address_lines.iter().cloned());
        out.push(format!("Date: {}", issued_at.format("%d.%m.%Y %H:%M")));
        out.push(String::new());
    }

    fn customer_block(&self, out: &mut Vec<String>, customer: &CustomerData) {
        let fields = customer.filled_fields();
        if fields.is_empty() {
            return;
        }
        out.push("CUSTOMER".to_string());
        out.push(RULE.to_string());
        out.extend(fields.into_iter().map(|(label, value)| format!("{label}: {value}")));
        out.push(String::new());
    }

    fn item_block(
        &self,
        out: &mut Vec<String>,
        n: usize,
        item: &CartItem,
        line: &LineTotal,
        prices: &ServicePrices,
    ) {
        let tire = &item.tire;
        out.push(format!(
            "{n}. {}  {} {}",
            tire.size_label(),
            tire.manufacturer,
            tire.product_line
        ));
        match tire.eu_label() {
            Some(label) => out.push(format!("   Part no. {}  EU label: {label}", tire.part_number)),
            None => out.push(format!("   Part no. {}", tire.part_number)),
        }
        out.push(format!(
            "   {} x {} = {}",
            item.quantity,
            self.amount(tire.price),
            self.amount(line.tires)
        ));
        if let Some(fee) = line.mounting {
            out.push(format!(
                "   + Mounting ({} x {}): {}",
                item.quantity,
                self.amount(prices.mounting_fee(tire.rim_diameter)),
                self.amount(fee)
            ));
        }
        if let (Some(tier), Some(fee)) = (item.services.wheel_change, line.wheel_change) {
            out.push(format!("   + Wheel change ({}): {}", tier.label(), self.amount(fee)));
        }
        if let Some(fee) = line.storage {
            out.push(format!("   + Storage: {}", self.amount(fee)));
        }
        out.push(format!("   Line total: {}", self.amount(line.subtotal())));
        out.push(String::new());
    }

    fn summary_row(&self, label: &str, money: Money) -> String {
        format!("{:<14}{:>16}", format!("{label}:"), self.amount(money))
    }
}
