use serde::{Deserialize, Serialize};

use tiredesk_core::{DomainError, DomainResult, Entity, Money, PartNumber, ValueObject};
use tiredesk_inventory::TireRecord;
use tiredesk_pricing::{ServicePrices, WheelChangeTier};

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 8;
pub const DEFAULT_QUANTITY: u32 = 4;

/// Clamp a quantity typed into an input field to the accepted range.
///
/// The cart itself takes whatever it is given; bounding is the input
/// surface's job.
pub fn clamp_quantity(requested: i64) -> u32 {
    requested.clamp(i64::from(MIN_QUANTITY), i64::from(MAX_QUANTITY)) as u32
}

/// Cart line identity: `<part number>_<price>`.
///
/// Including the price means a re-priced tire lands on its own line instead
/// of being merged into the old one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItemId(String);

impl CartItemId {
    pub fn for_tire(part_number: &PartNumber, price: Money) -> Self {
        Self(format!("{part_number}_{price}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CartItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CartItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Workshop services booked with a cart line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSelection {
    /// Mounting ("Montage"), charged per tire.
    pub mounting: bool,
    /// Wheel change ("Radwechsel") package, charged once per line.
    pub wheel_change: Option<WheelChangeTier>,
    /// Storage ("Einlagerung"), charged once per line.
    pub storage: bool,
}

impl ValueObject for ServiceSelection {}

impl ServiceSelection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        !self.mounting && self.wheel_change.is_none() && !self.storage
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    /// Copy of the catalog row as it was when the tire was added.
    pub tire: TireRecord,
    pub quantity: u32,
    pub services: ServiceSelection,
}

impl Entity for CartItem {
    type Id = CartItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Priced figures for one cart line.
///
/// A service that was not booked is `None`; a booked service is `Some`, even
/// when its configured fee is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineTotal {
    pub id: CartItemId,
    pub tires: Money,
    pub mounting: Option<Money>,
    pub wheel_change: Option<Money>,
    pub storage: Option<Money>,
}

impl LineTotal {
    pub fn subtotal(&self) -> Money {
        self.tires
            + self.mounting.unwrap_or_default()
            + self.wheel_change.unwrap_or_default()
            + self.storage.unwrap_or_default()
    }
}

/// Cart totals partitioned by what is being paid for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CartTotal {
    pub tires: Money,
    pub mounting: Money,
    pub wheel_change: Money,
    pub storage: Money,
    pub total: Money,
}

impl CartTotal {
    fn from_lines(lines: &[LineTotal]) -> Self {
        let tires: Money = lines.iter().map(|l| l.tires).sum();
        let mounting: Money = lines.iter().filter_map(|l| l.mounting).sum();
        let wheel_change: Money = lines.iter().filter_map(|l| l.wheel_change).sum();
        let storage: Money = lines.iter().filter_map(|l| l.storage).sum();
        Self {
            tires,
            mounting,
            wheel_change,
            storage,
            total: tires + mounting + wheel_change + storage,
        }
    }
}

/// Ordered list of cart lines for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.has_id(id))
    }

    fn get_mut(&mut self, id: &CartItemId) -> DomainResult<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|i| i.has_id(id))
            .ok_or_else(|| DomainError::not_found(format!("cart item '{id}'")))
    }

    /// Add a tire. The same part at the same price is refused; the same part
    /// at a different price becomes a separate line.
    pub fn add_item(
        &mut self,
        tire: &TireRecord,
        quantity: u32,
        services: ServiceSelection,
    ) -> DomainResult<&CartItem> {
        let id = CartItemId::for_tire(&tire.part_number, tire.price);
        if self.get(&id).is_some() {
            tracing::debug!(item = %id, "cart add skipped, already present");
            return Err(DomainError::duplicate(format!(
                "{} {} is already in the cart",
                tire.manufacturer, tire.part_number
            )));
        }

        tracing::debug!(item = %id, quantity, "cart item added");
        self.items.push(CartItem {
            id,
            tire: tire.clone(),
            quantity,
            services,
        });
        Ok(&self.items[self.items.len() - 1])
    }

    /// Add with the default quantity (4) and no services.
    pub fn add_tire(&mut self, tire: &TireRecord) -> DomainResult<&CartItem> {
        self.add_item(tire, DEFAULT_QUANTITY, ServiceSelection::none())
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove_item(&mut self, id: &CartItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| !i.has_id(id));
        before != self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn set_quantity(&mut self, id: &CartItemId, quantity: u32) -> DomainResult<()> {
        self.get_mut(id)?.quantity = quantity;
        Ok(())
    }

    pub fn set_services(
        &mut self,
        id: &CartItemId,
        services: ServiceSelection,
    ) -> DomainResult<()> {
        self.get_mut(id)?.services = services;
        Ok(())
    }

    /// Price every line.
    ///
    /// Mounting is charged per tire; wheel change and storage once per line,
    /// whatever the quantity.
    pub fn line_totals(&self, prices: &ServicePrices) -> Vec<LineTotal> {
        self.items
            .iter()
            .map(|item| {
                let services = item.services;
                LineTotal {
                    id: item.id.clone(),
                    tires: item.tire.price.times(item.quantity),
                    mounting: services
                        .mounting
                        .then(|| prices.mounting_fee(item.tire.rim_diameter).times(item.quantity)),
                    wheel_change: services.wheel_change.map(|t| prices.wheel_change_fee(t)),
                    storage: services.storage.then(|| prices.storage_fee()),
                }
            })
            .collect()
    }

    pub fn compute_total(&self, prices: &ServicePrices) -> CartTotal {
        CartTotal::from_lines(&self.line_totals(prices))
    }
}
