//! The inventory item entity.

use crate::error::{InventoryError, InventoryResult};
use shelfdb_codec::Value;
use shelfdb_core::entity::member;
use shelfdb_core::{DynEntity, Entity, Member, SurrogateId};

/// A stocked item, keyed by SKU.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InventoryItem {
    id: Option<SurrogateId>,
    /// Stock-keeping unit; the primary key.
    pub sku: String,
    /// Free-form description.
    pub description: String,
    /// Quantity on hand. Never negative through the typed operations.
    pub quantity: i64,
    /// Sale price.
    pub price: f64,
}

static ITEM_MEMBERS: [Member<InventoryItem>; 4] = [
    Member::new(
        "sku",
        |item| Value::from(item.sku.as_str()),
        |item, v| {
            item.sku = member::text::<InventoryItem>("sku", v)?;
            Ok(())
        },
    ),
    Member::new(
        "description",
        |item| Value::from(item.description.as_str()),
        |item, v| {
            item.description = member::text::<InventoryItem>("description", v)?;
            Ok(())
        },
    ),
    Member::new(
        "quantity",
        |item| Value::Integer(item.quantity),
        |item, v| {
            item.quantity = member::integer::<InventoryItem>("quantity", v)?;
            Ok(())
        },
    ),
    Member::new(
        "price",
        |item| Value::Float(item.price),
        |item, v| {
            item.price = member::float::<InventoryItem>("price", v)?;
            Ok(())
        },
    ),
];

impl Entity for InventoryItem {
    const TYPE_NAME: &'static str = "InventoryItem";
    const PRIMARY_KEY: &'static str = "sku";

    fn members() -> &'static [Member<Self>] {
        &ITEM_MEMBERS
    }

    fn identity(&self) -> Option<SurrogateId> {
        self.id
    }

    fn set_identity(&mut self, id: Option<SurrogateId>) {
        self.id = id;
    }
}

impl InventoryItem {
    /// Surrogate ID assigned by the manager.
    #[must_use]
    pub fn id(&self) -> Option<SurrogateId> {
        self.id
    }

    /// Adds `count` units to the quantity on hand.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::Core`] if the item is not managed yet
    /// - [`InventoryError::QuantityOverflow`] if the new quantity would not
    ///   fit; the quantity is left unchanged
    pub fn receive(&mut self, count: u32) -> InventoryResult<()> {
        self.validate_ready()?;
        self.quantity = self.quantity.checked_add(i64::from(count)).ok_or_else(|| {
            InventoryError::QuantityOverflow {
                sku: self.sku.clone(),
                requested: count,
                on_hand: self.quantity,
            }
        })?;
        Ok(())
    }

    /// Removes `count` units from the quantity on hand.
    ///
    /// # Errors
    ///
    /// [`InventoryError::InsufficientStock`] if fewer than `count` units are
    /// on hand; the quantity is left unchanged.
    pub fn ship(&mut self, count: u32) -> InventoryResult<()> {
        self.validate_ready()?;
        let requested = i64::from(count);
        if requested > self.quantity {
            return Err(InventoryError::InsufficientStock {
                sku: self.sku.clone(),
                requested: count,
                on_hand: self.quantity,
            });
        }
        self.quantity -= requested;
        Ok(())
    }

    /// Sets the sale price.
    ///
    /// # Errors
    ///
    /// [`InventoryError::InvalidPrice`] for a negative or non-finite price;
    /// the price is left unchanged.
    pub fn set_sale_price(&mut self, price: f64) -> InventoryResult<()> {
        self.validate_ready()?;
        if !price.is_finite() || price < 0.0 {
            return Err(InventoryError::InvalidPrice {
                sku: self.sku.clone(),
                price,
            });
        }
        self.price = price;
        Ok(())
    }
}
