use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kiemke_core::{Entity, ItemCode};

/// One counted row of a stock-count sheet.
///
/// Identity is the item code (case-insensitive). `line_total` is derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLineItem {
    pub item_code: ItemCode,
    #[serde(default)]
    pub item_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_of_manufacture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    /// Counted on-hand quantity; the value sessions are compared on.
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl InventoryLineItem {
    pub fn new(item_code: impl Into<ItemCode>, item_name: impl Into<String>) -> Self {
        Self {
            item_code: item_code.into(),
            item_name: item_name.into(),
            group_name: None,
            unit: None,
            origin_of_manufacture: None,
            unit_price: None,
            quantity: Decimal::ZERO,
            note: None,
        }
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_group(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin_of_manufacture = Some(origin.into());
        self
    }

    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// `unit_price × quantity`; zero when the price is unknown, `None` when
    /// the product does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        match self.unit_price {
            Some(price) => price.checked_mul(self.quantity),
            None => Some(Decimal::ZERO),
        }
    }

    /// Same descriptive fields, quantity set to zero.
    pub fn zeroed(&self) -> Self {
        Self {
            quantity: Decimal::ZERO,
            ..self.clone()
        }
    }
}

impl Entity for InventoryLineItem {
    type Id = ItemCode;

    fn id(&self) -> &Self::Id {
        &self.item_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn line_total_multiplies_price_and_quantity() {
        let item = InventoryLineItem::new("VT-01", "Xi măng")
            .with_unit_price(dec!(95000))
            .with_quantity(dec!(2.5));
        assert_eq!(item.line_total(), Some(dec!(237500)));
    }

    #[test]
    fn line_total_is_zero_without_price() {
        let item = InventoryLineItem::new("VT-01", "Xi măng").with_quantity(dec!(7));
        assert_eq!(item.line_total(), Some(Decimal::ZERO));
    }

    #[test]
    fn line_total_overflow_is_none() {
        let item = InventoryLineItem::new("VT-01", "Xi măng")
            .with_unit_price(Decimal::MAX)
            .with_quantity(dec!(2));
        assert_eq!(item.line_total(), None);
    }

    #[test]
    fn zeroed_keeps_descriptive_fields() {
        let item = InventoryLineItem::new("VT-02", "Thép cuộn")
            .with_group("Kim loại")
            .with_unit("kg")
            .with_origin("Việt Nam")
            .with_unit_price(dec!(18000))
            .with_quantity(dec!(40));

        let zero = item.zeroed();
        assert_eq!(zero.quantity, Decimal::ZERO);
        assert_eq!(zero.group_name.as_deref(), Some("Kim loại"));
        assert_eq!(zero.unit_price, Some(dec!(18000)));
        assert_eq!(zero.item_code, item.item_code);
    }

    #[test]
    fn deserializes_camel_case_rows_with_numeric_or_text_quantities() {
        let json = r#"[
            {"itemCode": "VT-01", "itemName": "Xi măng", "quantity": 12, "unitPrice": "95000"},
            {"itemCode": "VT-02", "quantity": "3.5"}
        ]"#;
        let items: Vec<InventoryLineItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items[0].quantity, dec!(12));
        assert_eq!(items[0].unit_price, Some(dec!(95000)));
        assert_eq!(items[1].quantity, dec!(3.5));
        assert!(items[1].item_name.is_empty());
    }
}
