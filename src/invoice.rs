use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One product/service row on an invoice. Quantity defaults to 1; unit price
/// starts unset until the user types one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: Option<f64>,
}

fn default_quantity() -> f64 {
    1.0
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: 1.0,
            unit_price: None,
        }
    }
}

/// Derived totals; recomputed from the current item list, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// Which field of a line item an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemField {
    Description,
    Quantity,
    UnitPrice,
}

/// `quantity * unit_price`, with non-finite or missing values coerced to 0.
pub fn line_total(item: &LineItem) -> f64 {
    let quantity = if item.quantity.is_finite() {
        item.quantity
    } else {
        0.0
    };
    let unit_price = item.unit_price.filter(|p| p.is_finite()).unwrap_or(0.0);
    quantity * unit_price
}

/// Sum line totals over all items. No tax model: tax is fixed at 0.
/// Full float precision is kept; rounding happens only at display time.
pub fn compute_totals(items: &[LineItem]) -> InvoiceTotals {
    let subtotal: f64 = items.iter().map(line_total).sum();
    let tax = 0.0;
    InvoiceTotals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

/// Numeric form input arrives as a number or a string; anything that does not
/// parse to a finite float counts as unset.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// The invoice form's ordered, mutable item list. Items have no identity
/// beyond their position; list order is display and send order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InvoiceDraft {
    pub items: Vec<LineItem>,
}

impl InvoiceDraft {
    /// Append a row with default values. No upper bound on row count.
    pub fn add_item(&mut self) {
        self.items.push(LineItem::default());
    }

    /// Remove the row at `index`. Removing the last row leaves an empty,
    /// still-usable draft.
    pub fn remove_item(&mut self, index: usize) -> Result<(), String> {
        if index >= self.items.len() {
            return Err(format!("No line item at index {}", index));
        }
        self.items.remove(index);
        Ok(())
    }

    /// Replace one field of one row. Invalid numeric input degrades to
    /// 0/unset rather than failing; required-field checks happen only at
    /// submission time in `validate`.
    pub fn update_item(&mut self, index: usize, field: ItemField, value: &Value) -> Result<(), String> {
        let item = self
            .items
            .get_mut(index)
            .ok_or_else(|| format!("No line item at index {}", index))?;
        match field {
            ItemField::Description => {
                item.description = value.as_str().unwrap_or_default().to_string();
            }
            ItemField::Quantity => {
                item.quantity = coerce_number(value).unwrap_or(0.0);
            }
            ItemField::UnitPrice => {
                item.unit_price = coerce_number(value);
            }
        }
        Ok(())
    }

    pub fn totals(&self) -> InvoiceTotals {
        compute_totals(&self.items)
    }

    /// Submission gate: every row needs a description and a unit price, and
    /// at least quantity 1. Never enforced by the aggregation itself.
    pub fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("Add at least one line item.".to_string());
        }
        for (idx, item) in self.items.iter().enumerate() {
            if item.description.trim().is_empty() {
                return Err(format!("Line {}: description is required.", idx + 1));
            }
            if item.unit_price.is_none() {
                return Err(format!("Line {}: unit price is required.", idx + 1));
            }
            if item.quantity < 1.0 {
                return Err(format!("Line {}: quantity must be at least 1.", idx + 1));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(description: &str, quantity: f64, unit_price: f64) -> LineItem {
        LineItem {
            description: description.to_string(),
            quantity,
            unit_price: Some(unit_price),
        }
    }

    #[test]
    fn totals_of_empty_list_are_zero() {
        let totals = compute_totals(&[]);
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.tax, 0.0);
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn subtotal_sums_quantity_times_unit_price() {
        let items = vec![item("Widget", 2.0, 10.0), item("Gadget", 1.0, 5.5)];
        let totals = compute_totals(&items);
        assert_eq!(totals.subtotal, 25.5);
        assert_eq!(totals.tax, 0.0);
        assert_eq!(totals.total, 25.5);
    }

    #[test]
    fn missing_or_non_finite_values_count_as_zero() {
        let missing_price = LineItem {
            description: "No price yet".to_string(),
            quantity: 3.0,
            unit_price: None,
        };
        assert_eq!(line_total(&missing_price), 0.0);

        let nan_quantity = LineItem {
            description: "Broken".to_string(),
            quantity: f64::NAN,
            unit_price: Some(10.0),
        };
        assert_eq!(line_total(&nan_quantity), 0.0);

        let infinite_price = LineItem {
            description: "Broken".to_string(),
            quantity: 2.0,
            unit_price: Some(f64::INFINITY),
        };
        assert_eq!(line_total(&infinite_price), 0.0);

        let totals = compute_totals(&[missing_price, nan_quantity, infinite_price]);
        assert_eq!(totals.subtotal, 0.0);
    }

    #[test]
    fn add_item_appends_default_row() {
        let mut draft = InvoiceDraft::default();
        draft.add_item();
        draft.add_item();
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[0].description, "");
        assert_eq!(draft.items[0].quantity, 1.0);
        assert_eq!(draft.items[0].unit_price, None);
    }

    #[test]
    fn remove_item_allows_reaching_empty_and_re_adding() {
        let mut draft = InvoiceDraft::default();
        draft.add_item();
        draft.remove_item(0).unwrap();
        assert!(draft.items.is_empty());
        draft.add_item();
        assert_eq!(draft.items.len(), 1);
    }

    #[test]
    fn remove_item_out_of_range_fails() {
        let mut draft = InvoiceDraft::default();
        draft.add_item();
        assert!(draft.remove_item(3).is_err());
        assert_eq!(draft.items.len(), 1);
    }

    #[test]
    fn update_item_replaces_single_field() {
        let mut draft = InvoiceDraft::default();
        draft.add_item();
        draft
            .update_item(0, ItemField::Description, &json!("Consulting"))
            .unwrap();
        draft.update_item(0, ItemField::Quantity, &json!(3)).unwrap();
        draft
            .update_item(0, ItemField::UnitPrice, &json!("12.50"))
            .unwrap();
        assert_eq!(draft.items[0].description, "Consulting");
        assert_eq!(draft.items[0].quantity, 3.0);
        assert_eq!(draft.items[0].unit_price, Some(12.5));
        assert_eq!(draft.totals().total, 37.5);
    }

    #[test]
    fn update_item_with_garbage_number_degrades_to_unset() {
        let mut draft = InvoiceDraft::default();
        draft.add_item();
        draft
            .update_item(0, ItemField::UnitPrice, &json!("abc"))
            .unwrap();
        assert_eq!(draft.items[0].unit_price, None);
        draft.update_item(0, ItemField::Quantity, &json!("")).unwrap();
        assert_eq!(draft.items[0].quantity, 0.0);
        assert_eq!(draft.totals().subtotal, 0.0);
    }

    #[test]
    fn order_is_preserved_across_mutations() {
        let mut draft = InvoiceDraft {
            items: vec![item("a", 1.0, 1.0), item("b", 1.0, 2.0), item("c", 1.0, 3.0)],
        };
        draft.remove_item(1).unwrap();
        let descriptions: Vec<&str> = draft.items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, vec!["a", "c"]);
    }

    #[test]
    fn validate_requires_description_price_and_quantity() {
        let mut draft = InvoiceDraft::default();
        assert!(draft.validate().is_err());

        draft.add_item();
        let err = draft.validate().unwrap_err();
        assert!(err.contains("description"));

        draft
            .update_item(0, ItemField::Description, &json!("Widget"))
            .unwrap();
        let err = draft.validate().unwrap_err();
        assert!(err.contains("unit price"));

        draft.update_item(0, ItemField::UnitPrice, &json!(10)).unwrap();
        draft.update_item(0, ItemField::Quantity, &json!(0)).unwrap();
        let err = draft.validate().unwrap_err();
        assert!(err.contains("quantity"));

        draft.update_item(0, ItemField::Quantity, &json!(2)).unwrap();
        assert!(draft.validate().is_ok());
    }
}
