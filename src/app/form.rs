use std::collections::BTreeMap;

use crate::constants::TEXT_INPUT_MAX_LEN;
use crate::inventory::NewItem;

pub const FIELD_NAME: usize = 0;
pub const FIELD_DESCRIPTION: usize = 1;
pub const FIELD_CATEGORY: usize = 2;
pub const FIELD_QUANTITY: usize = 3;
pub const FIELD_PRICE: usize = 4;
pub const FIELD_SKU: usize = 5;
pub const FIELD_LOCATION: usize = 6;
pub const FIELD_SUPPLIER: usize = 7;

pub const FIELD_LABELS: [&str; 8] = [
    "Item Name",
    "Description",
    "Category",
    "Quantity",
    "Unit Price ($)",
    "SKU",
    "Location",
    "Supplier",
];

pub const CATEGORIES: [&str; 8] = [
    "Electronics",
    "Furniture",
    "Office Supplies",
    "Peripherals",
    "Hardware",
    "Software",
    "Networking",
    "Storage",
];

/// State of the add-item form: one text buffer per field plus the errors
/// from the last submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemForm {
    pub values: [String; 8],
    pub focused: usize,
    pub errors: BTreeMap<usize, String>,
}

impl Default for ItemForm {
    fn default() -> Self {
        let mut values: [String; 8] = Default::default();
        values[FIELD_QUANTITY] = "1".to_string();
        ItemForm { values, focused: FIELD_NAME, errors: BTreeMap::new() }
    }
}

fn min_len(value: &str, min: usize, message: &str) -> Result<(), String> {
    if value.trim().chars().count() < min {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

impl ItemForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn next_field(&mut self) {
        self.focused = (self.focused + 1) % self.values.len();
    }

    pub fn previous_field(&mut self) {
        self.focused = (self.focused + self.values.len() - 1) % self.values.len();
    }

    pub fn input(&mut self, c: char) {
        let numeric = matches!(self.focused, FIELD_QUANTITY | FIELD_PRICE);
        if numeric && !(c.is_ascii_digit() || (c == '.' && self.focused == FIELD_PRICE)) {
            return;
        }
        let value = &mut self.values[self.focused];
        if !c.is_control() && value.chars().count() < TEXT_INPUT_MAX_LEN {
            value.push(c);
            self.errors.remove(&self.focused);
        }
    }

    pub fn backspace(&mut self) {
        self.values[self.focused].pop();
    }

    /// On the category field, replaces the value with the next suggestion.
    pub fn cycle_category(&mut self) {
        let current = self.values[FIELD_CATEGORY].trim();
        let next = CATEGORIES
            .iter()
            .position(|c| c.eq_ignore_ascii_case(current))
            .map(|i| (i + 1) % CATEGORIES.len())
            .unwrap_or(0);
        self.values[FIELD_CATEGORY] = CATEGORIES[next].to_string();
        self.errors.remove(&FIELD_CATEGORY);
    }

    pub fn error_for(&self, field: usize) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Checks every field, recording a message per invalid one. Returns the
    /// parsed item only when all fields pass.
    pub fn validate(&mut self) -> Option<NewItem> {
        self.errors.clear();
        let v = &self.values;

        let checks = [
            (FIELD_NAME, min_len(&v[FIELD_NAME], 2, "Name must be at least 2 characters")),
            (
                FIELD_DESCRIPTION,
                min_len(&v[FIELD_DESCRIPTION], 5, "Description must be at least 5 characters"),
            ),
            (FIELD_CATEGORY, min_len(&v[FIELD_CATEGORY], 1, "Category is required")),
            (FIELD_SKU, min_len(&v[FIELD_SKU], 3, "SKU must be at least 3 characters")),
            (FIELD_LOCATION, min_len(&v[FIELD_LOCATION], 1, "Location is required")),
            (FIELD_SUPPLIER, min_len(&v[FIELD_SUPPLIER], 1, "Supplier is required")),
        ];
        for (field, check) in checks {
            if let Err(message) = check {
                self.errors.insert(field, message);
            }
        }

        let quantity = match v[FIELD_QUANTITY].trim().parse::<u32>() {
            Ok(q) if q >= 1 => Some(q),
            _ => {
                self.errors.insert(FIELD_QUANTITY, "Quantity must be at least 1".to_string());
                None
            }
        };
        let price = match v[FIELD_PRICE].trim().parse::<f64>() {
            Ok(p) if p.is_finite() && p >= 0.01 => Some(p),
            _ => {
                self.errors.insert(FIELD_PRICE, "Price must be greater than 0".to_string());
                None
            }
        };

        if !self.errors.is_empty() {
            return None;
        }
        Some(NewItem {
            name: v[FIELD_NAME].trim().to_string(),
            description: v[FIELD_DESCRIPTION].trim().to_string(),
            category: v[FIELD_CATEGORY].trim().to_string(),
            quantity: quantity?,
            price: price?,
            sku: v[FIELD_SKU].trim().to_string(),
            location: v[FIELD_LOCATION].trim().to_string(),
            supplier: v[FIELD_SUPPLIER].trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ItemForm {
        let mut form = ItemForm::default();
        form.values = [
            "Widget".into(),
            "Small widget".into(),
            "Hardware".into(),
            "5".into(),
            "2.50".into(),
            "HW-001".into(),
            "Warehouse A".into(),
            "Acme".into(),
        ];
        form
    }

    #[test]
    fn valid_form_produces_item() {
        let item = filled().validate().unwrap();
        assert_eq!(item.name, "Widget");
        assert_eq!(item.quantity, 5);
        assert!((item.price - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn reports_each_invalid_field() {
        let mut form = filled();
        form.values[FIELD_NAME] = "W".into();
        form.values[FIELD_QUANTITY] = "0".into();
        form.values[FIELD_PRICE] = "0.001".into();
        form.values[FIELD_SUPPLIER] = " ".into();

        assert!(form.validate().is_none());
        assert_eq!(form.error_for(FIELD_NAME), Some("Name must be at least 2 characters"));
        assert!(form.error_for(FIELD_QUANTITY).is_some());
        assert!(form.error_for(FIELD_PRICE).is_some());
        assert!(form.error_for(FIELD_SUPPLIER).is_some());
        assert!(form.error_for(FIELD_SKU).is_none());
    }

    #[test]
    fn numeric_fields_reject_letters() {
        let mut form = ItemForm::default();
        form.focused = FIELD_QUANTITY;
        form.input('x');
        form.input('2');
        assert_eq!(form.values[FIELD_QUANTITY], "12");

        form.focused = FIELD_PRICE;
        for c in "9.5a".chars() {
            form.input(c);
        }
        assert_eq!(form.values[FIELD_PRICE], "9.5");
    }

    #[test]
    fn category_cycles_through_suggestions() {
        let mut form = ItemForm::default();
        form.cycle_category();
        assert_eq!(form.values[FIELD_CATEGORY], "Electronics");
        form.values[FIELD_CATEGORY] = "storage".into();
        form.cycle_category();
        assert_eq!(form.values[FIELD_CATEGORY], "Electronics");
    }
}
