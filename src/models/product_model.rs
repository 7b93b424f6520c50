use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::form::FormData;

/// Size tokens a product can be offered in.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Size {
    S,
    XS,
    M,
    X,
    L,
    XXL,
    XL,
}

impl Size {
    pub const ALL: [Size; 7] = [
        Size::S,
        Size::XS,
        Size::M,
        Size::X,
        Size::L,
        Size::XXL,
        Size::XL,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Size::S => "S",
            Size::XS => "XS",
            Size::M => "M",
            Size::X => "X",
            Size::L => "L",
            Size::XXL => "XXL",
            Size::XL => "XL",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownSize;

impl FromStr for Size {
    type Err = UnknownSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Size::ALL
            .into_iter()
            .find(|size| size.as_str() == s)
            .ok_or(UnknownSize)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub currency_id: String,
    pub currency_format: String,
    pub is_free_shipping: bool,
    pub product_image: String,
    pub style: Option<String>,
    pub available_sizes: Vec<Size>,
    pub installments: Option<i32>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub currency_id: String,
    pub currency_format: String,
    pub is_free_shipping: bool,
    pub product_image: String,
    pub style: Option<String>,
    pub available_sizes: Vec<Size>,
    pub installments: Option<i32>,
}

#[derive(sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub currency_id: String,
    pub currency_format: String,
    pub is_free_shipping: bool,
    pub product_image: String,
    pub style: Option<String>,
    pub available_sizes: Vec<String>,
    pub installments: Option<i32>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        // The column only ever receives values written from `Size::as_str`.
        let available_sizes = row
            .available_sizes
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            currency_id: row.currency_id,
            currency_format: row.currency_format,
            is_free_shipping: row.is_free_shipping,
            product_image: row.product_image,
            style: row.style,
            available_sizes,
            installments: row.installments,
            is_deleted: row.is_deleted,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Text fields of a product create or update request. `None` means the key
/// was not sent at all.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub currency_id: Option<String>,
    pub currency_format: Option<String>,
    pub is_free_shipping: Option<String>,
    pub style: Option<String>,
    pub available_sizes: Option<String>,
    pub installments: Option<String>,
}

impl ProductForm {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            title: form.text("title"),
            description: form.text("description"),
            price: form.text("price"),
            currency_id: form.text("currencyId"),
            currency_format: form.text("currencyFormat"),
            is_free_shipping: form.text("isFreeShipping"),
            style: form.text("style"),
            available_sizes: form.text("availableSizes"),
            installments: form.text("installments"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_parse_is_exact() {
        for size in Size::ALL {
            assert_eq!(size.as_str().parse::<Size>(), Ok(size));
        }
        assert_eq!("xl".parse::<Size>(), Err(UnknownSize));
        assert_eq!("XXXL".parse::<Size>(), Err(UnknownSize));
    }

    #[test]
    fn test_size_serializes_as_token() {
        let json = serde_json::to_string(&vec![Size::XXL, Size::S]).unwrap();
        assert_eq!(json, r#"["XXL","S"]"#);
    }
}
