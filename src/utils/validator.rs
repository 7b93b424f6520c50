//! Shape and format checks for raw request values.
//!
//! Every predicate is total over `&str` and side-effect free.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::product_model::Size;

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$")
            .expect("valid email pattern");
    static ref PHONE: Regex = Regex::new(r"^[6-9][0-9]{9}$").expect("valid pattern");
    static ref PINCODE: Regex = Regex::new(r"^[1-9][0-9]{5}$").expect("valid pattern");
    static ref PRICE: Regex = Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").expect("valid pattern");
    static ref ALPHA: Regex = Regex::new(r"^[A-Za-z]+$").expect("valid pattern");
    static ref COUNT: Regex = Regex::new(r"^[0-9]+$").expect("valid pattern");
}

pub fn is_non_empty(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}

/// Ten digits, leading 6-9 (mobile numbering).
pub fn is_phone(value: &str) -> bool {
    PHONE.is_match(value.trim())
}

/// 8 to 15 ASCII alphanumerics with at least one letter and one digit.
pub fn is_password(value: &str) -> bool {
    (8..=15).contains(&value.len())
        && value.chars().all(|c| c.is_ascii_alphanumeric())
        && value.chars().any(|c| c.is_ascii_alphabetic())
        && value.chars().any(|c| c.is_ascii_digit())
}

pub fn is_pincode(value: &str) -> bool {
    PINCODE.is_match(value.trim())
}

/// Non-negative decimal with at most two fractional digits.
pub fn is_price(value: &str) -> bool {
    PRICE.is_match(value.trim())
}

pub fn is_alpha_only(value: &str) -> bool {
    ALPHA.is_match(value.trim())
}

pub fn is_object_id(value: &str) -> bool {
    Uuid::parse_str(value.trim()).is_ok()
}

pub fn parse_object_id(value: &str) -> Option<Uuid> {
    if !is_object_id(value) {
        return None;
    }
    Uuid::parse_str(value.trim()).ok()
}

pub fn parse_pincode(value: &str) -> Option<i32> {
    if !is_pincode(value) {
        return None;
    }
    value.trim().parse().ok()
}

/// Parses a price that passes [`is_price`] and fits the catalog's
/// `NUMERIC(12, 2)` column.
pub fn parse_price(value: &str) -> Option<Decimal> {
    if !is_price(value) {
        return None;
    }
    let max = Decimal::new(999_999_999_999, 2);
    Decimal::from_str(value.trim()).ok().filter(|price| *price <= max)
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

pub fn parse_count(value: &str) -> Option<i32> {
    let value = value.trim();
    if !COUNT.is_match(value) {
        return None;
    }
    value.parse().ok()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SizeError {
    #[error("sizes should be a list like: [\"X\", \"M\", \"L\"]")]
    Malformed,
    #[error("at least one size is required")]
    Empty,
    #[error("available sizes should be from: S, XS, M, X, L, XXL, XL")]
    Unknown(String),
}

/// Accepts either a JSON array (`["S","M"]`) or a comma list (`S,M`).
/// Duplicates are dropped, first occurrence wins.
pub fn parse_sizes(value: &str) -> Result<Vec<Size>, SizeError> {
    let value = value.trim();
    let tokens: Vec<String> = if value.starts_with('[') {
        serde_json::from_str(value).map_err(|_| SizeError::Malformed)?
    } else {
        value
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    };

    let mut sizes = Vec::with_capacity(tokens.len());
    for token in tokens {
        let size: Size = token
            .trim()
            .parse()
            .map_err(|_| SizeError::Unknown(token.clone()))?;
        if !sizes.contains(&size) {
            sizes.push(size);
        }
    }

    if sizes.is_empty() {
        return Err(SizeError::Empty);
    }
    Ok(sizes)
}
