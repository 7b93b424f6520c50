//! Sparse, field-at-a-time validated updates.
//!
//! A builder walks the recognized fields of a request in a fixed order. For
//! every field that was sent it validates the raw value, stops at the first
//! failure, and otherwise writes the normalized value under the field's
//! storage path. Fields that were not sent never appear in the output, so an
//! empty [`UpdateDocument`] is a valid no-op.

use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};
use crate::models::product_model::{Product, ProductForm, Size};
use crate::models::user_model::{AddressInput, AddressPartInput, UserForm};
use crate::store::{ProductStore, UserStore, EMAIL_TAKEN, PHONE_TAKEN, TITLE_TAKEN};
use crate::utils::auth::hash_password;
use crate::utils::currency::symbol_for;
use crate::utils::validator::{
    is_alpha_only, is_email, is_non_empty, is_password, is_phone, parse_count, parse_flag,
    parse_pincode, parse_price, parse_sizes,
};

/// Storage paths understood by the stores.
pub mod path {
    pub const FNAME: &str = "fname";
    pub const LNAME: &str = "lname";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const PASSWORD: &str = "password";
    pub const PROFILE_IMAGE: &str = "profileImage";
    pub const SHIPPING_STREET: &str = "address.shipping.street";
    pub const SHIPPING_CITY: &str = "address.shipping.city";
    pub const SHIPPING_PINCODE: &str = "address.shipping.pincode";
    pub const BILLING_STREET: &str = "address.billing.street";
    pub const BILLING_CITY: &str = "address.billing.city";
    pub const BILLING_PINCODE: &str = "address.billing.pincode";

    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const PRICE: &str = "price";
    pub const CURRENCY_ID: &str = "currencyId";
    pub const CURRENCY_FORMAT: &str = "currencyFormat";
    pub const IS_FREE_SHIPPING: &str = "isFreeShipping";
    pub const PRODUCT_IMAGE: &str = "productImage";
    pub const STYLE: &str = "style";
    pub const AVAILABLE_SIZES: &str = "availableSizes";
    pub const INSTALLMENTS: &str = "installments";
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Price(Decimal),
    Flag(bool),
    Count(i32),
    Sizes(Vec<Size>),
}

/// Ordered "set these fields" document keyed by storage path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateDocument {
    fields: Vec<(&'static str, FieldValue)>,
}

impl UpdateDocument {
    /// Sets `path`, replacing an earlier value for the same path in place.
    pub fn set(&mut self, path: &'static str, value: FieldValue) {
        match self.fields.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((path, value)),
        }
    }

    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(p, _)| *p == path).map(|(_, v)| v)
    }

    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(p, _)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(p, v)| (*p, v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Profile update. Field order: fname, lname, email, phone, password,
/// shipping address, billing address.
pub async fn build_user_update(form: &UserForm, users: &dyn UserStore) -> AppResult<UpdateDocument> {
    let mut doc = UpdateDocument::default();

    if let Some(fname) = &form.fname {
        if !is_alpha_only(fname) {
            return Err(AppError::bad_request("first name should be in valid format like: JOHN"));
        }
        doc.set(path::FNAME, FieldValue::Text(fname.trim().to_string()));
    }

    if let Some(lname) = &form.lname {
        if !is_alpha_only(lname) {
            return Err(AppError::bad_request("last name should be in valid format like: DOE"));
        }
        doc.set(path::LNAME, FieldValue::Text(lname.trim().to_string()));
    }

    if let Some(email) = &form.email {
        if !is_non_empty(email) {
            return Err(AppError::bad_request("email should be in valid format"));
        }
        if !is_email(email) {
            return Err(AppError::bad_request("invalid email"));
        }
        let email = email.trim();
        if users.email_exists(email).await? {
            return Err(AppError::conflict(EMAIL_TAKEN));
        }
        doc.set(path::EMAIL, FieldValue::Text(email.to_string()));
    }

    if let Some(phone) = &form.phone {
        if !is_non_empty(phone) {
            return Err(AppError::bad_request("phone should be in valid format"));
        }
        if !is_phone(phone) {
            return Err(AppError::bad_request("invalid phone"));
        }
        let phone = phone.trim();
        if users.phone_exists(phone).await? {
            return Err(AppError::conflict(PHONE_TAKEN));
        }
        doc.set(path::PHONE, FieldValue::Text(phone.to_string()));
    }

    if let Some(password) = &form.password {
        if !is_password(password) {
            return Err(AppError::bad_request(
                "Password should be of 8 to 15 characters and must have 1 letter and 1 number",
            ));
        }
        doc.set(path::PASSWORD, FieldValue::Text(hash_password(password)?));
    }

    if let Some(raw) = &form.address {
        let address: AddressInput = serde_json::from_str(raw)
            .map_err(|_| AppError::bad_request("address should be a valid JSON object"))?;
        if let Some(shipping) = &address.shipping {
            set_address_part(
                &mut doc,
                "shipping",
                shipping,
                [path::SHIPPING_STREET, path::SHIPPING_CITY, path::SHIPPING_PINCODE],
            )?;
        }
        if let Some(billing) = &address.billing {
            set_address_part(
                &mut doc,
                "billing",
                billing,
                [path::BILLING_STREET, path::BILLING_CITY, path::BILLING_PINCODE],
            )?;
        }
    }

    Ok(doc)
}

fn set_address_part(
    doc: &mut UpdateDocument,
    label: &str,
    part: &AddressPartInput,
    [street_path, city_path, pincode_path]: [&'static str; 3],
) -> AppResult<()> {
    if let Some(street) = &part.street {
        if !is_non_empty(street) {
            return Err(AppError::bad_request(format!(
                "{label} address: street name should be in valid format"
            )));
        }
        doc.set(street_path, FieldValue::Text(street.trim().to_string()));
    }

    if let Some(city) = &part.city {
        if !is_non_empty(city) {
            return Err(AppError::bad_request(format!(
                "{label} address: city name should be in valid format"
            )));
        }
        doc.set(city_path, FieldValue::Text(city.trim().to_string()));
    }

    if let Some(pincode) = &part.pincode {
        let pincode = parse_pincode(&pincode.as_text()).ok_or_else(|| {
            AppError::bad_request(format!(
                "{label} address: pin code should be 6 digits like: 335659"
            ))
        })?;
        doc.set(pincode_path, FieldValue::Count(pincode));
    }

    Ok(())
}

/// Product update. `current` is the product being updated; its currency is
/// used to check `currencyFormat` when `currencyId` is not part of the same
/// request. Field order: title, description, price, currencyId,
/// currencyFormat, isFreeShipping, style, availableSizes, installments.
pub async fn build_product_update(
    form: &ProductForm,
    current: &Product,
    products: &dyn ProductStore,
) -> AppResult<UpdateDocument> {
    let mut doc = UpdateDocument::default();

    if let Some(title) = &form.title {
        if !is_non_empty(title) {
            return Err(AppError::bad_request("Invalid title"));
        }
        let title = title.trim();
        if products.title_exists(title).await? {
            return Err(AppError::conflict(TITLE_TAKEN));
        }
        doc.set(path::TITLE, FieldValue::Text(title.to_string()));
    }

    if let Some(description) = &form.description {
        if !is_non_empty(description) {
            return Err(AppError::bad_request("Invalid description"));
        }
        doc.set(path::DESCRIPTION, FieldValue::Text(description.trim().to_string()));
    }

    if let Some(price) = &form.price {
        let price = parse_price(price).ok_or_else(|| AppError::bad_request("Invalid price"))?;
        doc.set(path::PRICE, FieldValue::Price(price));
    }

    let mut currency_id = current.currency_id.clone();
    if let Some(raw) = &form.currency_id {
        let symbol = symbol_for(raw).ok_or_else(|| AppError::bad_request("Invalid currencyId"))?;
        currency_id = raw.trim().to_ascii_uppercase();
        doc.set(path::CURRENCY_ID, FieldValue::Text(currency_id.clone()));
        doc.set(path::CURRENCY_FORMAT, FieldValue::Text(symbol.to_string()));
    }

    if let Some(format) = &form.currency_format {
        let symbol = symbol_for(&currency_id);
        if symbol != Some(format.trim()) {
            return Err(AppError::bad_request(
                "currencyFormat is not matching with currencyId",
            ));
        }
        doc.set(path::CURRENCY_FORMAT, FieldValue::Text(format.trim().to_string()));
    }

    if let Some(flag) = &form.is_free_shipping {
        let flag = parse_flag(flag).ok_or_else(|| AppError::bad_request("Invalid FreeShipping"))?;
        doc.set(path::IS_FREE_SHIPPING, FieldValue::Flag(flag));
    }

    if let Some(style) = &form.style {
        if !is_non_empty(style) {
            return Err(AppError::bad_request("Invalid style"));
        }
        doc.set(path::STYLE, FieldValue::Text(style.trim().to_string()));
    }

    if let Some(sizes) = &form.available_sizes {
        let sizes = parse_sizes(sizes).map_err(|e| AppError::bad_request(e.to_string()))?;
        doc.set(path::AVAILABLE_SIZES, FieldValue::Sizes(sizes));
    }

    if let Some(installments) = &form.installments {
        let installments =
            parse_count(installments).ok_or_else(|| AppError::bad_request("invalid installments"))?;
        doc.set(path::INSTALLMENTS, FieldValue::Count(installments));
    }

    Ok(doc)
}
