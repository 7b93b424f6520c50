use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::form::FormData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPart {
    pub street: String,
    pub city: String,
    pub pincode: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub shipping: AddressPart,
    pub billing: AddressPart,
}

/// A registered user. `password` always holds the argon2 PHC string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub profile_image: String,
    pub address: Address,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fully validated registration data, ready to persist.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub profile_image: String,
    pub address: Address,
}

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub profile_image: String,
    pub shipping_street: String,
    pub shipping_city: String,
    pub shipping_pincode: i32,
    pub billing_street: String,
    pub billing_city: String,
    pub billing_pincode: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            fname: row.fname,
            lname: row.lname,
            email: row.email,
            phone: row.phone,
            password: row.password,
            profile_image: row.profile_image,
            address: Address {
                shipping: AddressPart {
                    street: row.shipping_street,
                    city: row.shipping_city,
                    pincode: row.shipping_pincode,
                },
                billing: AddressPart {
                    street: row.billing_street,
                    city: row.billing_city,
                    pincode: row.billing_pincode,
                },
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A pincode as sent by clients: either a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PincodeInput {
    Number(i64),
    Text(String),
}

impl PincodeInput {
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// One address block of a request; every key is optional so that presence
/// can be checked field by field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPartInput {
    pub street: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<PincodeInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressInput {
    pub shipping: Option<AddressPartInput>,
    pub billing: Option<AddressPartInput>,
}

/// Text fields of a registration or profile-update request. `None` means
/// the key was not sent at all.
#[derive(Debug, Clone, Default)]
pub struct UserForm {
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    /// Raw JSON of the `address` field.
    pub address: Option<String>,
}

impl UserForm {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            fname: form.text("fname"),
            lname: form.text("lname"),
            email: form.text("email"),
            phone: form.text("phone"),
            password: form.text("password"),
            address: form.text("address"),
        }
    }
}
