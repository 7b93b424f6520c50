use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    CartStore, PriceSort, ProductFilter, ProductStore, StoreError, UserStore, EMAIL_TAKEN,
    PHONE_TAKEN, TITLE_TAKEN,
};
use crate::models::cart_model::Cart;
use crate::models::product_model::{NewProduct, Product};
use crate::models::user_model::{NewUser, User};
use crate::utils::partial_update::{path, FieldValue, UpdateDocument};

/// In-process store with the same constraints as the PostgreSQL schema.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    products: Mutex<Vec<Product>>,
    carts: Mutex<Vec<Cart>>,
}

impl MemoryStore {
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn product_count(&self) -> usize {
        self.products.lock().unwrap().len()
    }

    /// Includes soft-deleted rows.
    pub fn raw_product(&self, id: Uuid) -> Option<Product> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }
}

fn unknown(storage_path: &str) -> StoreError {
    StoreError::UnknownPath(storage_path.to_string())
}

fn apply_user(user: &mut User, update: &UpdateDocument) -> Result<(), StoreError> {
    for (storage_path, value) in update.iter() {
        match (storage_path, value) {
            (path::FNAME, FieldValue::Text(v)) => user.fname = v.clone(),
            (path::LNAME, FieldValue::Text(v)) => user.lname = v.clone(),
            (path::EMAIL, FieldValue::Text(v)) => user.email = v.clone(),
            (path::PHONE, FieldValue::Text(v)) => user.phone = v.clone(),
            (path::PASSWORD, FieldValue::Text(v)) => user.password = v.clone(),
            (path::PROFILE_IMAGE, FieldValue::Text(v)) => user.profile_image = v.clone(),
            (path::SHIPPING_STREET, FieldValue::Text(v)) => user.address.shipping.street = v.clone(),
            (path::SHIPPING_CITY, FieldValue::Text(v)) => user.address.shipping.city = v.clone(),
            (path::SHIPPING_PINCODE, FieldValue::Count(v)) => user.address.shipping.pincode = *v,
            (path::BILLING_STREET, FieldValue::Text(v)) => user.address.billing.street = v.clone(),
            (path::BILLING_CITY, FieldValue::Text(v)) => user.address.billing.city = v.clone(),
            (path::BILLING_PINCODE, FieldValue::Count(v)) => user.address.billing.pincode = *v,
            _ => return Err(unknown(storage_path)),
        }
    }
    Ok(())
}

fn apply_product(product: &mut Product, update: &UpdateDocument) -> Result<(), StoreError> {
    for (storage_path, value) in update.iter() {
        match (storage_path, value) {
            (path::TITLE, FieldValue::Text(v)) => product.title = v.clone(),
            (path::DESCRIPTION, FieldValue::Text(v)) => product.description = v.clone(),
            (path::PRICE, FieldValue::Price(v)) => product.price = *v,
            (path::CURRENCY_ID, FieldValue::Text(v)) => product.currency_id = v.clone(),
            (path::CURRENCY_FORMAT, FieldValue::Text(v)) => product.currency_format = v.clone(),
            (path::IS_FREE_SHIPPING, FieldValue::Flag(v)) => product.is_free_shipping = *v,
            (path::PRODUCT_IMAGE, FieldValue::Text(v)) => product.product_image = v.clone(),
            (path::STYLE, FieldValue::Text(v)) => product.style = Some(v.clone()),
            (path::AVAILABLE_SIZES, FieldValue::Sizes(v)) => product.available_sizes = v.clone(),
            (path::INSTALLMENTS, FieldValue::Count(v)) => product.installments = Some(*v),
            _ => return Err(unknown(storage_path)),
        }
    }
    Ok(())
}

fn text_of<'a>(update: &'a UpdateDocument, storage_path: &str) -> Option<&'a str> {
    match update.get(storage_path) {
        Some(FieldValue::Text(v)) => Some(v.as_str()),
        _ => None,
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool, StoreError> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.phone == phone))
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(EMAIL_TAKEN.to_string()));
        }
        if users.iter().any(|u| u.phone == user.phone) {
            return Err(StoreError::Conflict(PHONE_TAKEN.to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            fname: user.fname,
            lname: user.lname,
            email: user.email,
            phone: user.phone,
            password: user.password_hash,
            profile_image: user.profile_image,
            address: user.address,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_user(
        &self,
        id: Uuid,
        update: &UpdateDocument,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.lock().unwrap();
        if let Some(email) = text_of(update, path::EMAIL) {
            if users.iter().any(|u| u.id != id && u.email == email) {
                return Err(StoreError::Conflict(EMAIL_TAKEN.to_string()));
            }
        }
        if let Some(phone) = text_of(update, path::PHONE) {
            if users.iter().any(|u| u.id != id && u.phone == phone) {
                return Err(StoreError::Conflict(PHONE_TAKEN.to_string()));
            }
        }
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if !update.is_empty() {
            apply_user(user, update)?;
            user.updated_at = Utc::now();
        }
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn title_exists(&self, title: &str) -> Result<bool, StoreError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .any(|p| !p.is_deleted && p.title == title))
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut products = self.products.lock().unwrap();
        if products.iter().any(|p| !p.is_deleted && p.title == product.title) {
            return Err(StoreError::Conflict(TITLE_TAKEN.to_string()));
        }
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            title: product.title,
            description: product.description,
            price: product.price,
            currency_id: product.currency_id,
            currency_format: product.currency_format,
            is_free_shipping: product.is_free_shipping,
            product_image: product.product_image,
            style: product.style,
            available_sizes: product.available_sizes,
            installments: product.installments,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        products.push(product.clone());
        Ok(product)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id && !p.is_deleted)
            .cloned())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let name = filter.name.as_ref().map(|n| n.to_lowercase());
        let mut found: Vec<Product> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| !p.is_deleted)
            .filter(|p| {
                filter.sizes.as_ref().map_or(true, |sizes| {
                    sizes.iter().any(|s| p.available_sizes.contains(s))
                })
            })
            .filter(|p| {
                name.as_ref()
                    .map_or(true, |n| p.title.to_lowercase().contains(n.as_str()))
            })
            .filter(|p| filter.price_gt.map_or(true, |min| p.price > min))
            .filter(|p| filter.price_lt.map_or(true, |max| p.price < max))
            .cloned()
            .collect();

        // Insertion order stands in for creation order; the sort is stable.
        match filter.price_sort {
            Some(PriceSort::Ascending) => found.sort_by_key(|p| p.price),
            Some(PriceSort::Descending) => found.sort_by_key(|p| std::cmp::Reverse(p.price)),
            None => {}
        }
        Ok(found)
    }

    async fn update_product(
        &self,
        id: Uuid,
        update: &UpdateDocument,
    ) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.lock().unwrap();
        if let Some(title) = text_of(update, path::TITLE) {
            if products
                .iter()
                .any(|p| p.id != id && !p.is_deleted && p.title == title)
            {
                return Err(StoreError::Conflict(TITLE_TAKEN.to_string()));
            }
        }
        let Some(product) = products.iter_mut().find(|p| p.id == id && !p.is_deleted) else {
            return Ok(None);
        };
        if !update.is_empty() {
            apply_product(product, update)?;
            product.updated_at = Utc::now();
        }
        Ok(Some(product.clone()))
    }

    async fn soft_delete_product(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut products = self.products.lock().unwrap();
        match products.iter_mut().find(|p| p.id == id && !p.is_deleted) {
            Some(product) => {
                let now = Utc::now();
                product.is_deleted = true;
                product.deleted_at = Some(now);
                product.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn find_or_create_cart(&self, user_id: Uuid) -> Result<Cart, StoreError> {
        let mut carts = self.carts.lock().unwrap();
        if let Some(cart) = carts.iter().find(|c| c.user_id == user_id) {
            return Ok(cart.clone());
        }
        let now = Utc::now();
        let cart = Cart {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
            total_price: Decimal::ZERO,
            total_items: 0,
            created_at: now,
            updated_at: now,
        };
        carts.push(cart.clone());
        Ok(cart)
    }
}
