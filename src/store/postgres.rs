use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::query_builder::Separated;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    CartStore, PriceSort, ProductFilter, ProductStore, StoreError, UserStore, EMAIL_TAKEN,
    PHONE_TAKEN, TITLE_TAKEN,
};
use crate::models::cart_model::{Cart, CartRow};
use crate::models::product_model::{NewProduct, Product, ProductRow, Size};
use crate::models::user_model::{NewUser, User, UserRow};
use crate::utils::partial_update::{path, FieldValue, UpdateDocument};

const USER_COLUMNS: &str = "id, fname, lname, email, phone, password, profile_image, \
     shipping_street, shipping_city, shipping_pincode, \
     billing_street, billing_city, billing_pincode, created_at, updated_at";

const PRODUCT_COLUMNS: &str = "id, title, description, price, currency_id, currency_format, \
     is_free_shipping, product_image, style, available_sizes, installments, \
     is_deleted, deleted_at, created_at, updated_at";

const CART_COLUMNS: &str = "id, user_id, items, total_price, total_items, created_at, updated_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_column(storage_path: &str) -> Option<&'static str> {
    Some(match storage_path {
        path::FNAME => "fname",
        path::LNAME => "lname",
        path::EMAIL => "email",
        path::PHONE => "phone",
        path::PASSWORD => "password",
        path::PROFILE_IMAGE => "profile_image",
        path::SHIPPING_STREET => "shipping_street",
        path::SHIPPING_CITY => "shipping_city",
        path::SHIPPING_PINCODE => "shipping_pincode",
        path::BILLING_STREET => "billing_street",
        path::BILLING_CITY => "billing_city",
        path::BILLING_PINCODE => "billing_pincode",
        _ => return None,
    })
}

fn product_column(storage_path: &str) -> Option<&'static str> {
    Some(match storage_path {
        path::TITLE => "title",
        path::DESCRIPTION => "description",
        path::PRICE => "price",
        path::CURRENCY_ID => "currency_id",
        path::CURRENCY_FORMAT => "currency_format",
        path::IS_FREE_SHIPPING => "is_free_shipping",
        path::PRODUCT_IMAGE => "product_image",
        path::STYLE => "style",
        path::AVAILABLE_SIZES => "available_sizes",
        path::INSTALLMENTS => "installments",
        _ => return None,
    })
}

fn size_tokens(sizes: &[Size]) -> Vec<String> {
    sizes.iter().map(|s| s.as_str().to_string()).collect()
}

/// Escapes LIKE metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Turns unique-index violations into the conflict message the probes use.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = match db_err.constraint() {
                Some("users_email_key") => EMAIL_TAKEN.to_string(),
                Some("users_phone_key") => PHONE_TAKEN.to_string(),
                Some("products_title_active_idx") => TITLE_TAKEN.to_string(),
                other => format!(
                    "duplicate value violates {}",
                    other.unwrap_or("a unique constraint")
                ),
            };
            return StoreError::Conflict(message);
        }
    }
    StoreError::Database(err)
}

/// Appends `column = $n, ...` for every entry of `update`.
fn push_assignments(
    set: &mut Separated<'_, '_, Postgres, &'static str>,
    update: &UpdateDocument,
    column_for: fn(&str) -> Option<&'static str>,
) -> Result<(), StoreError> {
    for (storage_path, value) in update.iter() {
        let column =
            column_for(storage_path).ok_or_else(|| StoreError::UnknownPath(storage_path.to_string()))?;
        set.push(column);
        set.push_unseparated(" = ");
        match value {
            FieldValue::Text(text) => set.push_bind_unseparated(text.clone()),
            FieldValue::Price(price) => set.push_bind_unseparated(*price),
            FieldValue::Flag(flag) => set.push_bind_unseparated(*flag),
            FieldValue::Count(count) => set.push_bind_unseparated(*count),
            FieldValue::Sizes(sizes) => set.push_bind_unseparated(size_tokens(sizes)),
        };
    }
    set.push("updated_at = NOW()");
    Ok(())
}

#[async_trait]
impl UserStore for PgStore {
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool, StoreError> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE phone = $1")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (id, fname, lname, email, phone, password, profile_image, \
             shipping_street, shipping_city, shipping_pincode, \
             billing_street, billing_city, billing_pincode, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW(), NOW()) \
             RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.fname)
            .bind(&user.lname)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.password_hash)
            .bind(&user.profile_image)
            .bind(&user.address.shipping.street)
            .bind(&user.address.shipping.city)
            .bind(user.address.shipping.pincode)
            .bind(&user.address.billing.street)
            .bind(&user.address.billing.city)
            .bind(user.address.billing.pincode)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row.into())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn update_user(
        &self,
        id: Uuid,
        update: &UpdateDocument,
    ) -> Result<Option<User>, StoreError> {
        if update.is_empty() {
            return self.find_user_by_id(id).await;
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
        {
            let mut set = qb.separated(", ");
            push_assignments(&mut set, update, user_column)?;
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(USER_COLUMNS);

        let row: Option<UserRow> = qb
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row.map(User::from))
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn title_exists(&self, title: &str) -> Result<bool, StoreError> {
        let found: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM products WHERE title = $1 AND NOT is_deleted")
                .bind(title)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let sql = format!(
            "INSERT INTO products (id, title, description, price, currency_id, currency_format, \
             is_free_shipping, product_image, style, available_sizes, installments, \
             is_deleted, deleted_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, FALSE, NULL, NOW(), NOW()) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row: ProductRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&product.title)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.currency_id)
            .bind(&product.currency_format)
            .bind(product.is_free_shipping)
            .bind(&product.product_image)
            .bind(&product.style)
            .bind(size_tokens(&product.available_sizes))
            .bind(product.installments)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row.into())
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND NOT is_deleted");
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE NOT is_deleted"
        ));

        if let Some(sizes) = &filter.sizes {
            qb.push(" AND available_sizes && ").push_bind(size_tokens(sizes));
        }
        if let Some(name) = &filter.name {
            qb.push(" AND title ILIKE ")
                .push_bind(format!("%{}%", escape_like(name)));
        }
        if let Some(price) = filter.price_gt {
            qb.push(" AND price > ").push_bind(price);
        }
        if let Some(price) = filter.price_lt {
            qb.push(" AND price < ").push_bind(price);
        }
        qb.push(match filter.price_sort {
            Some(PriceSort::Ascending) => " ORDER BY price ASC, created_at ASC",
            Some(PriceSort::Descending) => " ORDER BY price DESC, created_at ASC",
            None => " ORDER BY created_at ASC",
        });

        let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn update_product(
        &self,
        id: Uuid,
        update: &UpdateDocument,
    ) -> Result<Option<Product>, StoreError> {
        if update.is_empty() {
            return self.find_product(id).await;
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE products SET ");
        {
            let mut set = qb.separated(", ");
            push_assignments(&mut set, update, product_column)?;
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND NOT is_deleted RETURNING ")
            .push(PRODUCT_COLUMNS);

        let row: Option<ProductRow> = qb
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row.map(Product::from))
    }

    async fn soft_delete_product(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE products SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn find_or_create_cart(&self, user_id: Uuid) -> Result<Cart, StoreError> {
        sqlx::query(
            "INSERT INTO carts (id, user_id, created_at, updated_at) \
             VALUES ($1, $2, NOW(), NOW()) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let sql = format!("SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1");
        let row: CartRow = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("shirt"), "shirt");
    }

    #[test]
    fn test_every_builder_path_has_a_column() {
        for p in [
            path::FNAME,
            path::LNAME,
            path::EMAIL,
            path::PHONE,
            path::PASSWORD,
            path::PROFILE_IMAGE,
            path::SHIPPING_STREET,
            path::SHIPPING_CITY,
            path::SHIPPING_PINCODE,
            path::BILLING_STREET,
            path::BILLING_CITY,
            path::BILLING_PINCODE,
        ] {
            assert!(user_column(p).is_some(), "{p}");
        }
        for p in [
            path::TITLE,
            path::DESCRIPTION,
            path::PRICE,
            path::CURRENCY_ID,
            path::CURRENCY_FORMAT,
            path::IS_FREE_SHIPPING,
            path::PRODUCT_IMAGE,
            path::STYLE,
            path::AVAILABLE_SIZES,
            path::INSTALLMENTS,
        ] {
            assert!(product_column(p).is_some(), "{p}");
        }
        assert!(user_column(path::TITLE).is_none());
        assert!(product_column("address.shipping.city").is_none());
    }
}
