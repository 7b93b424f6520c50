use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use log::{info, warn};
use serde::Deserialize;
use uuid::Uuid;

use super::{reject_query_params, required_trimmed};
use crate::error::{AppError, AppResult};
use crate::models::product_model::{NewProduct, ProductForm};
use crate::models::response_model::ApiResponse;
use crate::state::AppState;
use crate::store::{PriceSort, ProductFilter, TITLE_TAKEN};
use crate::utils::currency::symbol_for;
use crate::utils::form::FormData;
use crate::utils::partial_update::{build_product_update, path, FieldValue};
use crate::utils::validator::{
    is_non_empty, parse_count, parse_flag, parse_object_id, parse_price, parse_sizes,
};

#[post("/products")]
pub async fn create_product(
    req: HttpRequest,
    payload: Multipart,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    reject_query_params(&req)?;

    let form = FormData::from_multipart(&req, payload, state.max_upload_bytes).await?;
    if form.is_empty() {
        return Err(AppError::bad_request("Product data is required"));
    }
    let input = ProductForm::from_form(&form);

    let title = required_trimmed(&input.title, "Product title is required")?;
    if state.products.title_exists(title).await? {
        warn!("product rejected: title already in use");
        return Err(AppError::conflict(TITLE_TAKEN));
    }

    let description = required_trimmed(&input.description, "Product description is required")?;

    let price = required_trimmed(&input.price, "Product price is required")?;
    let price = parse_price(price).ok_or_else(|| AppError::bad_request("Enter a valid Product price"))?;

    let currency_id = required_trimmed(&input.currency_id, "currencyId is required")?;
    let symbol =
        symbol_for(currency_id).ok_or_else(|| AppError::bad_request("currencyId is not valid"))?;

    let currency_format = required_trimmed(&input.currency_format, "currencyFormat is required")?;
    if currency_format != symbol {
        return Err(AppError::bad_request(
            "currencyFormat is not matching with currencyId",
        ));
    }

    let is_free_shipping = match &input.is_free_shipping {
        Some(flag) => parse_flag(flag)
            .ok_or_else(|| AppError::bad_request("isFreeShipping should be boolean"))?,
        None => false,
    };

    let style = match &input.style {
        Some(style) if is_non_empty(style) => Some(style.trim().to_string()),
        Some(_) => return Err(AppError::bad_request("product style should be in valid format")),
        None => None,
    };

    let sizes = required_trimmed(&input.available_sizes, "product available sizes are required")?;
    let available_sizes = parse_sizes(sizes).map_err(|e| AppError::bad_request(e.to_string()))?;

    let installments = match &input.installments {
        Some(raw) => Some(parse_count(raw).ok_or_else(|| {
            AppError::bad_request("Product installments should be in valid format")
        })?),
        None => None,
    };

    let image = form
        .first_file()
        .ok_or_else(|| AppError::bad_request("product image is required"))?;
    let product_image = state.uploader.upload(image).await?;

    let product = state
        .products
        .insert_product(NewProduct {
            title: title.to_string(),
            description: description.to_string(),
            price,
            currency_id: currency_id.to_ascii_uppercase(),
            currency_format: currency_format.to_string(),
            is_free_shipping,
            product_image,
            style,
            available_sizes,
            installments,
        })
        .await?;

    info!("product {} created", product.id);
    Ok(HttpResponse::Created().json(ApiResponse::with_data(
        "new product added successfully",
        product,
    )))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub size: Option<String>,
    pub name: Option<String>,
    pub price_greater_than: Option<String>,
    pub price_less_than: Option<String>,
    pub price_sort: Option<String>,
}

impl ProductQuery {
    /// Validates in the order size, price bounds, sort, name.
    pub fn into_filter(self) -> AppResult<ProductFilter> {
        let mut filter = ProductFilter::default();

        if let Some(sizes) = &self.size {
            filter.sizes = Some(parse_sizes(sizes).map_err(|e| AppError::bad_request(e.to_string()))?);
        }
        if let Some(min) = &self.price_greater_than {
            filter.price_gt =
                Some(parse_price(min).ok_or_else(|| AppError::bad_request("Enter a valid price"))?);
        }
        if let Some(max) = &self.price_less_than {
            filter.price_lt =
                Some(parse_price(max).ok_or_else(|| AppError::bad_request("Enter a valid price"))?);
        }
        if let Some(sort) = &self.price_sort {
            filter.price_sort = Some(match sort.trim() {
                "1" => PriceSort::Ascending,
                "-1" => PriceSort::Descending,
                _ => {
                    return Err(AppError::bad_request(
                        "price sort should be a number: -1 or 1",
                    ))
                }
            });
        }
        if let Some(name) = &self.name {
            if !is_non_empty(name) {
                return Err(AppError::bad_request("product name should be in valid format"));
            }
            filter.name = Some(name.trim().to_string());
        }
        Ok(filter)
    }
}

#[get("/products")]
pub async fn list_products(
    req: HttpRequest,
    query: web::Query<ProductQuery>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let filtered = !req.query_string().is_empty();
    let filter = query.into_inner().into_filter()?;

    let products = state.products.list_products(&filter).await?;
    if products.is_empty() {
        return Err(AppError::not_found("no product found"));
    }

    let message = if filtered {
        "Filtered product list is here"
    } else {
        "Product list is here"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::with_count(message, products.len(), products)))
}

fn product_id(raw: &str) -> AppResult<Uuid> {
    parse_object_id(raw).ok_or_else(|| AppError::bad_request("Invalid product id"))
}

#[get("/products/{productId}")]
pub async fn get_product(
    req: HttpRequest,
    product_path: web::Path<String>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    reject_query_params(&req)?;
    let id = product_id(&product_path)?;

    let product = state
        .products
        .find_product(id)
        .await?
        .ok_or_else(|| AppError::not_found("No product found by product id"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_data("product details", product)))
}

#[put("/products/{productId}")]
pub async fn update_product(
    req: HttpRequest,
    product_path: web::Path<String>,
    payload: Multipart,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    reject_query_params(&req)?;
    let id = product_id(&product_path)?;

    let current = state
        .products
        .find_product(id)
        .await?
        .ok_or_else(|| AppError::not_found("No product found by product id"))?;

    let form = FormData::from_multipart(&req, payload, state.max_upload_bytes).await?;
    if form.is_empty() {
        return Err(AppError::bad_request("Update data required"));
    }

    let mut update =
        build_product_update(&ProductForm::from_form(&form), &current, state.products.as_ref())
            .await?;
    if let Some(image) = form.first_file() {
        let url = state.uploader.upload(image).await?;
        update.set(path::PRODUCT_IMAGE, FieldValue::Text(url));
    }

    // The product may have been deleted since it was read.
    let product = state
        .products
        .update_product(id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("No product found by product id"))?;

    info!(
        "product {} updated: {}",
        product.id,
        update.paths().collect::<Vec<_>>().join(", ")
    );
    Ok(HttpResponse::Ok().json(ApiResponse::with_data(
        "Product data updated successfully",
        product,
    )))
}

#[delete("/products/{productId}")]
pub async fn delete_product(
    req: HttpRequest,
    product_path: web::Path<String>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    reject_query_params(&req)?;
    let id = product_id(&product_path)?;

    if !state.products.soft_delete_product(id).await? {
        return Err(AppError::not_found("No product found by this product id"));
    }

    info!("product {id} deleted");
    Ok(HttpResponse::Ok().json(ApiResponse::message("Product successfully deleted")))
}
