use actix_web::{get, web, HttpResponse};

use crate::error::{AppError, AppResult};
use crate::handlers::{cart_handler, product_handler, user_handler};
use crate::models::response_model::ApiResponse;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::bad_request(err.to_string()).into()),
    )
    .service(test_me)
    .service(user_handler::register)
    .service(user_handler::login)
    .service(user_handler::get_profile)
    .service(user_handler::update_profile)
    .service(product_handler::create_product)
    .service(product_handler::list_products)
    .service(product_handler::get_product)
    .service(product_handler::update_product)
    .service(product_handler::delete_product)
    .service(cart_handler::get_cart)
    .default_service(web::to(page_not_found));
}

#[get("/test-me")]
async fn test_me() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::message("test-api working fine"))
}

async fn page_not_found() -> AppResult<HttpResponse> {
    Err(AppError::not_found("Page not found"))
}
