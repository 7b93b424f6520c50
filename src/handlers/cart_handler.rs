use actix_web::{get, web, HttpRequest, HttpResponse};

use super::reject_query_params;
use crate::error::AppResult;
use crate::middleware::auth::AuthorizedUser;
use crate::models::response_model::ApiResponse;
use crate::state::AppState;

/// Returns the caller's cart, creating an empty one on first access.
#[get("/user/{userId}/cart")]
pub async fn get_cart(
    auth: AuthorizedUser,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    reject_query_params(&req)?;
    let cart = state.carts.find_or_create_cart(auth.user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_data("cart details", cart)))
}
