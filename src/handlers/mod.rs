pub mod cart_handler;
pub mod product_handler;
pub mod user_handler;

use actix_web::HttpRequest;

use crate::error::{AppError, AppResult};
use crate::utils::validator::is_non_empty;

/// Resource routes take no query parameters; any are treated as a request
/// for a page that does not exist.
pub(crate) fn reject_query_params(req: &HttpRequest) -> AppResult<()> {
    if req.query_string().is_empty() {
        Ok(())
    } else {
        Err(AppError::not_found("Page not found"))
    }
}

/// A present, non-blank field, trimmed.
pub(crate) fn required_trimmed<'a>(value: &'a Option<String>, message: &str) -> AppResult<&'a str> {
    present(value, message).map(str::trim)
}

/// A present, non-blank field, exactly as sent.
pub(crate) fn present<'a>(value: &'a Option<String>, message: &str) -> AppResult<&'a str> {
    value
        .as_deref()
        .filter(|v| is_non_empty(v))
        .ok_or_else(|| AppError::bad_request(message))
}
