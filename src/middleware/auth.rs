use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::Utc;
use futures_util::future::LocalBoxFuture;
use log::warn;

use crate::error::AppError;
use crate::models::user_model::User;
use crate::state::AppState;
use crate::utils::auth::{bearer_token, Claims};
use crate::utils::validator::parse_object_id;

/// The owner of the `{userId}` path segment, proven by a bearer token.
///
/// Taking this as a handler argument runs both gates before the handler
/// body: authentication (signature, then a manual expiry check) and
/// authorization (the token subject must be the user named in the path).
pub struct AuthorizedUser {
    pub user: User,
}

impl FromRequest for AuthorizedUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::Internal("application state is not configured".into()))?;

            let claims = authenticate(&req, state)?;
            let user = authorize(&req, state, &claims).await?;
            Ok(Self { user })
        })
    }
}

fn authenticate(req: &HttpRequest, state: &AppState) -> Result<Claims, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = bearer_token(header)?;
    state.tokens.authenticate(token, Utc::now()).map_err(|err| {
        warn!("rejected token for {}: {err}", req.path());
        AppError::from(err)
    })
}

async fn authorize(req: &HttpRequest, state: &AppState, claims: &Claims) -> Result<User, AppError> {
    let user_id = req
        .match_info()
        .get("userId")
        .and_then(parse_object_id)
        .ok_or_else(|| AppError::bad_request("enter a valid userId"))?;

    let user = state
        .users
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    if claims.sub != user.id.to_string() {
        warn!("user {} attempted to access {}", claims.sub, user.id);
        return Err(AppError::Forbidden("unauthorized access".into()));
    }
    Ok(user)
}
