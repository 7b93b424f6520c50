use actix_multipart::Multipart;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use log::{info, warn};
use serde_json::Value;

use super::{present, reject_query_params, required_trimmed};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthorizedUser;
use crate::models::auth_model::{LoginData, LoginRequest};
use crate::models::response_model::ApiResponse;
use crate::models::user_model::{Address, AddressPart, AddressPartInput, AddressInput, NewUser, UserForm};
use crate::state::AppState;
use crate::store::{EMAIL_TAKEN, PHONE_TAKEN};
use crate::utils::auth::{hash_password, verify_password};
use crate::utils::form::FormData;
use crate::utils::partial_update::{build_user_update, path, FieldValue};
use crate::utils::validator::{is_alpha_only, is_email, is_password, is_phone, parse_pincode};

const PASSWORD_FORMAT: &str =
    "Password should be of 8 to 15 characters and must have 1 letter and 1 number";

#[post("/register")]
pub async fn register(
    req: HttpRequest,
    payload: Multipart,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    reject_query_params(&req)?;

    let form = FormData::from_multipart(&req, payload, state.max_upload_bytes).await?;
    if form.is_empty() {
        return Err(AppError::bad_request("User data is required for registration"));
    }
    let input = UserForm::from_form(&form);

    let fname = required_trimmed(&input.fname, "first name is required like: JOHN")?;
    if !is_alpha_only(fname) {
        return Err(AppError::bad_request("first name should be in valid format like: JOHN"));
    }

    let lname = required_trimmed(&input.lname, "last name is required like: DOE")?;
    if !is_alpha_only(lname) {
        return Err(AppError::bad_request("last name should be in valid format like: DOE"));
    }

    let email = required_trimmed(&input.email, "email address is required")?;
    if !is_email(email) {
        return Err(AppError::bad_request(
            "Please enter a valid email address like : xyz@gmail.com",
        ));
    }
    if state.users.email_exists(email).await? {
        warn!("registration rejected: email already in use");
        return Err(AppError::conflict(EMAIL_TAKEN));
    }

    let image = form
        .first_file()
        .ok_or_else(|| AppError::bad_request("no profile image found"))?;

    let phone = required_trimmed(&input.phone, "Phone number is required")?;
    if !is_phone(phone) {
        return Err(AppError::bad_request(
            "Please enter a valid phone number like : 9638527410",
        ));
    }
    if state.users.phone_exists(phone).await? {
        warn!("registration rejected: phone already in use");
        return Err(AppError::conflict(PHONE_TAKEN));
    }

    let password = present(&input.password, "password is required")?;
    if !is_password(password) {
        return Err(AppError::bad_request(PASSWORD_FORMAT));
    }

    let raw_address = required_trimmed(&input.address, "address is required")?;
    let address: AddressInput = serde_json::from_str(raw_address)
        .map_err(|_| AppError::bad_request("address should be a valid JSON object"))?;
    let address = Address {
        shipping: required_address_part("Shipping", address.shipping.as_ref())?,
        billing: required_address_part("Billing", address.billing.as_ref())?,
    };

    let password_hash = hash_password(password)?;
    let profile_image = state.uploader.upload(image).await?;

    let user = state
        .users
        .insert_user(NewUser {
            fname: fname.to_string(),
            lname: lname.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password_hash,
            profile_image,
            address,
        })
        .await?;

    info!("user {} registered", user.id);
    Ok(HttpResponse::Created().json(ApiResponse::with_data("User successfully registered", user)))
}

fn required_address_part(label: &str, part: Option<&AddressPartInput>) -> AppResult<AddressPart> {
    let part = part.ok_or_else(|| AppError::bad_request(format!("{label} address is required")))?;

    let street = required_trimmed(
        &part.street,
        &format!("{label} address: street name is required"),
    )?;
    let city = required_trimmed(&part.city, &format!("{label} address: city name is required"))?;
    let pincode = part
        .pincode
        .as_ref()
        .and_then(|pincode| parse_pincode(&pincode.as_text()))
        .ok_or_else(|| {
            AppError::bad_request(format!(
                "{label} address: pin code is required like: 335659"
            ))
        })?;

    Ok(AddressPart {
        street: street.to_string(),
        city: city.to_string(),
        pincode,
    })
}

#[post("/login")]
pub async fn login(
    req: HttpRequest,
    body: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    reject_query_params(&req)?;

    let credentials = body.into_inner();
    if credentials.is_empty() {
        return Err(AppError::bad_request("User data is required for login"));
    }

    let email = required_trimmed(&credentials.email, "email is required")?;
    if !is_email(email) {
        return Err(AppError::bad_request("Enter a valid email"));
    }
    let password = present(&credentials.password, "password is required")?;
    if !is_password(password) {
        return Err(AppError::bad_request(PASSWORD_FORMAT));
    }

    let user = state
        .users
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| AppError::not_found("No user found by email"))?;

    if !verify_password(&user.password, password)? {
        warn!("failed login for user {}", user.id);
        return Err(AppError::bad_request("incorrect password"));
    }

    let token = state.tokens.issue(&user.id)?;
    info!("user {} logged in", user.id);

    Ok(HttpResponse::Ok()
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .json(ApiResponse::with_data(
            "login successful",
            LoginData {
                user_id: user.id,
                token,
            },
        )))
}

#[get("/user/{userId}/profile")]
pub async fn get_profile(
    auth: AuthorizedUser,
    req: HttpRequest,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    reject_query_params(&req)?;
    if carries_data(&body) {
        return Err(AppError::bad_request("User data is not required"));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::with_data("user profile details", auth.user)))
}

/// Anything other than nothing, whitespace, `null` or `{}`.
fn carries_data(body: &[u8]) -> bool {
    if body.iter().all(u8::is_ascii_whitespace) {
        return false;
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) => false,
        Ok(Value::Object(fields)) => !fields.is_empty(),
        _ => true,
    }
}

#[post("/user/{userId}/profile")]
pub async fn update_profile(
    auth: AuthorizedUser,
    req: HttpRequest,
    payload: Multipart,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    reject_query_params(&req)?;

    let form = FormData::from_multipart(&req, payload, state.max_upload_bytes).await?;
    let mut update = build_user_update(&UserForm::from_form(&form), state.users.as_ref()).await?;

    if let Some(image) = form.first_file() {
        let url = state.uploader.upload(image).await?;
        update.set(path::PROFILE_IMAGE, FieldValue::Text(url));
    }

    let user = state
        .users
        .update_user(auth.user.id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    if !update.is_empty() {
        info!(
            "user {} updated: {}",
            user.id,
            update.paths().collect::<Vec<_>>().join(", ")
        );
    }
    Ok(HttpResponse::Ok().json(ApiResponse::with_data("user profile updated", user)))
}
