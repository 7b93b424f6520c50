//! Fixtures shared by the handler and builder tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use actix_web::http::header::CONTENT_TYPE;
use actix_web::test::TestRequest;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::product_model::{NewProduct, Size};
use crate::models::user_model::{Address, AddressPart, NewUser};
use crate::state::AppState;
use crate::store::memory::MemoryStore;
use crate::utils::auth::{hash_password, TokenKeys};
use crate::utils::upload::{ImageUploader, UploadError, UploadedFile};

pub const TEST_SECRET: &str = "test-secret-0123456789";
pub const TEST_PASSWORD: &str = "abc12345";

const BOUNDARY: &str = "----shop-test-boundary";

/// Builds the app under test around `$state` with the production routes.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .configure(crate::routes::configure),
        )
        .await
    };
}
pub(crate) use test_app;

#[derive(Default)]
pub struct StubUploader {
    uploads: AtomicUsize,
}

impl StubUploader {
    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageUploader for StubUploader {
    async fn upload(&self, file: &UploadedFile) -> Result<String, UploadError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://images.test/{}", file.file_name))
    }
}

pub struct FailingUploader;

#[async_trait]
impl ImageUploader for FailingUploader {
    async fn upload(&self, _file: &UploadedFile) -> Result<String, UploadError> {
        Err(UploadError::Rejected("storage unavailable".to_string()))
    }
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub uploader: Arc<StubUploader>,
    pub keys: TokenKeys,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::default()),
            uploader: Arc::new(StubUploader::default()),
            keys: TokenKeys::new(TEST_SECRET, 1800),
        }
    }

    pub fn state(&self) -> AppState {
        self.state_with_uploader(self.uploader.clone())
    }

    pub fn state_with_uploader(&self, uploader: Arc<dyn ImageUploader>) -> AppState {
        AppState {
            users: self.store.clone(),
            products: self.store.clone(),
            carts: self.store.clone(),
            uploader,
            tokens: self.keys.clone(),
            max_upload_bytes: 1024 * 1024,
        }
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Registration data whose password is [`TEST_PASSWORD`].
pub fn sample_new_user(email: &str, phone: &str) -> NewUser {
    let part = AddressPart {
        street: "12 MG Road".to_string(),
        city: "Pune".to_string(),
        pincode: 411001,
    };
    NewUser {
        fname: "Asha".to_string(),
        lname: "Rao".to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        profile_image: "https://images.test/asha.png".to_string(),
        address: Address {
            shipping: part.clone(),
            billing: part,
        },
    }
}

pub fn sample_new_product(title: &str) -> NewProduct {
    NewProduct {
        title: title.to_string(),
        description: "Cotton, regular fit".to_string(),
        price: Decimal::new(49900, 2),
        currency_id: "INR".to_string(),
        currency_format: "₹".to_string(),
        is_free_shipping: false,
        product_image: "https://images.test/product.png".to_string(),
        style: None,
        available_sizes: vec![Size::M, Size::L],
        installments: None,
    }
}

/// A `multipart/form-data` body assembled part by part.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn attach(mut self, request: TestRequest) -> TestRequest {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        request
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(self.body)
    }
}
