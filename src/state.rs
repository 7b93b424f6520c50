use std::sync::Arc;

use crate::store::{CartStore, ProductStore, UserStore};
use crate::utils::auth::TokenKeys;
use crate::utils::upload::ImageUploader;

/// Shared by every worker through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub carts: Arc<dyn CartStore>,
    pub uploader: Arc<dyn ImageUploader>,
    pub tokens: TokenKeys,
    pub max_upload_bytes: usize,
}
