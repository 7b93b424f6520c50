pub mod auth;
pub mod currency;
pub mod form;
pub mod partial_update;
pub mod upload;
pub mod validator;
