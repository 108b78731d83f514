pub mod asset;
pub mod auth;
pub mod user;
