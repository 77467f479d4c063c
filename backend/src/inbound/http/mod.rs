//! HTTP inbound adapter exposing the ride REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod rides;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
