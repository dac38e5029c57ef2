//! ACRCloud identification API integration
//!
//! ACRCloud identifies music from short audio samples submitted with an
//! HMAC-signed multipart request.
//! API docs: https://docs.acrcloud.com/reference/identification-api

pub mod adapter;
mod client;
pub mod dto;

pub use adapter::{first_match, to_recognition};
pub use client::AcrCloudClient;
