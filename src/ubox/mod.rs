//! Ubox portal integration module
//!
//! - `client`: Portal API client (token management, HTTP requests)
//! - `normalize`: Response-shape translation into device records
//! - `signature`: Login password signing
//! - `models`: Normalized device types

pub mod client;
pub mod models;
pub mod normalize;
pub mod signature;

pub use client::{UboxClient, UboxError};
pub use models::{DeviceRecord, OnlineState};
