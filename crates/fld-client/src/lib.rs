//! # fld-client
//!
//! The field-service API boundary for Fieldline.
//!
//! - [`FieldService`]: every remote operation the installation workflow needs
//!   (serial lookup, record detail, compliance, checklist schema, OTP request
//!   and verification, bulk create, retirement, customer search)
//! - [`HttpFieldService`]: the reqwest implementation against the REST API
//! - Wire types for the bulk-create payload and paginated results

mod error;
mod http;
mod rest;
mod service;
pub mod types;

pub use error::ClientError;
pub use rest::HttpFieldService;
pub use service::FieldService;
