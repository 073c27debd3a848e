//! Centralized error types for OpenStereo
//!
//! The driver core treats almost every failure as recoverable: a broken
//! profile keeps the previous configuration, an unknown key binding falls back
//! to an unbound key, and a telemetry socket that cannot bind is retried later.
//! These types exist so those paths can be logged and reported with enough
//! context, not so they can abort the driver.
//!
//! # Architecture
//!
//! - [`severity`]: [`ErrorSeverity`], shared by every error type
//! - [`profile`]: Profile loading and saving errors
//! - [`validation`]: Field validation errors raised while sanitizing a config
//! - [`binding`]: Key binding token resolution errors
//! - [`telemetry`]: External orientation and auto-depth feed errors
//!
//! # Example
//!
//! ```
//! use openstereo_errors::{ErrorSeverity, ValidationError};
//!
//! fn check_aspect(value: f32) -> Result<f32, ValidationError> {
//!     if !(value > 0.0) {
//!         return Err(ValidationError::non_positive("aspect_ratio", value));
//!     }
//!     Ok(value)
//! }
//!
//! let err = check_aspect(-1.0).err();
//! assert_eq!(err.map(|e| e.severity()), Some(ErrorSeverity::Warning));
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod binding;
pub mod profile;
pub mod severity;
pub mod telemetry;
pub mod validation;

pub use binding::BindingError;
pub use profile::ProfileError;
pub use severity::ErrorSeverity;
pub use telemetry::TelemetryError;
pub use validation::ValidationError;
