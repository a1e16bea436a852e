//! Linear regression house price model.
//!
//! [`PriceModel`] owns one fitted ordinary-least-squares estimator and covers
//! its whole lifecycle: `train`, `predict`, `evaluate`, `save` and `load`.
//! The [`data`] module prepares the tabular input it expects.

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod model;
mod ols;
pub mod persistence;

pub use config::AppConfig;
pub use error::{ErrorKind, ModelError, Result};
pub use metrics::Evaluation;
pub use model::{FittedParams, ModelState, PriceModel};
