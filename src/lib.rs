//! ml-alert-gateway Library
//!
//! Manages anomaly-detection alert watches through the cluster UI's developer-console proxy.
//!
//! ## Architecture
//!
//! The codebase is organized into modules:
//! - `gateway`: [`AlertGateway`], the public operations (list, fetch, delete, activate,
//!   deactivate, bulk update, save, script check, job timing)
//! - `batch`: sequential best-effort fold over alert IDs
//! - `watch`: typed inputs, watch templates, builder and bulk patch
//! - `scripts`: the painless notification scripts
//! - `ml`: job / datafeed timing calculations
//! - `proxy`: console proxy query strings and API paths
//! - `transport`: HTTP seam and the reqwest implementation
//! - `duration`: human duration parsing
//! - `config`: settings and well-known paths
//! - `logging`: structured logging with tracing

pub mod batch;
pub mod config;
pub mod duration;
pub mod error;
pub mod gateway;
mod logging;
pub mod ml;
pub mod proxy;
pub mod scripts;
pub mod transport;
pub mod watch;

pub use batch::BatchOutcome;
pub use error::GatewayError;
pub use gateway::{AlertGateway, ScriptCheckReport};
pub use logging::{ellipse, init_tracing, mask_credential};
