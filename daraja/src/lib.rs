#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Async client adapter for the Safaricom Daraja (M-Pesa) API.
//!
//! The adapter manages the OAuth token lifecycle, derives request passwords,
//! normalizes and validates caller input, builds each provider payload and
//! classifies every failure into one of four error kinds.
//!
//! # Overview
//!
//! ```rust,ignore
//! use daraja::{ClientConfig, DarajaClient, params::StkPushParams};
//!
//! let client = DarajaClient::try_new(ClientConfig::from_env()?)?;
//! let response = client
//!     .stk_push(StkPushParams {
//!         amount: 100,
//!         phone_number: "0708374149".into(),
//!         callback_url: "https://example.com/callback".into(),
//!         account_reference: "ORDER123".into(),
//!         transaction_desc: "Test".into(),
//!     })
//!     .await?;
//! println!("{}", response.checkout_request_id);
//! ```
//!
//! # Modules
//!
//! - [`client`] - The operation client
//! - [`config`] - Credentials and environment selection
//! - [`endpoint`] - Operation catalogue and URL resolution
//! - [`error`] - Error taxonomy and response classification
//! - [`params`] - Caller arguments for each operation
//! - [`phone`] - Mobile number normalization
//! - [`proto`] - Wire format types
//! - [`signer`] - Password and Basic credential derivation
//! - [`timestamp`] - Clock abstraction and provider timestamps
//! - [`token`] - Single-flight OAuth token management
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation (on by default)

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod params;
pub mod phone;
pub mod proto;
pub mod signer;
pub mod timestamp;
pub mod token;
mod validate;

pub use client::DarajaClient;
pub use config::{ClientConfig, Environment, InitiatorCredentials};
pub use endpoint::Operation;
pub use error::{DarajaError, ErrorKind};
pub use phone::NormalizedPhone;
