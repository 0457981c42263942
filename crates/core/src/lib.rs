//! NOH Core - Shared types library.
//!
//! Types used by the storefront that carry no I/O: opaque Shopify
//! identifiers, money amounts and validated email addresses.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for Shopify IDs, money and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
