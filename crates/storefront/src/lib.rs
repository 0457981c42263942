//! NOH Eyewear storefront library.
//!
//! Server-rendered storefront over the Shopify Storefront API: variant
//! resolution for product pages, collection grids, a coordinated cart and
//! the newsletter signup. Exposed as a library so the router can be tested
//! without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod shopify;
pub mod state;
