//! Ironmonger storefront library.
//!
//! The JSON commerce API (cart, orders, address book, wishlist) as a
//! library, so the binary, the CLI and the router tests share one code path.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
