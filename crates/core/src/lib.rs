//! Ironmonger Core - Shared domain types.
//!
//! This crate provides the types shared by every Ironmonger component:
//! - `storefront` - Public JSON API (cart, orders, addresses, wishlist)
//! - `cli` - Command-line tools for migrations, users, tokens and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no database
//! access, no HTTP. Database encodings for the id newtypes live behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, money arithmetic, statuses, payment methods and
//!   size selection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
