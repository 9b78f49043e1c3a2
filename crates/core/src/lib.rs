//! MRSHOPY Core - domain types and storefront rules.
//!
//! This crate is shared by the web server (`storefront`) and the `cli`.
//!
//! # Architecture
//!
//! Only types and pure functions live here: no I/O, no database access, no
//! HTTP. Everything that decides *what* the shop does (validation, totals,
//! role resolution, reports) is testable without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, prices and statuses
//! - [`catalog`] - Products, form validation, listing filters
//! - [`order`] - Orders and the single-product checkout
//! - [`roles`] - Email allowlists and the admin/staff gate
//! - [`reviews`] - Reviews derived from order notes
//! - [`reports`] - Dashboard figures and customer list
//! - [`settings`] - Site settings, banner, user profile

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod order;
pub mod reports;
pub mod reviews;
pub mod roles;
pub mod settings;
pub mod types;

pub use types::*;
