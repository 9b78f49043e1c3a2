//! MRSHOPY web server library.
//!
//! The storefront, account pages, admin and staff panels are served by one
//! axum application; this crate exposes its pieces so they can be tested and
//! reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
