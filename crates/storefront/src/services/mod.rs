//! Business logic services for the web server.
//!
//! # Services
//!
//! - `auth` - Password accounts and federated profile upserts
//! - `catalog` - Cached product reads, revalidating writes
//! - `orders` - Checkout, order listing and fulfilment
//! - `settings` - Site identity and banner documents
//! - `google` - Google OAuth client
//! - `images` - Signed Cloudinary uploads
//! - `cache` / `live` - Read cache and change notifications behind
//!   [`AppState::revalidate`](crate::state::AppState::revalidate)

pub mod auth;
pub mod cache;
pub mod catalog;
pub mod google;
pub mod images;
pub mod live;
pub mod orders;
pub mod settings;

pub use catalog::CatalogService;
pub use orders::OrderService;
pub use settings::SettingsService;
