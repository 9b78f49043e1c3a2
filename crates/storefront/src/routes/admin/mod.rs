//! Super-admin panel under `/admin`.
//!
//! Every handler takes [`RequireSuperAdmin`](crate::middleware::RequireSuperAdmin),
//! so anyone else is sent to `/shop` before the handler runs. Product
//! management lives in [`super::catalog`] and is shared with the staff panel.

pub mod dashboard;
pub mod orders;
pub mod settings;
pub mod users;
