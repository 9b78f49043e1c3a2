//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the stylesheet fingerprint computed at build time.
///
/// Usage in templates: `/static/app.css?v={{ ""|asset_version }}`
#[askama::filter_fn]
pub fn asset_version(
    _value: impl Display,
    _env: &dyn askama::Values,
) -> askama::Result<&'static str> {
    Ok(env!("ASSET_VERSION"))
}

/// First eight characters of an id, as shown in order tables.
///
/// Usage in templates: `#{{ order.id|short_id }}`
#[askama::filter_fn]
pub fn short_id(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.to_string().chars().take(8).collect())
}

/// Avatar initials for a name.
///
/// Usage in templates: `{{ user.display_name|initials }}`
#[askama::filter_fn]
pub fn initials(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(mrshopy_core::reviews::initials(&value.to_string()))
}
