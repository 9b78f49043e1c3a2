//! Print the compiled-in role allowlists.

use mrshopy_core::roles::{Area, STAFF_USERS, SUPER_ADMINS};

/// Print who may enter each panel.
#[allow(clippy::print_stdout)]
pub fn print() {
    println!("Super-admins ({}/*):", Area::Admin.base_path());
    for email in SUPER_ADMINS {
        println!("  {email}");
    }
    println!("Staff ({}/*):", Area::Staff.base_path());
    for email in STAFF_USERS {
        println!("  {email}");
    }
    println!();
    println!("Roles are compiled in; edit crates/core/src/roles.rs and redeploy to change them.");
}
