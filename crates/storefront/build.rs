//! Build script for the storefront crate.
//!
//! Fingerprints the stylesheet so templates can reference it as
//! `/static/app.css?v=<hash>` and browsers refetch it only when it changes.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    fingerprint_css();
}

/// Sets `ASSET_VERSION` for use with `env!("ASSET_VERSION")`.
fn fingerprint_css() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_path = Path::new(&manifest_dir).join("static/app.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let version = match fs::read(&css_path) {
        Ok(content) => {
            let digest = Sha256::digest(&content);
            hex_prefix(&digest, 4)
        }
        Err(e) => {
            println!("cargo:warning=Could not read app.css: {e}");
            String::from("dev")
        }
    };

    println!("cargo:rustc-env=ASSET_VERSION={version}");
}

/// Lowercase hex of the first `bytes` bytes.
fn hex_prefix(digest: &[u8], bytes: usize) -> String {
    digest
        .iter()
        .take(bytes)
        .map(|b| format!("{b:02x}"))
        .collect()
}
