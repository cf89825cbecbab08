//! Build script for storefront crate.
//!
//! Hashes `static/css/main.css` so the stylesheet URL changes with its
//! content (`/static/css/main.css?v={hash}`) and can be cached as immutable.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    if let Err(e) = hash_css() {
        println!("cargo:warning=Could not hash main.css: {e}");
        println!("cargo:rustc-env=CSS_HASH=");
    }
}

/// Hash main.css (first 8 hex chars of SHA-256).
///
/// Sets `CSS_HASH` for `env!("CSS_HASH")`.
fn hash_css() -> std::io::Result<()> {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").map_err(std::io::Error::other)?;
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let content = fs::read(&css_path)?;

    let hash = format!("{:x}", Sha256::digest(&content));
    let short_hash = hash.get(..8).unwrap_or(&hash);

    println!("cargo:rustc-env=CSS_HASH={short_hash}");
    Ok(())
}
