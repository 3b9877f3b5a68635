//! Build script for the storefront crate.
//!
//! Fingerprints static assets so they can be served with immutable caching.
//! Each asset is copied to `static/<kind>/derived/<name>.<hash>.<ext>` and
//! its short hash exported as a compile-time environment variable.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

struct Asset {
    kind: &'static str,
    name: &'static str,
    ext: &'static str,
    env_var: &'static str,
}

const ASSETS: &[Asset] = &[
    Asset {
        kind: "css",
        name: "main",
        ext: "css",
        env_var: "CSS_HASH",
    },
    Asset {
        kind: "js",
        name: "app",
        ext: "js",
        env_var: "JS_HASH",
    },
];

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static");

    for asset in ASSETS {
        fingerprint(&static_dir, asset);
    }
}

fn fingerprint(static_dir: &Path, asset: &Asset) {
    let source = static_dir
        .join(asset.kind)
        .join(format!("{}.{}", asset.name, asset.ext));
    println!("cargo:rerun-if-changed={}", source.display());

    let content = match fs::read(&source) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", source.display());
            println!("cargo:rustc-env={}=", asset.env_var);
            return;
        }
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let short_hash = &digest[..8];
    println!("cargo:rustc-env={}={short_hash}", asset.env_var);

    let derived_dir = static_dir.join(asset.kind).join("derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create derived asset directory");
    let target = derived_dir.join(format!("{}.{short_hash}.{}", asset.name, asset.ext));
    fs::copy(&source, &target).expect("Failed to copy asset to derived directory");
}
