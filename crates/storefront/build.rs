//! Fingerprints the storefront stylesheet.
//!
//! `static/css/main.css` is copied to `static/css/derived/main.<hash>.css`
//! and the hash is exposed as `CSS_HASH`, which the `css_hash` template
//! filter puts into the `<link>` tag. Older fingerprinted copies are removed
//! so the derived directory only ever holds the current one.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};

const HASH_LEN: usize = 8;

fn main() -> io::Result<()> {
    let manifest_dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").unwrap_or_default());
    let css_dir = manifest_dir.join("static/css");
    let source = css_dir.join("main.css");

    println!("cargo:rerun-if-changed={}", source.display());

    let content = fs::read(&source)?;
    let digest = format!("{:x}", Sha256::digest(&content));
    let hash = &digest[..HASH_LEN];

    let derived = css_dir.join("derived");
    fs::create_dir_all(&derived)?;
    remove_stale(&derived, hash)?;
    fs::write(derived.join(format!("main.{hash}.css")), &content)?;

    println!("cargo:rustc-env=CSS_HASH={hash}");
    Ok(())
}

/// Delete `main.*.css` files whose fingerprint is not `current`.
fn remove_stale(derived: &Path, current: &str) -> io::Result<()> {
    let keep = format!("main.{current}.css");
    for entry in fs::read_dir(derived)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with("main.") && name.ends_with(".css") && name != keep {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
