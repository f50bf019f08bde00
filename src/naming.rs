//! Stable on-disk names for person photos.
//!
//! The derived name doubles as the resume marker: a later run finds the
//! photo again only if it computes the exact same string, so the rules
//! below must not change.

use md5::{Digest, Md5};
use regex::Regex;
use std::sync::OnceLock;

pub const PHOTO_EXTENSION: &str = "jpg";

/// Length of the hex digest suffix.
const HASH_LEN: usize = 6;

fn strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Combining marks count as word characters for `\w` here but are
    // dropped by the slug rule, so strip them explicitly
    RE.get_or_init(|| Regex::new(r"[^\w\s-]|\p{M}").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Lowercased slug of `display_name` plus a short MD5 suffix of the
/// untouched name, e.g. `Иван` -> `иван_acd41b.jpg`.
pub fn derive_filename(display_name: &str) -> String {
    let lowered = display_name.to_lowercase();
    let stripped = strip_re().replace_all(&lowered, "");
    let slug = whitespace_re().replace_all(stripped.trim(), "_");

    let digest = format!("{:x}", Md5::digest(display_name.as_bytes()));

    format!("{}_{}.{}", slug, &digest[..HASH_LEN], PHOTO_EXTENSION)
}
