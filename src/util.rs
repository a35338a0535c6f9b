// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::prelude::*;
use std::path::Path;
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_IDENT: Regex = Regex::new(r"[^A-Za-z0-9_]").unwrap();
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(buf)
}


pub fn read_file_str(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let str = String::from_utf8(content)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
    Ok(str)
}

/// Collapses runs of whitespace (SVD descriptions are often wrapped) into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Turns an SVD name into something usable as a C++ identifier.
pub fn sanitize_ident(name: &str) -> String {
    let ident = NON_IDENT.replace_all(name, "_");
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", ident)
    } else {
        ident.into_owned()
    }
}
