//! Upload validation rules
//!
//! Extension whitelisting is a file-name heuristic only: file content and
//! magic bytes are never inspected.

use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Immutable set of permitted extensions for one upload endpoint.
///
/// Entries are stored lowercase with a leading dot (e.g. `.pdf`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionWhitelist {
    extensions: BTreeSet<String>,
}

impl ExtensionWhitelist {
    /// Build a whitelist, normalizing each entry to lowercase with a leading dot.
    /// Blank entries are ignored.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|ext| {
                let ext = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
                if ext.is_empty() {
                    None
                } else {
                    Some(format!(".{}", ext))
                }
            })
            .collect();

        Self { extensions }
    }

    /// Parse a comma-separated list such as `".jpg,.png"` or `"jpg, png"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Whether `file_name` carries one of the permitted extensions.
    ///
    /// Comparison is case-insensitive. A name without an extension is never permitted.
    pub fn is_permitted(&self, file_name: &str) -> bool {
        match extension_of(file_name) {
            Some(ext) => self.extensions.contains(&ext),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

impl std::fmt::Display for ExtensionWhitelist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(","))
    }
}

/// Lowercased extension of the last path component, including the dot.
///
/// Returns `None` when the name has no dot or ends with one.
pub fn extension_of(file_name: &str) -> Option<String> {
    let last_component = file_name.rsplit('/').next().unwrap_or(file_name);
    let dot = last_component.rfind('.')?;
    let ext = &last_component[dot..];
    if ext.len() <= 1 {
        return None;
    }
    Some(ext.to_lowercase())
}

/// HTML-encode a file name before it is echoed back inside a URL.
///
/// Encodes `<`, `>`, `&`, `"` and `'` as entities, and every code point in
/// U+00A0..=U+00FF or above U+FFFF as a numeric entity. Everything else
/// passes through.
pub fn html_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "&#{};", c as u32);
            }
            // Outside the BMP: one entity for the whole scalar, not a surrogate pair
            c if c as u32 >= 0x10000 => {
                let _ = write!(out, "&#{};", c as u32);
            }
            _ => out.push(c),
        }
    }
    out
}
