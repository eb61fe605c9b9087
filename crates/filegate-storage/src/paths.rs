//! Storage path rules
//!
//! Turns client-supplied relative URLs and upload contexts into validated
//! `StoragePath`s. The textual traversal filter here is only the first line of
//! defense: segments are validated structurally, and backends re-check that the
//! resolved location stays under the storage root.

use crate::traits::{StorageError, StorageResult};
use chrono::NaiveDate;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Component, Path, PathBuf};

/// Top-level directory all uploads live under
pub const UPLOAD_DIR: &str = "upload";
/// Category directory for banners
pub const BANNER_DIR: &str = "banner";

/// Date format for the per-identity date buckets
const DATE_BUCKET_FORMAT: &str = "%Y-%m-%d";

/// Relative path under the storage root, made of validated segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StoragePath {
    segments: Vec<String>,
}

impl StoragePath {
    /// The storage root itself
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from ordered segments, rejecting any segment that is not a
    /// single plain path component.
    pub fn from_segments<I, S>(segments: I) -> StorageResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .map(|segment| {
                let segment = segment.as_ref();
                validate_segment(segment)?;
                Ok(segment.to_string())
            })
            .collect::<StorageResult<Vec<_>>>()?;

        Ok(Self { segments })
    }

    /// Append one segment
    pub fn join(&self, segment: &str) -> StorageResult<Self> {
        validate_segment(segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Platform path relative to the storage root
    pub fn to_relative_path(&self) -> PathBuf {
        self.segments.iter().collect()
    }

    /// Resolve against a storage root
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(self.to_relative_path())
    }
}

impl Display for StoragePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.segments.join("/"))
    }
}

fn validate_segment(segment: &str) -> StorageResult<()> {
    if segment.is_empty() {
        return Err(StorageError::InvalidKey("empty path segment".to_string()));
    }

    if segment.contains(['/', '\\', '\0']) {
        return Err(StorageError::InvalidKey(format!(
            "path segment contains a separator or NUL: {:?}",
            segment
        )));
    }

    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(StorageError::InvalidKey(format!(
            "path segment is not a plain name: {:?}",
            segment
        ))),
    }
}

/// Result of sanitizing a client-supplied relative URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedPath {
    /// The URL after traversal sequences and the path base were removed.
    /// Echoed back to the client on a successful delete.
    pub cleaned_url: String,
    /// Location under the storage root
    pub path: StoragePath,
}

/// Sanitize a relative URL into a storage path.
///
/// Every `"../"` and `"./"` is removed, repeatedly, until none remain. The path
/// base prefix is then stripped, the URL is split on `/`, and each remaining
/// segment must be a plain name. Input that is empty after stripping yields the
/// storage root.
pub fn sanitize(raw_relative_url: &str, path_base: &str) -> StorageResult<SanitizedPath> {
    let mut cleaned = raw_relative_url.to_string();
    loop {
        let next = cleaned.replace("../", "").replace("./", "");
        if next == cleaned {
            break;
        }
        cleaned = next;
    }

    let cleaned_url = strip_path_base(&cleaned, path_base)
        .trim_start_matches('/')
        .to_string();

    let path = StoragePath::from_segments(cleaned_url.split('/').filter(|s| !s.is_empty()))?;

    Ok(SanitizedPath { cleaned_url, path })
}

fn strip_path_base<'a>(url: &'a str, path_base: &str) -> &'a str {
    let base = path_base.trim_matches('/');
    if base.is_empty() {
        return url;
    }

    let trimmed = url.trim_start_matches('/');
    match trimmed.strip_prefix(base) {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => rest,
        _ => url,
    }
}

/// Storage directory for `segments` under `root`. No directory is created.
pub fn build_path<I, S>(root: &Path, segments: I) -> StorageResult<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(StoragePath::from_segments(segments)?.resolve(root))
}

/// Segments for banner uploads: `upload/banner`
pub fn banner_segments() -> Vec<String> {
    vec![UPLOAD_DIR.to_string(), BANNER_DIR.to_string()]
}

/// Segments for general uploads: `upload/{identity_id}/{yyyy-MM-dd}`.
///
/// Bucketing by date bounds the directory fan-out per identity.
pub fn file_segments(identity_id: &str, date: NaiveDate) -> Vec<String> {
    vec![
        UPLOAD_DIR.to_string(),
        identity_id.to_string(),
        date.format(DATE_BUCKET_FORMAT).to_string(),
    ]
}

/// Relative URL handed back to the client: `base/seg1/.../file_name`.
///
/// The path base is omitted when empty; the result has no leading slash.
pub fn relative_url(path_base: &str, dir: &StoragePath, encoded_file_name: &str) -> String {
    let base = path_base.trim_matches('/');
    let mut parts: Vec<&str> = Vec::with_capacity(dir.segments().len() + 2);
    if !base.is_empty() {
        parts.push(base);
    }
    parts.extend(dir.segments().iter().map(String::as_str));
    parts.push(encoded_file_name);
    parts.join("/")
}
