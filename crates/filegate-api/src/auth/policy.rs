//! Authorization predicates for deletes
//!
//! Both predicates look at the raw relative URL as sent by the client, before
//! sanitization. They are substring checks: an identity id that happens to
//! appear anywhere in a URL grants access to it.

use filegate_core::Caller;

/// Marker every deletable banner URL contains
pub const BANNER_URL_MARKER: &str = "upload/banner/";
/// Marker every deletable general file URL contains
pub const FILE_URL_MARKER: &str = "upload/";

/// Banner deletes are limited to URLs under the banner directory.
pub fn banner_delete_allowed(relative_url: &str) -> bool {
    !relative_url.is_empty() && relative_url.contains(BANNER_URL_MARKER)
}

/// General file deletes need a URL under the upload directory and either a
/// caller with some role or a URL containing the caller's id.
pub fn file_delete_allowed(caller: &Caller, relative_url: &str) -> bool {
    if relative_url.is_empty() || !relative_url.contains(FILE_URL_MARKER) {
        return false;
    }

    caller.role().is_some() || (!caller.id.is_empty() && relative_url.contains(caller.id.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_delete_allowed() {
        assert!(banner_delete_allowed("upload/banner/a.png"));
        assert!(banner_delete_allowed("files/upload/banner/a.png"));
        assert!(!banner_delete_allowed("upload/u1/2024-01-15/a.pdf"));
        assert!(!banner_delete_allowed("upload/banner"));
        assert!(!banner_delete_allowed(""));
    }

    #[test]
    fn test_file_delete_owner_without_role() {
        let caller = Caller::new("u1", vec![]);
        assert!(file_delete_allowed(&caller, "upload/u1/2024-01-15/report.pdf"));
        assert!(!file_delete_allowed(&caller, "upload/u2/2024-01-15/report.pdf"));
    }

    #[test]
    fn test_file_delete_any_role_bypasses_ownership() {
        let caller = Caller::new("u1", vec!["member".to_string()]);
        assert!(file_delete_allowed(&caller, "upload/u2/2024-01-15/report.pdf"));
    }

    #[test]
    fn test_file_delete_requires_upload_marker() {
        let caller = Caller::new("u1", vec!["admin".to_string()]);
        assert!(!file_delete_allowed(&caller, "u1/report.pdf"));
        assert!(!file_delete_allowed(&caller, ""));
    }

    #[test]
    fn test_file_delete_ownership_is_substring_match() {
        // "u1" also occurs inside "u10"
        let caller = Caller::new("u1", vec![]);
        assert!(file_delete_allowed(&caller, "upload/u10/2024-01-15/report.pdf"));
    }

    #[test]
    fn test_file_delete_empty_id_owns_nothing() {
        let caller = Caller::new("", vec![]);
        assert!(!file_delete_allowed(&caller, "upload/u1/a.pdf"));
    }
}
