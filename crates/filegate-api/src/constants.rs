//! Route paths

pub const BANNER_ROUTE: &str = "/banner";
pub const FILE_ROUTE: &str = "/file";
pub const HEALTH_ROUTE: &str = "/health";
/// Read-only view of stored uploads, when enabled
pub const UPLOAD_ROUTE: &str = "/upload";

