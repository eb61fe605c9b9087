pub mod banner;
pub mod file;
pub mod health;

use serde::Deserialize;

/// Query of a delete request. A missing parameter reads as an empty URL,
/// which no authorization predicate accepts.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(rename = "relativeUrl", default)]
    pub relative_url: String,
}
