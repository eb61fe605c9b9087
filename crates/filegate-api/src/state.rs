use crate::auth::JwtService;
use crate::services::FileOperation;
use filegate_core::Config;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub operation: FileOperation,
    pub jwt: Arc<JwtService>,
}
