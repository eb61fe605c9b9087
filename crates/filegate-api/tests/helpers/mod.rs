//! Test helpers: build the router on a temporary web root.
//!
//! Run from workspace root: `cargo test -p filegate-api`.

pub mod auth;
pub mod fixtures;

use axum_test::TestServer;
use filegate_api::setup::build_app;
use filegate_core::Config;
use std::path::Path;
use tempfile::TempDir;

/// Test application: server plus the web root it writes to.
pub struct TestApp {
    pub server: TestServer,
    pub config: Config,
    pub _web_root: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn web_root(&self) -> &Path {
        &self.config.web_root
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup with configuration overrides applied before the router is built.
pub async fn setup_test_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let web_root = tempfile::tempdir().expect("Failed to create temp web root");

    let mut config = Config::for_tests(web_root.path(), auth::TEST_JWT_SECRET);
    customize(&mut config);

    let (_state, router) = build_app(config.clone())
        .await
        .expect("Failed to build app");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        config,
        _web_root: web_root,
    }
}
