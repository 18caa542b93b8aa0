//! Test helpers: build AppState and router over temporary upload roots.
//!
//! Run from workspace root: `cargo test -p tourney-api --test upload_test`.

pub mod fixtures;

use std::path::PathBuf;
use std::sync::Arc;

use axum_test::TestServer;
use tempfile::TempDir;
use tourney_api::constants;
use tourney_api::setup;
use tourney_api::state::AppState;
use tourney_core::Config;

/// Admin API path for tests (e.g. `/api/admin/teams/upload/flagIcon`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, state, and the temporary upload roots.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn staging_dir(&self, entity: &str) -> PathBuf {
        self.state.config.upload_temp_file_dir.join(entity)
    }

    pub fn storage_dir(&self, entity: &str) -> PathBuf {
        self.state.config.upload_file_dir.join(entity)
    }

    /// Files currently staged for `entity`
    pub fn staged_files(&self, entity: &str) -> Vec<PathBuf> {
        match std::fs::read_dir(self.staging_dir(entity)) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Setup test app with its own staging and permanent roots.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

pub async fn setup_test_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mut config = Config {
        upload_temp_file_dir: temp_dir.path().join("tmp"),
        upload_file_dir: temp_dir.path().join("files"),
        old_temp_file_sweep_interval_secs: 0,
        ..Config::default()
    };
    customize(&mut config);

    let (state, router) = setup::initialize_app(config)
        .await
        .expect("Failed to initialize app");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}
