//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::{fetch, Command, LocalBackend, EXPENSES_KEY};
use crate::model::Expense;
use crate::Config;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

/// Test environment with an initialized spendscope home directory.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a home directory with a default config. The store file does not exist until a
    /// command opens it.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::create(temp_dir.path().join("spendscope"))
            .await
            .unwrap();
        Self { temp_dir, config }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// A scratch directory next to the home directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Reads the expense records straight from the store file.
    pub async fn records(&self) -> Vec<Expense> {
        let backend = LocalBackend::open(self.config.store_path()).await.unwrap();
        fetch(&backend, Command::StoreGetValue, json!({ "key": EXPENSES_KEY }))
            .await
            .unwrap()
    }
}
