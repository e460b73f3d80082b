//! Common test utilities for rust-sqlrewriter tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use rust_sqlrewriter::{RewriteAction, RewriteResult, ScriptRewriter};

/// Rewrite with default options and assert the script parsed cleanly.
pub fn rewrite_ok(sql: &str, action: &dyn RewriteAction) -> String {
    let result = rewrite(sql, action);
    assert!(
        result.errors.is_empty(),
        "Unexpected parse errors: {:?}",
        result.errors
    );
    result.output
}

/// Rewrite with default options, panicking only on a hard failure.
pub fn rewrite(sql: &str, action: &dyn RewriteAction) -> RewriteResult {
    ScriptRewriter::new()
        .rewrite(sql, action)
        .expect("rewrite raised a hard error")
}

/// Temporary directory holding SQL scripts for file-based tests
pub struct ScriptDir {
    /// Kept to prevent temp directory cleanup until ScriptDir is dropped
    _temp_dir: TempDir,
    pub root: PathBuf,
}

impl ScriptDir {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Write `content` to `relative` under the root, creating directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(&path, content).expect("Failed to write script");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        read(&self.root.join(relative))
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()))
}
