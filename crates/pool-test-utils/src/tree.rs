//! [`PoolTree`] builder for pool document directories.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory of pool documents.
///
/// # Example
///
/// ```rust,no_run
/// use pool_test_utils::PoolTree;
/// use pool_test_utils::fixtures::BASE_POOL;
///
/// let tree = PoolTree::new();
/// tree.write_pool("base", BASE_POOL);
/// tree.write_pool("child", "name: child\nparents: [base]\n");
/// tree.assert_pool_exists("child");
/// ```
pub struct PoolTree {
    temp_dir: TempDir,
}

impl Default for PoolTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the document for `pool_id`, whether or not it exists.
    pub fn path(&self, pool_id: &str) -> PathBuf {
        self.root().join(format!("{pool_id}.yml"))
    }

    /// Write `<pool_id>.yml` and return its path.
    pub fn write_pool(&self, pool_id: &str, yaml: &str) -> PathBuf {
        let path = self.path(pool_id);
        fs::write(&path, yaml)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", path.display()));
        path
    }

    /// Write a machine catalog next to the pools and return its path.
    pub fn write_machines(&self, yaml: &str) -> PathBuf {
        let path = self.root().join("machines.yml");
        fs::write(&path, yaml)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", path.display()));
        path
    }

    /// Assert that a document for `pool_id` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if it does not.
    pub fn assert_pool_exists(&self, pool_id: &str) {
        let path = self.path(pool_id);
        assert!(path.exists(), "Expected pool document to exist: {}", path.display());
    }
}
