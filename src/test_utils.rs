//! Test utilities for PromptEdge
//!
//! This module provides common test utilities including temporary
//! directory management and static-site fixture creation.

use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Arguments
///
/// * `dir` - Directory to create the file in
/// * `name` - Name of the file
/// * `content` - Content to write to the file
///
/// # Returns
///
/// Returns the path to the created file
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Create a minimal static site (index document plus one asset) under a
/// temporary directory
///
/// # Returns
///
/// Returns the TempDir serving as the static root
pub fn temp_static_site() -> TempDir {
    let dir = temp_dir();
    create_test_file(&dir, "index.html", "<html>index</html>");
    create_test_file(&dir, "static-asset.js", "console.log('asset');");
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_file_writes_content() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "a.txt", "hello");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }

    #[test]
    fn test_temp_static_site_has_index() {
        let dir = temp_static_site();
        assert!(dir.path().join("index.html").exists());
        assert!(dir.path().join("static-asset.js").exists());
    }
}
