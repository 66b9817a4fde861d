//! Sample files for upload probes, written to a temporary directory.
//!
//! The directory and everything in it is removed when [`Fixtures`] is dropped.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The two documents the end-to-end suite uploads.
pub const SUITE_FILES: [(&str, &str); 2] = [
    (
        "test.txt",
        "这是一个测试文件。\n\n文件内容：\n1. 第一行内容\n2. 第二行内容\n3. 第三行内容",
    ),
    (
        "test2.txt",
        "这是第二个测试文件。\n\n包含不同的内容，用于多文件测试。",
    ),
];

pub struct Fixtures {
    dir: TempDir,
    names: Vec<String>,
}

impl Fixtures {
    /// Write each `(file name, contents)` pair into a fresh temp directory.
    pub fn create(files: &[(&str, &str)]) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("fastgpt-probe-")
            .tempdir()
            .context("Failed to create fixture directory")?;

        let mut names = Vec::with_capacity(files.len());
        for (name, contents) in files {
            let path = dir.path().join(name);
            fs::write(&path, contents)
                .with_context(|| format!("Failed to write fixture {}", path.display()))?;
            names.push(name.to_string());
        }

        Ok(Self { dir, names })
    }

    pub fn suite() -> Result<Self> {
        Self::create(&SUITE_FILES)
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// File names in creation order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_written_and_removed() {
        let fixtures = Fixtures::suite().unwrap();
        let dir = fixtures.dir().to_path_buf();

        assert_eq!(fixtures.names(), ["test.txt", "test2.txt"]);
        let content = fs::read_to_string(fixtures.path("test.txt")).unwrap();
        assert!(content.contains("第二行内容"));
        assert!(fixtures.path("test2.txt").is_file());

        drop(fixtures);
        assert!(!dir.exists());
    }

    #[test]
    fn test_fixtures_custom_files() {
        let fixtures = Fixtures::create(&[("a.md", "# A"), ("b.csv", "x,y\n1,2")]).unwrap();
        assert_eq!(fs::read_to_string(fixtures.path("b.csv")).unwrap(), "x,y\n1,2");
        assert_eq!(fixtures.names().len(), 2);
    }
}
