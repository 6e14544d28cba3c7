use std::path::PathBuf;

use tempfile::TempDir;

/// An empty wiki directory with `pages/` and `cache/` created.
pub fn create_test_wiki_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::create_dir_all(dir.path().join("pages")).expect("Failed to create pages dir");
    std::fs::create_dir_all(dir.path().join("cache")).expect("Failed to create cache dir");
    dir
}

/// Writes `content` to `name` under `dir`, creating parent directories.
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}
