use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid page directory: {0}")]
    InvalidPageDir(String),
}

/// Write rendered output, creating parent directories as needed
pub fn write_output(name: &RelativePath, out_dir: &Path, content: &str) -> Result<(), IoError> {
    let absolute_path = name.to_path(out_dir);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)
}

/// Scan for `.page` files under the page directory, sorted by path
pub fn scan_pages(page_dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_page_dir(page_dir)?;

    let mut files = Vec::new();
    scan_directory_recursive(page_dir, &mut files)?;
    files.sort();
    log::debug!("found {} pages in {}", files.len(), page_dir.display());
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == "page"
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_page_dir(path: &Path) -> Result<(), IoError> {
    if !path.is_dir() {
        return Err(IoError::InvalidPageDir(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_file, create_test_wiki_dir};

    #[test]
    fn test_scan_finds_nested_pages_sorted() {
        // Given a page directory with nested pages and other files
        let wiki = create_test_wiki_dir();
        create_test_file(&wiki, "pages/b.page", "b");
        create_test_file(&wiki, "pages/a.page", "a");
        create_test_file(&wiki, "pages/sub/c.page", "c");
        create_test_file(&wiki, "pages/notes.txt", "not a page");

        // When scanning
        let files = scan_pages(&wiki.path().join("pages")).unwrap();

        // Then only pages are found, in order
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(wiki.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("pages/a.page"),
                PathBuf::from("pages/b.page"),
                PathBuf::from("pages/sub/c.page"),
            ]
        );
    }

    #[test]
    fn test_handle_invalid_page_directory() {
        let result = scan_pages(Path::new("/this/path/does/not/exist"));
        assert!(matches!(result, Err(IoError::InvalidPageDir(_))));
    }

    #[test]
    fn test_write_output_creates_directories() {
        let out = tempfile::TempDir::new().unwrap();
        write_output(RelativePath::new("a/b.html"), out.path(), "<p>hi</p>").unwrap();
        assert_eq!(
            fs::read_to_string(out.path().join("a/b.html")).unwrap(),
            "<p>hi</p>"
        );
    }
}
