//! File system utility helpers (BOM-aware readers, PHP file discovery)
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Read a PHP file as text, stripping UTF-8 BOM if present.
///
/// Invalid UTF-8 sequences (legacy Latin-1 sources) are replaced instead of failing.
pub fn read_php_file(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    let mut content = String::from_utf8_lossy(&bytes).into_owned();
    if content.starts_with('\u{FEFF}') {
        content = content.trim_start_matches('\u{FEFF}').to_string();
    }
    Ok(content)
}

/// Checks the file extension case-insensitively against `extensions`.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Recursively collects files with one of `extensions` below `root`, sorted by path.
pub fn collect_php_files(
    root: &Path,
    extensions: &[String],
    exclude_dirs: &[String],
    follow_links: bool,
) -> Vec<PathBuf> {
    let is_excluded = |entry: &DirEntry| {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map(|name| exclude_dirs.iter().any(|excluded| excluded == name))
                .unwrap_or(false)
    };

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(follow_links)
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable directory entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), extensions))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn php_extensions() -> Vec<String> {
        vec!["php".to_string(), "php5".to_string()]
    }

    #[test]
    fn test_has_extension_is_case_insensitive() {
        let extensions = php_extensions();
        assert!(has_extension(Path::new("src/Index.PHP"), &extensions));
        assert!(has_extension(Path::new("legacy/old.php5"), &extensions));
        assert!(!has_extension(Path::new("template.phtml"), &extensions));
        assert!(!has_extension(Path::new("README"), &extensions));
    }

    #[test]
    fn test_collect_php_files_sorted_and_filtered() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("b/vendor"))?;
        fs::write(dir.path().join("b/z.php"), "<?php echo 1;")?;
        fs::write(dir.path().join("a.php5"), "<?php echo 2;")?;
        fs::write(dir.path().join("notes.txt"), "not php")?;
        fs::write(dir.path().join("b/vendor/lib.php"), "<?php echo 3;")?;

        let files = collect_php_files(dir.path(), &php_extensions(), &["vendor".to_string()], false);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(names, vec!["a.php5".to_string(), "b/z.php".to_string()]);
        Ok(())
    }

    #[test]
    fn test_read_php_file_strips_bom() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bom.php");
        let mut content = vec![0xEF, 0xBB, 0xBF];
        content.extend_from_slice(b"<?php echo 'x';");
        fs::write(&path, content)?;

        let text = read_php_file(&path)?;
        assert!(text.starts_with("<?php"));
        Ok(())
    }
}
