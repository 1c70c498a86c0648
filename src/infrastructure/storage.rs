use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::app_config::AppConfig;
use crate::domain::error::{AppError, Result};

/// Creates the input, output and archetype directories if missing.
pub async fn ensure_workspace_dirs(config: &AppConfig) -> Result<()> {
    for dir in [&config.input_dir, &config.output_dir, &config.archetypes_dir] {
        ensure_dir(dir).await?;
    }
    Ok(())
}

pub async fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await.map_err(|e| {
        AppError::IoError(format!("Failed to create {}: {}", path.display(), e))
    })
}

/// Deletes `path`; a file that is already gone is not an error.
pub async fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::IoError(format!(
            "Failed to remove {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Writes `contents` to a sibling temp file, then renames it over `path`, so
/// readers never observe a half-written file.
pub async fn write_atomic(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| AppError::IoError(format!("Invalid file path: {}", path.display())))?;
    let temp_path: PathBuf =
        parent.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4().simple()));

    if let Err(e) = fs::write(&temp_path, contents.as_ref()).await {
        return Err(AppError::IoError(format!(
            "Failed to write {}: {}",
            temp_path.display(),
            e
        )));
    }

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(AppError::IoError(format!(
            "Failed to move {} into place: {}",
            path.display(),
            e
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_atomic_replaces_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        write_atomic(&path, "first").await.unwrap();
        write_atomic(&path, "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_write_atomic_missing_parent_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_atomic(&dir.path().join("missing/out.txt"), "x").await;
        assert!(matches!(result, Err(AppError::IoError(_))));
    }

    #[tokio::test]
    async fn test_remove_if_exists_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stale.html");
        std::fs::write(&path, "old").unwrap();

        remove_if_exists(&path).await.unwrap();
        remove_if_exists(&path).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_ensure_workspace_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            input_dir: dir.path().join("IN"),
            output_dir: dir.path().join("OUT"),
            archetypes_dir: dir.path().join("Arquetipos"),
            ..AppConfig::default()
        };
        ensure_workspace_dirs(&config).await.unwrap();
        ensure_workspace_dirs(&config).await.unwrap();
        assert!(config.input_dir.is_dir());
        assert!(config.output_dir.is_dir());
        assert!(config.archetypes_dir.is_dir());
    }
}
