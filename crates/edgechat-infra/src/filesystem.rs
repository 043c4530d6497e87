//! Data directory layout.
//!
//! Everything edgechat persists lives under one directory:
//! `config.toml` and the `edgechat.db` SQLite file.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "EDGECHAT_DATA_DIR";

/// Resolve the data directory: `EDGECHAT_DATA_DIR`, else `~/.edgechat`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".edgechat");
    }

    // Last resort: current directory
    PathBuf::from(".edgechat")
}

/// Create the data directory if it does not exist.
pub async fn ensure_data_dir(data_dir: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(data_dir).await
}

/// Path of the configuration file inside `data_dir`.
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_ensure_data_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_data_dir(&nested).await.unwrap();
        assert!(nested.is_dir());

        // Idempotent.
        ensure_data_dir(&nested).await.unwrap();
    }

    #[test]
    fn test_config_path() {
        assert_eq!(
            config_path(Path::new("/srv/edgechat")),
            PathBuf::from("/srv/edgechat/config.toml")
        );
    }

    #[test]
    fn test_resolve_data_dir_is_not_empty() {
        assert!(!resolve_data_dir().as_os_str().is_empty());
    }
}
