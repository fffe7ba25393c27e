use std::path::{Path, PathBuf};

use super::task::TaskConfig;
use super::types::AppConfig;

/// Get the default data directory: ~/.ollama-task
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".ollama-task"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.ollama-task/config.toml (highest)
    let data_dir = get_data_dir()?;
    let user_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg: AppConfig = if user_config.exists() {
        load_from_path(&user_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    // Relative storage roots live under the data directory.
    let storage_dir = Path::new(&cfg.storage.directory);
    if storage_dir.is_relative() {
        cfg.storage.directory = data_dir
            .join(storage_dir)
            .to_string_lossy()
            .to_string();
    }

    let relative_workdir = cfg
        .storage
        .workdir
        .as_deref()
        .map(str::trim)
        .filter(|w| !w.is_empty() && Path::new(w).is_relative())
        .map(|w| data_dir.join(w).to_string_lossy().to_string());
    if relative_workdir.is_some() {
        cfg.storage.workdir = relative_workdir;
    }

    // Environment variable overrides (Priority 0: highest)
    if let Ok(v) = std::env::var("OLLAMA_TASK_STORAGE_DIR") {
        if !v.trim().is_empty() {
            cfg.storage.directory = v;
        }
    }
    if let Ok(v) = std::env::var("OLLAMA_TASK_LOG_LEVEL") {
        if !v.trim().is_empty() {
            cfg.logging.level = v;
        }
    }

    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    Ok(toml::from_str::<AppConfig>(&s)?)
}

/// Reads a task definition from a TOML file.
pub fn load_task(path: &Path) -> anyhow::Result<TaskConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read task file {}: {}", path.display(), e))?;
    toml::from_str::<TaskConfig>(&s)
        .map_err(|e| anyhow::anyhow!("invalid task file {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_task_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.toml");
        std::fs::write(
            &path,
            "commands = [\"ollama list --format json > models.json\"]\noutput_files = [\"models.json\"]\n",
        )
        .unwrap();

        let task = load_task(&path).unwrap();
        assert!(task.output_files.is_some());
    }

    #[test]
    fn missing_commands_is_reported_with_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "host = \"http://localhost:11434\"\n").unwrap();

        let err = load_task(&path).unwrap_err().to_string();
        assert!(err.contains("broken.toml"), "{err}");
    }

    #[test]
    fn app_config_sections_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.storage.directory, "storage");
        assert!(!cfg.storage.keep_workdir);
    }
}
