use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::RunnerError;

/// Binding of a durable storage location (named volume or host path) into the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub read_only: bool,
}

impl VolumeMount {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            read_only: false,
        }
    }

    /// Parses docker's `source:target[:ro|rw]` form.
    pub fn parse(spec: &str) -> Result<Self, RunnerError> {
        let parts: Vec<&str> = spec.split(':').collect();
        let (source, target, read_only) = match parts.as_slice() {
            [s, t] => (*s, *t, false),
            [s, t, "ro"] => (*s, *t, true),
            [s, t, "rw"] => (*s, *t, false),
            _ => {
                return Err(RunnerError::Config(format!(
                    "invalid volume '{}' (expected source:target[:ro|rw])",
                    spec
                )))
            }
        };
        if source.trim().is_empty() || target.trim().is_empty() {
            return Err(RunnerError::Config(format!(
                "invalid volume '{}' (empty source or target)",
                spec
            )));
        }
        Ok(Self {
            source: source.to_string(),
            target: target.to_string(),
            read_only,
        })
    }
}

impl fmt::Display for VolumeMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.target)?;
        if self.read_only {
            f.write_str(":ro")?;
        }
        Ok(())
    }
}

/// What a runner needs to start one session.
#[derive(Debug, Clone)]
pub struct RunnerStartArgs {
    /// e.g. `["/bin/sh", "-c"]`; the script is appended as the last argument.
    pub interpreter: Vec<String>,
    pub script: String,
    pub envs: HashMap<String, String>,
    /// Host directory the commands run in; output files are read back from here.
    pub working_dir: PathBuf,
    /// Overrides the runner's own image, for runners that have one.
    pub container_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub duration_ms: Option<u64>,
    pub stdout_tail: String,
    pub stderr_tail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_volume_specs() {
        let v = VolumeMount::parse("ollama-models:/root/.ollama").unwrap();
        assert_eq!(v, VolumeMount::new("ollama-models", "/root/.ollama"));
        assert_eq!(v.to_string(), "ollama-models:/root/.ollama");

        let ro = VolumeMount::parse("/etc/ssl:/etc/ssl:ro").unwrap();
        assert!(ro.read_only);
        assert_eq!(ro.to_string(), "/etc/ssl:/etc/ssl:ro");
    }

    #[test]
    fn rejects_malformed_volume_specs() {
        assert!(VolumeMount::parse("just-a-name").is_err());
        assert!(VolumeMount::parse(":/target").is_err());
        assert!(VolumeMount::parse("a:b:c:d").is_err());
    }
}
