use crate::runner::{TaskRunner, VolumeMount};

use super::{MODEL_CACHE_VOLUME, MODEL_DIR};

/// Caching options after rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    pub enabled: bool,
    pub host_path: Option<String>,
    /// A remote server manages its own storage; its presence disables caching entirely.
    pub remote_host: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountStrategy {
    NamedVolume,
    HostPath,
}

impl MountStrategy {
    fn describe(self) -> &'static str {
        match self {
            MountStrategy::NamedVolume => "named volume",
            MountStrategy::HostPath => "host path",
        }
    }
}

/// The mount a run should get, or `None` when caching does not apply.
pub fn cache_mount(cfg: &CacheConfig) -> Option<(MountStrategy, VolumeMount)> {
    if cfg.remote_host.is_some() || !cfg.enabled {
        return None;
    }
    Some(match cfg.host_path.as_deref() {
        Some(path) => (MountStrategy::HostPath, VolumeMount::new(path, MODEL_DIR)),
        None => (
            MountStrategy::NamedVolume,
            VolumeMount::new(MODEL_CACHE_VOLUME, MODEL_DIR),
        ),
    })
}

/// Returns `base` with the model cache mounted after its existing mounts.
///
/// Runners without mount support are returned unchanged; caching then has no effect.
pub fn configure_caching(base: Box<dyn TaskRunner>, cfg: &CacheConfig) -> Box<dyn TaskRunner> {
    let Some((strategy, mount)) = cache_mount(cfg) else {
        return base;
    };

    tracing::info!(
        "model caching: using {} {} -> {}",
        strategy.describe(),
        mount.source,
        mount.target
    );

    if !base.supports_volume_mounts() {
        tracing::warn!(
            "runner '{}' does not support volume mounts; model caching has no effect",
            base.name()
        );
        return base;
    }

    let mut volumes = base.volumes().to_vec();
    volumes.push(mount);
    match base.with_volumes(volumes) {
        Some(configured) => configured,
        None => base,
    }
}
