use std::collections::HashMap;

use super::OLLAMA_HOST_ENV;

/// User variables, plus `OLLAMA_HOST` when a remote server is configured.
/// The remote host wins over a user-supplied `OLLAMA_HOST`.
pub fn resolve_environment(
    user_env: &HashMap<String, String>,
    remote_host: Option<&str>,
) -> HashMap<String, String> {
    let mut envs = user_env.clone();
    if let Some(host) = remote_host {
        envs.insert(OLLAMA_HOST_ENV.to_string(), host.to_string());
    }
    envs
}
