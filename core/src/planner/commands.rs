use super::{FLUSH_COMMAND, REMOVE_MODEL_MARKER};

pub fn is_remove_model(command: &str) -> bool {
    command.contains(REMOVE_MODEL_MARKER)
}

/// Inserts a flush before every model removal when output files are captured.
///
/// Removing a model can race with pending writes of captured files, so the writes are
/// forced to disk first. Without output files, or without a removal, `raw` is returned as-is.
pub fn rewrite_commands(raw: Vec<String>, has_output_files: bool) -> Vec<String> {
    if !has_output_files || !raw.iter().any(|c| is_remove_model(c)) {
        return raw;
    }

    let mut out = Vec::with_capacity(raw.len() + 1);
    for command in raw {
        if is_remove_model(&command) {
            out.push(FLUSH_COMMAND.to_string());
        }
        out.push(command);
    }
    out
}
