use ollama_task_core::api as core_api;
use ollama_task_core::error::CliError;
use ollama_task_plugins::factory;

use crate::commands::cli::RunArgs;

/// Builds the template context from `--var KEY=VALUE` flags.
pub fn parse_vars(vars: &[String]) -> Result<core_api::RunContext, CliError> {
    let mut ctx = core_api::RunContext::new();
    for kv in vars {
        let Some((k, v)) = kv.split_once('=') else {
            return Err(CliError::Config(format!(
                "invalid --var '{}' (expected KEY=VALUE)",
                kv
            )));
        };
        let key = k.trim();
        if key.is_empty() {
            return Err(CliError::Config(format!("invalid --var '{}' (empty key)", kv)));
        }
        ctx.insert(key, v);
    }
    Ok(ctx)
}

fn load(args: &RunArgs) -> Result<(core_api::TaskConfig, core_api::RunContext), CliError> {
    let task = core_api::load_task(&args.task).map_err(|e| CliError::Config(e.to_string()))?;
    let ctx = parse_vars(&args.vars)?;
    Ok((task, ctx))
}

/// Executes the task and returns its exit code.
pub async fn run_cmd(cfg: &core_api::AppConfig, args: RunArgs) -> Result<i32, CliError> {
    let (task, ctx) = load(&args)?;

    let runner = factory::build_runner(&task.task_runner).map_err(core_api::TaskError::from)?;
    let mut storage_cfg = cfg.storage.clone();
    storage_cfg.keep_workdir |= args.keep_workdir;
    tracing::debug!(
        "task {} loaded: runner={}, storage={}",
        args.task.display(),
        runner.name(),
        storage_cfg.directory
    );
    let executor = factory::build_executor(&storage_cfg);

    let output = core_api::run_task(core_api::RunTaskArgs {
        task: &task,
        ctx: &ctx,
        runner,
        executor: &executor,
    })
    .await?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::Config(format!("failed to render result: {e}")))?;
        println!("{rendered}");
    } else {
        for (name, uri) in &output.output_files {
            println!("{name}\t{uri}");
        }
    }

    Ok(output.exit_code)
}

/// Prints what `run` would execute.
pub fn plan_cmd(args: RunArgs) -> Result<i32, CliError> {
    let (task, ctx) = load(&args)?;
    let runner = factory::build_runner(&task.task_runner).map_err(core_api::TaskError::from)?;

    let request = core_api::plan_task(&task, &ctx, runner)?;
    let rendered = serde_json::to_string_pretty(&request.summary())
        .map_err(|e| CliError::Config(format!("failed to render plan: {e}")))?;
    println!("{rendered}");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vars_become_template_variables() {
        let ctx = parse_vars(&["model=llama3".to_string(), "prompt=a=b".to_string()]).unwrap();
        assert_eq!(ctx.get("model"), Some("llama3"));
        assert_eq!(ctx.get("prompt"), Some("a=b"));
    }

    #[test]
    fn malformed_vars_are_config_errors() {
        assert!(matches!(
            parse_vars(&["novalue".to_string()]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            parse_vars(&[" =x".to_string()]),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn plan_reads_task_file_without_running_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.toml");
        std::fs::write(
            &path,
            "commands = [\"ollama pull {{ model }}\"]\nmodel_cache_path = \"/data/models\"\n",
        )
        .unwrap();

        let code = plan_cmd(RunArgs {
            task: path,
            vars: vec!["model=smollm:360m".to_string()],
            keep_workdir: false,
            json: false,
        })
        .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn plan_reports_unknown_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.toml");
        std::fs::write(&path, "commands = [\"ollama pull {{ model }}\"]\n").unwrap();

        let err = plan_cmd(RunArgs {
            task: path,
            vars: vec![],
            keep_workdir: false,
            json: false,
        })
        .unwrap_err();
        assert!(matches!(err, CliError::Task(ref e) if e.is_config()));
    }
}
