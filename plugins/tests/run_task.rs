#![cfg(unix)]

mod common;

use std::time::{Duration, Instant};

use common::{process_runner, Sandbox};
use ollama_task_core::api::{run_task, RunContext, RunTaskArgs, Storage, TaskConfig, TaskError};
use ollama_task_plugins::factory::build_runner;

const REMOTE: &str = "http://127.0.0.1:11434";

async fn run(sandbox: &Sandbox, task: TaskConfig) -> Result<ollama_task_core::api::ScriptOutput, TaskError> {
    let executor = sandbox.executor();
    let runner = build_runner(&task.task_runner).unwrap();
    run_task(RunTaskArgs {
        task: &task,
        ctx: &RunContext::new(),
        runner,
        executor: &executor,
    })
    .await
}

#[tokio::test]
async fn local_server_run_captures_output_file() {
    let sandbox = Sandbox::new();
    let task = TaskConfig::new([
        "ollama pull smollm:360m",
        "ollama run smollm:360m \"What is your name?\" > output.txt",
    ])
    .with_env(sandbox.env())
    .with_task_runner(process_runner())
    .with_output_files(["output.txt"])
    .with_model_caching(true);

    let output = run(&sandbox, task).await.unwrap();

    assert_eq!(output.exit_code, 0);
    assert_eq!(output.output_files.len(), 1);
    let uri = &output.output_files["output.txt"];
    let size = sandbox.storage.size(uri).await.unwrap();
    assert!(matches!(size, Some(n) if n > 0), "stored artifact is empty: {size:?}");
    let content = std::fs::read_to_string(uri.to_path().unwrap()).unwrap();
    assert_eq!(content, "I am smollm:360m\n");
}

#[tokio::test]
async fn removal_after_output_still_stores_the_file() {
    let sandbox = Sandbox::new();
    let task = TaskConfig::new([
        "ollama run tinyllama 'hi' > answer.txt",
        "ollama rm tinyllama",
    ])
    .with_env(sandbox.env())
    .with_task_runner(process_runner())
    .with_output_files(["answer.txt"])
    .with_host(REMOTE.to_string());

    let output = run(&sandbox, task).await.unwrap();

    assert_eq!(output.exit_code, 0);
    assert!(output.stdout_tail.contains("deleted 'tinyllama'"));
    assert!(output.output_files.contains_key("answer.txt"));
}

#[tokio::test]
async fn remote_host_is_visible_to_commands() {
    let sandbox = Sandbox::new();
    let task = TaskConfig::new(["echo \"$OLLAMA_HOST\" > host.txt"])
        .with_task_runner(process_runner())
        .with_output_files(["host.txt"])
        .with_host(REMOTE.to_string());

    let output = run(&sandbox, task).await.unwrap();
    let stored = output.output_files["host.txt"].to_path().unwrap();
    assert_eq!(std::fs::read_to_string(stored).unwrap().trim(), REMOTE);
}

#[tokio::test]
async fn failing_command_passes_exit_code_through() {
    let sandbox = Sandbox::new();
    let task = TaskConfig::new(["ollama frobnicate > never.txt", "exit 3"])
        .with_env(sandbox.env())
        .with_task_runner(process_runner())
        .with_output_files(["missing.txt"])
        .with_host(REMOTE.to_string());

    let output = run(&sandbox, task).await.unwrap();

    assert_eq!(output.exit_code, 3);
    assert!(output.output_files.is_empty());
}

#[tokio::test]
async fn missing_output_is_left_out_of_the_mapping() {
    let sandbox = Sandbox::new();
    let task = TaskConfig::new(["echo done > present.txt"])
        .with_task_runner(process_runner())
        .with_output_files(["present.txt", "completion.txt"])
        .with_host(REMOTE.to_string());

    let output = run(&sandbox, task).await.unwrap();

    assert_eq!(output.exit_code, 0);
    assert!(output.output_files.contains_key("present.txt"));
    assert!(!output.output_files.contains_key("completion.txt"));
}

#[tokio::test]
async fn local_server_left_running_does_not_hold_the_run() {
    let sandbox = Sandbox::new();
    let task = TaskConfig::new(["ollama run m 'hi' > output.txt"])
        .with_env(sandbox.env())
        .with_task_runner(process_runner())
        .with_output_files(["output.txt"]);

    let started = Instant::now();
    let output = tokio::time::timeout(Duration::from_secs(20), run(&sandbox, task))
        .await
        .expect("run returns once the script exits")
        .unwrap();

    assert_eq!(output.exit_code, 0);
    assert!(output.output_files.contains_key("output.txt"));
    assert!(
        started.elapsed() < Duration::from_secs(15),
        "took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn working_directory_is_removed_after_the_run() {
    let sandbox = Sandbox::new();
    let task = TaskConfig::new(["echo hi > a.txt"])
        .with_task_runner(process_runner())
        .with_output_files(["a.txt"])
        .with_host(REMOTE.to_string());

    run(&sandbox, task).await.unwrap();

    let leftovers = std::fs::read_dir(sandbox.work_root()).unwrap().count();
    assert_eq!(leftovers, 0);
}
