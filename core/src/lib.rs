//! Planning and orchestration for Ollama command tasks.
//!
//! A task is a list of shell commands driving an Ollama server. This crate renders the
//! task's options, decides how the server is reached (local bootstrap or remote host),
//! mounts a persistent model cache into container runners, rewrites the command list so
//! captured output survives model removal, and hands the result to a [`executor::CommandExecutor`].
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod planner;
pub mod property;
pub mod runner;
pub mod storage;
pub mod util;
