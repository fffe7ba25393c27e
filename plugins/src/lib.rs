//! Concrete collaborators for `ollama-task-core`: runners, the shell executor and storage.
pub mod executor;
pub mod factory;
pub mod runner;
pub mod storage;
