mod shell;

pub use shell::ShellCommandExecutor;
