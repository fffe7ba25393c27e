mod docker;
mod process;
mod session;

pub use docker::{DockerTaskRunner, WORKSPACE};
pub use process::ProcessTaskRunner;
