mod io_pump;
mod output;
mod run;
mod traits;
pub mod types;

pub use io_pump::{LineStream, LineTap};
pub use output::{forward_lines, LogConsumer, StdoutLogConsumer};
pub use run::{run_session, RunSessionArgs, DEFAULT_DRAIN_TIMEOUT};
pub use traits::{RunnerSession, TaskRunner};
pub use types::{RunOutcome, RunnerStartArgs, VolumeMount};
