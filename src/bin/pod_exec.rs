use std::process::ExitCode;

use kubepick::plugins::PodExec;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    kubepick::plugin::main::<PodExec>().await
}
