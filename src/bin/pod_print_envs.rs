use std::process::ExitCode;

use kubepick::plugins::PodPrintEnvs;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    kubepick::plugin::main::<PodPrintEnvs>().await
}
