use std::process::ExitCode;

use kubepick::plugins::CatConfigMap;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    kubepick::plugin::main::<CatConfigMap>().await
}
