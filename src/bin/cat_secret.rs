use std::process::ExitCode;

use kubepick::plugins::CatSecret;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    kubepick::plugin::main::<CatSecret>().await
}
