use std::ffi::OsString;

use clap::{Args, Command, CommandFactory, FromArgMatches, Parser};

use crate::plugin::Plugin;

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Kubeconfig context to use instead of the current one
    #[arg(long)]
    pub context: Option<String>,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "warn")]
    pub log_filter: String,
}

#[derive(Debug, Clone, Parser)]
pub struct CliArgs<E: Args> {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub plugin: E,
}

/// Plugins without flags of their own.
#[derive(Debug, Clone, Default, Args)]
pub struct NoArgs {}

pub fn command<P: Plugin>() -> Command {
    CliArgs::<P::Args>::command()
        .name(P::NAME)
        .bin_name(format!("kubectl {}", P::NAME))
        .about(P::ABOUT)
        .override_usage(format!("kubectl {} [OPTIONS]", P::NAME))
}

/// Parses the plugin's arguments. `Ok(None)` means usage was printed for a
/// bare `help` argument; `--help`/`-h` surface as a clap display error.
pub fn parse<P: Plugin>(argv: Vec<OsString>) -> Result<Option<CliArgs<P::Args>>, clap::Error> {
    let mut command = command::<P>();
    if argv.get(1).is_some_and(|arg| arg == "help") {
        command.print_help()?;
        return Ok(None);
    }

    let mut matches = command.try_get_matches_from(argv)?;
    CliArgs::<P::Args>::from_arg_matches_mut(&mut matches).map(Some)
}
