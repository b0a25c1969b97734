//! pkgbuild CLI entry point: parse arguments, set up logging, dispatch.

use clap::Parser;
use miette::Result;
use pkgbuild_cli::{cli, commands, error, logger};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);

    let result = match args.command {
        cli::Command::Infer(infer_args) => commands::infer_execute(infer_args).await,
        cli::Command::Plan(plan_args) => commands::plan_execute(plan_args).await,
        cli::Command::Targets(targets_args) => commands::targets_execute(targets_args),
    };

    result.map_err(error::cli_error_to_miette)
}
