use clap::Parser;
use mye_runner::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Score(args) => cli::quality::score(args).await,
        Command::Validate(args) => cli::quality::validate(args).await,
        Command::Run(args) => cli::experiment::run(args).await,
        Command::Collect(args) => cli::experiment::collect(args).await,
        Command::Report(args) => cli::experiment::report(args).await,
        Command::List(args) => cli::experiment::list(args).await,
    }
}
