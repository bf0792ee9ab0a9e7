mod cmds;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "oracle-rollup-node")]
#[command(version = "0.1.0")]
#[command(about = "Sequence beacon-chain observations into the oracle rollup", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[clap(name = "run")]
    Run(cmds::run::Opts),

    #[clap(name = "create_key")]
    CreateKey(cmds::create_key::Opts),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Run(opts) => cmds::run::run(opts).await?,
        Commands::CreateKey(opts) => cmds::create_key::run(opts).await?,
    }

    Ok(())
}
