use anyhow::Result;
use clap::Parser;
use oracle_rollup_chain::RollupId;
use oracle_rollup_sequencer::Signer;

#[derive(Debug, Parser)]
pub struct Opts {
    /// Also print the rollup id derived from this name
    #[clap(long)]
    rollup_name: Option<String>,
}

pub async fn run(opts: &Opts) -> Result<()> {
    let signer = Signer::generate()?;

    println!("seed:       {}", signer.seed_hex());
    println!("public key: {}", hex::encode(signer.public_key()));
    println!("address:    {}", signer.address());
    if let Some(name) = &opts.rollup_name {
        println!("rollup id:  {}", RollupId::from_name(name));
    }
    println!("\nSet SEQUENCER_PRIVATE to the seed. Keep it secret.");

    Ok(())
}
