use clap::Parser;
use matconv::{CommonArgs, Format, init_tracing, load_config, run};

/// Write a scoring matrix as a lower-triangle FASTA pairwise file.
#[derive(Debug, Parser)]
#[command(name = "matfas", version)]
struct Cli {
    #[command(flatten)]
    args: CommonArgs,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(Format::Fasta, cli.args);
    run(&config)
}
