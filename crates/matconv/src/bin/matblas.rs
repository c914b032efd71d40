use clap::Parser;
use matconv::{CommonArgs, Format, init_tracing, load_config, run};

/// Write a scoring matrix as a full BLAST matrix with a `*` column.
#[derive(Debug, Parser)]
#[command(name = "matblas", version)]
struct Cli {
    #[command(flatten)]
    args: CommonArgs,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(Format::Blast, cli.args);
    run(&config)
}
