//! `stepgraph` binary: parse the command line, run the command and print its output.

use clap::Parser;
use stepgraph_cli::{run_cli, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match run_cli(cli).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
