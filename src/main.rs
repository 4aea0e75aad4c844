use std::path::PathBuf;

use clap::Parser;
use rust_conv_geometry::{GeometryError, load_requests_from_path, summarize};

#[derive(Parser, Debug)]
#[command(author, version, about = "Compute convolution and pooling geometry", long_about = None)]
struct Cli {
    /// Path to a JSON file holding one request object or an array of requests.
    requests: PathBuf,
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
    /// Print one summary line per request instead of JSON.
    #[arg(long, conflicts_with = "pretty")]
    summary: bool,
}

fn run() -> Result<(), GeometryError> {
    let cli = Cli::parse();
    let requests = load_requests_from_path(&cli.requests)?;

    let mut infos = Vec::with_capacity(requests.len());
    for request in &requests {
        infos.push(request.compute()?);
    }

    if cli.summary {
        for (request, info) in requests.iter().zip(&infos) {
            println!("{}", summarize(request.op_name(), info));
        }
        return Ok(());
    }

    let json = if cli.pretty {
        serde_json::to_string_pretty(&infos)?
    } else {
        serde_json::to_string(&infos)?
    };
    println!("{}", json);
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
