//! Print the OpenAPI document as JSON, or write it to a file.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write as _};
use std::path::PathBuf;

use clap::Parser;
use ride_service::ApiDoc;
use utoipa::OpenApi;

/// `openapi-dump` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "openapi-dump",
    about = "Export the ride service OpenAPI document",
    version
)]
struct CliArgs {
    /// Write to this file instead of standard output.
    #[arg(long, value_name = "path")]
    output: Option<PathBuf>,
    /// Emit YAML instead of JSON.
    #[arg(long)]
    yaml: bool,
}

fn render(yaml: bool) -> io::Result<String> {
    let doc = ApiDoc::openapi();
    let rendered = if yaml {
        doc.to_yaml().map_err(io::Error::other)?
    } else {
        doc.to_pretty_json().map_err(io::Error::other)?
    };
    Ok(rendered)
}

fn main() -> io::Result<()> {
    let args = CliArgs::parse();
    let document = render(args.yaml)?;
    match args.output {
        Some(path) => std::fs::write(path, document),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.write_all(b"\n")
        }
    }
}
