use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use storefront_api::openapi::ApiDoc;
use utoipa::OpenApi;

/// Writes the storefront OpenAPI document to disk
#[derive(Debug, Parser)]
#[command(name = "openapi-export", version)]
struct Cli {
    /// Destination file; parent directories are created as needed
    #[arg(short, long, default_value = "openapi/storefront-api.json")]
    output: PathBuf,

    /// Emit single-line JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Print the document to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    stdout: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let doc = ApiDoc::openapi();

    let json = if cli.compact {
        serde_json::to_string(&doc)?
    } else {
        serde_json::to_string_pretty(&doc)?
    };

    if cli.stdout {
        println!("{json}");
        return Ok(());
    }

    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&cli.output, json).with_context(|| format!("writing {}", cli.output.display()))?;

    eprintln!(
        "{} paths exported to {}",
        doc.paths.paths.len(),
        cli.output.display()
    );
    Ok(())
}
