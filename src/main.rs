//! Command-line entry point: asks for an image path or URL and uploads it.
//!
//! Usage:
//! `img-uploader [--config <path>] [--pretty] [-v] [PATH_OR_URL]`

use anyhow::{bail, Context};
use clap::Parser;
use img_uploader::config::default_config_path;
use img_uploader::{Config, Uploader};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "img-uploader", version, about = "Upload an image to Qiniu as <md5>.<ext>")]
struct Args {
    /// Local path or http(s) URL of the image. Prompted for when omitted.
    path_or_url: Option<String>,

    /// Config file to use instead of config.json next to the executable.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the response JSON.
    #[arg(long)]
    pretty: bool,

    /// Log each stage to stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from a .env file if it exists.
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(args.verbose);

    let config_path = args.config.unwrap_or_else(default_config_path);
    let config = Config::load(&config_path)?;
    if config.user_token.is_empty() {
        bail!("user_token in {} is empty", config_path.display());
    }

    let path_or_url = match args.path_or_url {
        Some(p) => p,
        None => prompt("Image path or URL: ")?,
    };
    let path_or_url = path_or_url.trim();
    if path_or_url.is_empty() {
        bail!("no image path or URL was entered");
    }

    let uploader = Uploader::new(config)?;
    let result = uploader
        .upload_image(path_or_url)
        .await
        .with_context(|| format!("failed to upload {}", path_or_url))?;

    let body = if args.pretty {
        serde_json::to_string_pretty(&result.raw)?
    } else {
        result.raw.to_string()
    };

    println!("Upload succeeded: {}", result.key);
    println!("response_json:");
    println!("{}", body);

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "img_uploader=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{}", message);
    io::stdout().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line)
}
