//! This example uploads one image using the library API directly.
//!
//! It reads `config.json` from the current directory, uploads the given path
//! or URL and prints the resulting key and hash.
//!
//! Usage:
//! `cargo run --example upload_image -- assets/image.png`

use img_uploader::{Config, Uploader};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from a .env file if it exists.
    dotenvy::dotenv().ok();

    let image = env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/image.png".to_string());
    let config = Config::load("config.json")?;
    let uploader = Uploader::new(config)?;

    println!("Uploading '{}'", image);

    let result = uploader.upload_image(&image).await?;
    println!("\nSuccessfully uploaded file.");
    println!("-> Key: {}", result.key);
    println!("-> Hash: {}", result.hash);
    println!("-> Size: {} bytes", result.fsize);

    Ok(())
}
