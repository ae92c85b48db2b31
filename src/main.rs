use anyhow::Result;
use clap::Parser;

use rust_scalp::app::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    rust_scalp::app_init()?;
    rust_scalp::run(args).await?;
    Ok(())
}
