use crate::commands::Out;
use crate::error::Result;
use crate::Config;
use anyhow::Context;
use std::path::Path;

/// Create the updash home directory, config file and secrets directory.
pub async fn init(directory: &Path) -> Result<Out<()>> {
    let _ = Config::create(directory)
        .await
        .context("Unable to create the updash directory and config")?;
    Ok("Successfully created the updash directory and config".into())
}
