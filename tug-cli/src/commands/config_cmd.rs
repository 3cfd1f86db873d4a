use anyhow::Result;
use std::path::Path;

use crate::config::Config;

pub async fn show_config(path: Option<&Path>) -> Result<()> {
    let config = Config::load(path)?;
    let config_str = toml::to_string_pretty(&config)?;

    println!("Current Configuration");
    println!("────────────────────────────────");
    println!("File: {}", Config::resolve_path(path)?.display());
    println!();
    println!("{}", config_str);

    Ok(())
}

pub async fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let config_file = Config::resolve_path(path)?;

    if config_file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            config_file.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let written = Config::default().save(Some(&config_file))?;

    println!("✓ Configuration initialized at: {}", written.display());

    Ok(())
}
