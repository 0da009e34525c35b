use anyhow::{Context, Result};
use oracle_application::ConfigService;

pub fn show(config_service: &ConfigService) -> Result<()> {
    let config = config_service.get_config()?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;

    if config_service.path().exists() {
        println!("# {}", config_service.path().display());
    } else {
        println!("# {} (not found, using defaults)", config_service.path().display());
    }
    print!("{}", rendered);

    Ok(())
}
