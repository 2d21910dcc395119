use anyhow::{Context, Result};
use openvibe_infrastructure::{ConfigService, OpenVibePaths};

pub fn show(paths: &OpenVibePaths) -> Result<String> {
    let service = ConfigService::new(paths).context("Failed to resolve config path")?;
    let config = service.get_config();
    let body = config
        .to_toml_string()
        .context("Failed to render configuration")?;
    Ok(format!("# {}\n{}", service.path().display(), body))
}
