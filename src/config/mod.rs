pub mod settings;
pub mod toml_config;

pub use settings::ServiceSettings;
pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "working-days")]
#[command(about = "Business date calculator over a working schedule and holiday calendar")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Address to bind to")]
    pub host: Option<String>,

    #[arg(long, env = "PORT", help = "Port to listen on (default 3000)")]
    pub port: Option<u16>,

    #[arg(long, env = "HOLIDAYS_URL", help = "URL of a JSON array of YYYY-MM-DD holidays")]
    pub holidays_url: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 預設值 -> 設定檔 -> 命令列參數
    pub fn resolve_settings(&self) -> Result<ServiceSettings> {
        let mut settings = match &self.config {
            Some(path) => {
                let file_config = TomlConfig::from_file(path)?;
                file_config.validate()?;
                ServiceSettings::from_toml(&file_config)?
            }
            None => ServiceSettings::default(),
        };

        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(url) = &self.holidays_url {
            settings.holidays.source_url = Some(url.clone());
        }

        settings.validate()?;
        Ok(settings)
    }
}
