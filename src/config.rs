use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuración del proceso, cargada del entorno (y de `.env` si existe).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub discord_token: String,
    pub youtube_api_key: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            discord_token: std::env::var("DISCORD_TOKEN")?,
            youtube_api_key: std::env::var("YOUTUBE_API_KEY")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.discord_token.trim().is_empty() {
            anyhow::bail!("DISCORD_TOKEN no puede estar vacío");
        }
        if self.youtube_api_key.trim().is_empty() {
            anyhow::bail!("YOUTUBE_API_KEY no puede estar vacío");
        }
        Ok(())
    }
}
