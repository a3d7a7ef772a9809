use std::{env, fs, path::Path};
use serde::Deserialize;

mod balancer;
mod error;
pub mod logging;
mod server;
mod tls;

pub use balancer::BalancerSettings;
pub use error::SettingsError;
pub use logging::{LogFormat, LogSettings};
pub use server::ServerSettings;
pub use server::parse_env_var;
pub use tls::TlsSettings;

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerSettings,

    /// TLS 설정
    #[serde(default)]
    pub tls: TlsSettings,

    /// 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    /// 밸런서 설정
    #[serde(default)]
    pub balancer: BalancerSettings,
}

impl Settings {
    pub async fn load() -> Result<Self> {
        if let Ok(config_path) = env::var("PROXY_CONFIG_FILE") {
            Self::from_toml_file(&config_path).await
        } else {
            Self::from_env().await
        }
    }

    pub async fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| SettingsError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        let settings: Self = toml::from_str(&content)
            .map_err(|e| SettingsError::ParseError { source: e })?;

        settings.validate().await?;
        Ok(settings)
    }

    pub async fn from_env() -> Result<Self> {
        let settings = Self {
            server: ServerSettings::from_env()?,
            tls: TlsSettings::from_env()?,
            logging: LogSettings::from_env()?,
            balancer: BalancerSettings::from_env()?,
        };

        // 설정 생성 시점에 바로 검증
        settings.validate().await?;
        Ok(settings)
    }

    /// 설정 유효성 검증
    pub async fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.tls.validate().await?;
        self.balancer.validate()?;
        Ok(())
    }
}
