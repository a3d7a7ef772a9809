use std::{env, path::PathBuf};
use serde::Deserialize;
use tokio::fs;
use super::SettingsError;

/// TLS 인증서 설정입니다.
///
/// 인바운드는 HTTPS 전용이므로 인증서와 개인키는 필수이며, 시작 시점에
/// 존재하지 않으면 치명적 에러입니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsSettings {
    /// 인증서 파일 경로
    pub cert_path: Option<PathBuf>,

    /// 개인키 파일 경로
    pub key_path: Option<PathBuf>,
}

impl TlsSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            cert_path: env::var("PROXY_TLS_CERT").map(PathBuf::from).ok(),
            key_path: env::var("PROXY_TLS_KEY").map(PathBuf::from).ok(),
        })
    }

    /// 인증서/키가 모두 지정되어 있고 읽을 수 있는지 검증합니다.
    pub async fn validate(&self) -> Result<(), SettingsError> {
        let cert_path = self.cert_path.as_ref().ok_or_else(|| SettingsError::EnvVarMissing {
            var_name: "PROXY_TLS_CERT".to_string(),
        })?;

        let key_path = self.key_path.as_ref().ok_or_else(|| SettingsError::EnvVarMissing {
            var_name: "PROXY_TLS_KEY".to_string(),
        })?;

        for path in [cert_path, key_path] {
            fs::read(path).await.map_err(|e| SettingsError::FileError {
                path: path.to_string_lossy().to_string(),
                error: e,
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::fs::File;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_tls_settings_validation() {
        let dir = tempfile::tempdir().unwrap();
        let cert_path = dir.path().join("cert.pem");
        let key_path = dir.path().join("key.pem");

        let mut cert_file = File::create(&cert_path).await.unwrap();
        cert_file.write_all(b"test cert").await.unwrap();

        let mut key_file = File::create(&key_path).await.unwrap();
        key_file.write_all(b"test key").await.unwrap();

        let settings = TlsSettings {
            cert_path: Some(cert_path),
            key_path: Some(key_path),
        };
        assert!(settings.validate().await.is_ok());
    }

    #[tokio::test]
    async fn test_tls_settings_missing_cert_is_fatal() {
        let settings = TlsSettings {
            cert_path: None,
            key_path: Some(PathBuf::from("key.pem")),
        };
        assert!(matches!(
            settings.validate().await,
            Err(SettingsError::EnvVarMissing { .. })
        ));
    }

    #[tokio::test]
    async fn test_tls_settings_unreadable_file_is_fatal() {
        let settings = TlsSettings {
            cert_path: Some(PathBuf::from("/nonexistent/cert.pem")),
            key_path: Some(PathBuf::from("/nonexistent/key.pem")),
        };
        assert!(matches!(
            settings.validate().await,
            Err(SettingsError::FileError { .. })
        ));
    }
}
