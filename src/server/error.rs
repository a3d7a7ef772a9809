use std::fmt;
use std::time::Duration;

use crate::balancer::BackendLoadError;
use crate::settings::SettingsError;

#[derive(Debug)]
pub enum Error {
    Settings(SettingsError),
    BackendLoad(BackendLoadError),
    Io(std::io::Error),
    HttpClient(reqwest::Error),
    Tls(Box<dyn std::error::Error + Send + Sync>),
    /// 종료 유예 시간 내에 진행 중인 연결이 끝나지 않음
    ShutdownTimeout { grace: Duration },
}

impl From<SettingsError> for Error {
    fn from(err: SettingsError) -> Self {
        Error::Settings(err)
    }
}

impl From<BackendLoadError> for Error {
    fn from(err: BackendLoadError) -> Self {
        Error::BackendLoad(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::HttpClient(err)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Error {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Error::Tls(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Settings(e) => write!(f, "Settings Error: {}", e),
            Error::BackendLoad(e) => write!(f, "Backend Load Error: {}", e),
            Error::Io(e) => write!(f, "IO Error: {}", e),
            Error::HttpClient(e) => write!(f, "HTTP Client Error: {}", e),
            Error::Tls(e) => write!(f, "TLS Error: {}", e),
            Error::ShutdownTimeout { grace } =>
                write!(f, "Graceful shutdown exceeded {:?} grace period", grace),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Settings(e) => Some(e),
            Error::BackendLoad(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::HttpClient(e) => Some(e),
            Error::Tls(e) => Some(e.as_ref()),
            Error::ShutdownTimeout { .. } => None,
        }
    }
}
