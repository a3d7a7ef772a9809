use std::time::Duration;
use serde::Deserialize;
use super::{server::parse_env_var, SettingsError};

/// 백엔드 선택과 헬스 체크 동작을 제어하는 설정입니다.
///
/// 기간 값은 사람이 읽을 수 있는 문자열("10s", "5m")로 받아 시작 시점에
/// 파싱합니다. 잘못된 문자열은 치명적 에러입니다.
#[derive(Debug, Clone, Deserialize)]
pub struct BalancerSettings {
    /// 백엔드 정의 파일 경로
    #[serde(default = "default_backends_file")]
    pub backends_file: String,

    /// 헬스 체크 주기
    #[serde(default = "default_health_interval")]
    pub health_check_interval: String,

    /// 개별 헬스 프로브 타임아웃
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout: String,

    /// 백엔드로의 요청 전달 타임아웃
    #[serde(default = "default_forward_timeout")]
    pub forward_timeout: String,

    /// 세션 고정 유지 시간
    #[serde(default = "default_session_timeout")]
    pub session_timeout: String,

    /// 종료 시 진행 중인 요청을 기다리는 유예 시간
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace: String,
}

fn default_backends_file() -> String { "backends.json".to_string() }
fn default_health_interval() -> String { "10s".to_string() }
fn default_probe_timeout() -> String { "5s".to_string() }
fn default_forward_timeout() -> String { "5s".to_string() }
fn default_session_timeout() -> String { "5m".to_string() }
fn default_shutdown_grace() -> String { "10s".to_string() }

impl BalancerSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self {
            backends_file: parse_env_var("PROXY_BACKENDS_FILE", default_backends_file)?,
            health_check_interval: parse_env_var("PROXY_HEALTH_INTERVAL", default_health_interval)?,
            probe_timeout: parse_env_var("PROXY_PROBE_TIMEOUT", default_probe_timeout)?,
            forward_timeout: parse_env_var("PROXY_FORWARD_TIMEOUT", default_forward_timeout)?,
            session_timeout: parse_env_var("PROXY_SESSION_TIMEOUT", default_session_timeout)?,
            shutdown_grace: parse_env_var("PROXY_SHUTDOWN_GRACE", default_shutdown_grace)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn health_interval(&self) -> Result<Duration, SettingsError> {
        parse_duration_field("health_check_interval", &self.health_check_interval)
    }

    pub fn probe_timeout(&self) -> Result<Duration, SettingsError> {
        parse_duration_field("probe_timeout", &self.probe_timeout)
    }

    pub fn forward_timeout(&self) -> Result<Duration, SettingsError> {
        parse_duration_field("forward_timeout", &self.forward_timeout)
    }

    pub fn session_timeout(&self) -> Result<Duration, SettingsError> {
        parse_duration_field("session_timeout", &self.session_timeout)
    }

    pub fn shutdown_grace(&self) -> Result<Duration, SettingsError> {
        parse_duration_field("shutdown_grace", &self.shutdown_grace)
    }

    /// 모든 기간 값을 미리 파싱해 잘못된 설정을 시작 시점에 걸러냅니다.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.health_interval()?;
        self.probe_timeout()?;
        self.forward_timeout()?;
        self.session_timeout()?;
        self.shutdown_grace()?;
        Ok(())
    }
}

fn parse_duration_field(field: &str, value: &str) -> Result<Duration, SettingsError> {
    humantime::parse_duration(value.trim()).map_err(|e| SettingsError::InvalidDuration {
        field: field.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

impl Default for BalancerSettings {
    fn default() -> Self {
        Self {
            backends_file: default_backends_file(),
            health_check_interval: default_health_interval(),
            probe_timeout: default_probe_timeout(),
            forward_timeout: default_forward_timeout(),
            session_timeout: default_session_timeout(),
            shutdown_grace: default_shutdown_grace(),
        }
    }
}
