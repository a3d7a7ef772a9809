use std::sync::Arc;
use std::time::{Duration, Instant};
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use super::backend::Backend;
use super::registry::BackendRegistry;
use super::session::SessionStore;

/// 단일 프로브의 결과
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// HTTP 200 응답
    Healthy,
    /// 200이 아닌 상태 코드
    BadStatus(u16),
    /// 네트워크 에러 또는 타임아웃
    Unreachable(String),
}

/// 프로브 결과로 인해 발생한 상태 전이
#[derive(Debug, PartialEq)]
pub enum HealthTransition {
    Recovered,
    WentDown { reason: String },
}

/// 프로브 결과를 백엔드 상태에 반영하고, 상태가 실제로 바뀐 경우에만
/// 전이를 반환합니다.
///
/// 결과가 현재 상태와 일치하면 아무 일도 일어나지 않습니다. 연속 실패가
/// 반복되어도 알림은 첫 실패 한 번만 발생합니다.
pub fn apply_probe_outcome(backend: &Backend, outcome: &ProbeOutcome) -> Option<HealthTransition> {
    match outcome {
        ProbeOutcome::Healthy => {
            if backend.is_active() {
                None
            } else {
                backend.set_active(true);
                Some(HealthTransition::Recovered)
            }
        }
        ProbeOutcome::BadStatus(status) => {
            if backend.is_active() {
                backend.set_active(false);
                Some(HealthTransition::WentDown {
                    reason: format!("non-200 응답: {}", status),
                })
            } else {
                None
            }
        }
        ProbeOutcome::Unreachable(reason) => {
            if backend.is_active() {
                backend.set_active(false);
                Some(HealthTransition::WentDown {
                    reason: reason.clone(),
                })
            } else {
                None
            }
        }
    }
}

/// 타임아웃이 걸린 프로브용 HTTP 클라이언트를 생성합니다.
pub fn probe_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// 주기적으로 모든 백엔드를 프로브해 active/latency 상태를 현실과
/// 수렴시키는 모니터입니다.
#[derive(Debug)]
pub struct HealthMonitor {
    registry: Arc<BackendRegistry>,
    client: reqwest::Client,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(
        registry: Arc<BackendRegistry>,
        interval: Duration,
        probe_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            registry,
            client: probe_client(probe_timeout)?,
            interval,
        })
    }

    /// 프로세스가 종료될 때까지 실행되는 모니터 루프입니다.
    ///
    /// 한 사이클의 모든 프로브가 끝난 뒤에야 다음 인터벌만큼 잠듭니다.
    /// 개별 프로브 실패는 해당 백엔드의 상태에만 반영됩니다.
    pub async fn run(self) {
        info!(interval = ?self.interval, backends = self.registry.len(), "헬스 모니터 시작");
        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// 한 사이클: 모든 백엔드를 동시에 프로브하고 전부 끝날 때까지
    /// 기다립니다.
    pub async fn run_cycle(&self) {
        let probes = self
            .registry
            .iter()
            .map(|backend| probe_backend(&self.client, backend.clone()));
        join_all(probes).await;
    }
}

/// 백엔드 하나를 프로브하고 결과를 상태에 반영합니다.
///
/// 결과와 무관하게 경과 시간을 지연 시간으로 기록합니다.
async fn probe_backend(client: &reqwest::Client, backend: Arc<Backend>) {
    let started = Instant::now();
    let result = client.get(backend.health_url()).send().await;
    backend.set_latency(started.elapsed());

    let outcome = match result {
        Ok(response) if response.status() == reqwest::StatusCode::OK => ProbeOutcome::Healthy,
        Ok(response) => ProbeOutcome::BadStatus(response.status().as_u16()),
        Err(e) => ProbeOutcome::Unreachable(e.to_string()),
    };

    match apply_probe_outcome(&backend, &outcome) {
        Some(HealthTransition::Recovered) => {
            info!(url = %backend.url, "백엔드 복구됨");
        }
        Some(HealthTransition::WentDown { reason }) => {
            warn!(url = %backend.url, reason = %reason, "백엔드 다운");
        }
        None => {}
    }
}

/// 응답 전송 후 클라이언트별로 실행되는 지연 시간 재측정입니다.
///
/// 현재 활성인 백엔드들을 순서대로 다시 프로브하고, 성공한 측정치는
/// 백엔드 지연 시간에도 반영합니다. 세션에 기록된 백엔드보다 엄격히
/// 빠른 백엔드가 발견되면 세션을 교체합니다. 헬스 모니터와 같은 공유
/// 상태에 기록하므로 동일한 동기화 경로를 사용합니다. 실패는 기록만
/// 하고 전파하지 않습니다.
pub async fn recheck_client_latency(
    registry: Arc<BackendRegistry>,
    sessions: Arc<SessionStore>,
    client: reqwest::Client,
    client_ip: String,
) {
    let mut best: Option<(Arc<Backend>, Duration)> = None;

    for backend in registry.iter() {
        if !backend.is_active() {
            continue;
        }

        let started = Instant::now();
        match client.get(backend.health_url()).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                let observed = started.elapsed();
                backend.set_latency(observed);

                match &best {
                    Some((_, min)) if observed >= *min => {}
                    _ => best = Some((backend.clone(), observed)),
                }
            }
            Ok(response) => {
                debug!(url = %backend.url, status = %response.status(), "재측정 응답 비정상");
            }
            Err(e) => {
                debug!(url = %backend.url, error = %e, "재측정 실패");
            }
        }
    }

    if let Some((candidate, observed)) = best {
        sessions
            .switch_if_faster(&client_ip, candidate, observed)
            .await;
    }
}
