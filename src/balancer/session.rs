use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::backend::Backend;

#[derive(Debug)]
struct SessionEntry {
    backend: Arc<Backend>,
    expires_at: Instant,
}

/// 클라이언트 IP를 이전에 선택된 백엔드에 묶어두는 세션 캐시입니다.
///
/// 만료는 지연 방식입니다. 만료된 항목은 조회 시점에 무시될 뿐 별도의
/// 정리 작업은 수행하지 않습니다. 조회와 기록이 여러 태스크에서
/// 교차하므로 단일 RwLock으로 보호합니다.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    timeout: Duration,
}

impl SessionStore {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    /// 유효한 세션 백엔드를 반환합니다.
    ///
    /// 항목이 존재하고, 기록된 백엔드가 현재 활성 상태이며, 아직 만료되지
    /// 않은 경우에만 백엔드를 돌려줍니다. 조건 하나라도 어긋나면 세션이
    /// 없는 것으로 취급합니다.
    pub async fn lookup(&self, client_ip: &str) -> Option<Arc<Backend>> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(client_ip)?;

        if !entry.backend.is_active() {
            return None;
        }
        if Instant::now() >= entry.expires_at {
            return None;
        }

        Some(entry.backend.clone())
    }

    /// 세션을 기록하고 만료 시각을 현재 시각 + 타임아웃으로 재설정합니다.
    ///
    /// 기존 항목은 항상 덮어씁니다. 같은 클라이언트의 백엔드가 바뀌는
    /// 경우는 최초 할당과 구분해 기록합니다.
    pub async fn record(&self, client_ip: &str, backend: Arc<Backend>) {
        let mut sessions = self.sessions.write().await;

        match sessions.get(client_ip) {
            Some(entry) if !Arc::ptr_eq(&entry.backend, &backend) => {
                info!(
                    client_ip = %client_ip,
                    from = %entry.backend.url,
                    to = %backend.url,
                    "클라이언트 백엔드 변경"
                );
            }
            None => {
                debug!(client_ip = %client_ip, backend = %backend.url, "클라이언트 백엔드 할당");
            }
            _ => {}
        }

        sessions.insert(
            client_ip.to_string(),
            SessionEntry {
                backend,
                expires_at: Instant::now() + self.timeout,
            },
        );
    }

    /// 지연 시간 재측정 경로에서 호출됩니다.
    ///
    /// 후보 백엔드의 관측 지연이 현재 기록된 백엔드의 지연보다 엄격히
    /// 낮을 때만 백엔드를 교체합니다. 만료 시각은 그대로 유지합니다.
    /// 세션이 없는 클라이언트에 대해서는 아무것도 하지 않습니다.
    pub async fn switch_if_faster(
        &self,
        client_ip: &str,
        candidate: Arc<Backend>,
        observed: Duration,
    ) -> bool {
        let mut sessions = self.sessions.write().await;

        let Some(entry) = sessions.get_mut(client_ip) else {
            return false;
        };
        if Arc::ptr_eq(&entry.backend, &candidate) {
            return false;
        }
        if observed >= entry.backend.latency() {
            return false;
        }

        info!(
            client_ip = %client_ip,
            from = %entry.backend.url,
            to = %candidate.url,
            observed = ?observed,
            "재측정 결과로 세션 백엔드 교체"
        );
        entry.backend = candidate;
        true
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
