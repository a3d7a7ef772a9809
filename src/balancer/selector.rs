use std::sync::Arc;
use tracing::debug;

use super::backend::Backend;
use super::registry::BackendRegistry;
use super::session::SessionStore;

/// 가중 지연 시간 기반 백엔드 선택기입니다.
///
/// 세션 캐시를 먼저 조회하고, 없으면 활성 백엔드 중에서 조정 지연 시간이
/// 최소인 백엔드를 새로 고릅니다.
#[derive(Debug)]
pub struct LoadBalancer {
    registry: Arc<BackendRegistry>,
    sessions: Arc<SessionStore>,
}

impl LoadBalancer {
    pub fn new(registry: Arc<BackendRegistry>, sessions: Arc<SessionStore>) -> Self {
        Self { registry, sessions }
    }

    /// 클라이언트가 보낼 요청의 대상 백엔드를 결정합니다.
    ///
    /// 유효한 세션이 있으면 그 백엔드를 그대로 반환합니다. 세션 백엔드의
    /// 지연 시간이 그 사이 변했더라도 재계산하지 않습니다. 활성 백엔드가
    /// 하나도 없으면 `None`을 반환합니다.
    pub async fn select(&self, client_ip: &str) -> Option<Arc<Backend>> {
        if let Some(backend) = self.sessions.lookup(client_ip).await {
            debug!(client_ip = %client_ip, backend = %backend.url, "세션 백엔드 재사용");
            return Some(backend);
        }

        let selected = self.pick_by_weighted_latency()?;
        self.sessions.record(client_ip, selected.clone()).await;
        Some(selected)
    }

    /// 활성 백엔드 각각에 대해 `지연 시간 × (가중치 / 전체 가중치)`를
    /// 계산하고 최솟값을 고릅니다. 동률이면 레지스트리 순서상 먼저
    /// 나온 백엔드가 유지됩니다.
    fn pick_by_weighted_latency(&self) -> Option<Arc<Backend>> {
        let total_weight: u64 = self
            .registry
            .iter()
            .filter(|b| b.is_active())
            .map(|b| u64::from(b.weight))
            .sum();

        if total_weight == 0 {
            return None;
        }

        let mut selected: Option<(Arc<Backend>, f64)> = None;

        for backend in self.registry.iter().filter(|b| b.is_active()) {
            let weight_factor = f64::from(backend.weight) / total_weight as f64;
            let adjusted = backend.latency().as_secs_f64() * weight_factor;

            match &selected {
                Some((_, min)) if adjusted >= *min => {}
                _ => selected = Some((backend.clone(), adjusted)),
            }
        }

        selected.map(|(backend, _)| backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn make_balancer(backends: Vec<Backend>) -> LoadBalancer {
        LoadBalancer::new(
            Arc::new(BackendRegistry::from_backends(backends)),
            Arc::new(SessionStore::new(Duration::from_secs(300))),
        )
    }

    #[tokio::test]
    async fn test_weighted_latency_favors_low_adjusted_value() {
        // A: 100ms × (1/4) = 25ms, B: 150ms × (3/4) = 112.5ms → A 선택
        let balancer = make_balancer(vec![
            Backend::new("http://a:8080", 1, true, Duration::from_millis(100)),
            Backend::new("http://b:8080", 3, true, Duration::from_millis(150)),
        ]);

        let selected = balancer.select("10.0.0.1").await.unwrap();
        assert_eq!(selected.url, "http://a:8080");
    }

    #[tokio::test]
    async fn test_tie_breaks_to_registry_order() {
        let balancer = make_balancer(vec![
            Backend::new("http://a:8080", 1, true, Duration::from_millis(100)),
            Backend::new("http://b:8080", 1, true, Duration::from_millis(100)),
        ]);

        let selected = balancer.select("10.0.0.1").await.unwrap();
        assert_eq!(selected.url, "http://a:8080");
    }

    #[tokio::test]
    async fn test_single_active_backend_always_selected() {
        let balancer = make_balancer(vec![
            Backend::new("http://a:8080", 1, false, Duration::from_millis(1)),
            Backend::new("http://b:8080", 5, true, Duration::from_secs(10)),
        ]);

        let selected = balancer.select("10.0.0.1").await.unwrap();
        assert_eq!(selected.url, "http://b:8080");
    }

    #[tokio::test]
    async fn test_no_active_backend_returns_none() {
        let balancer = make_balancer(vec![
            Backend::new("http://a:8080", 1, false, Duration::from_millis(1)),
            Backend::new("http://b:8080", 2, false, Duration::from_millis(1)),
        ]);

        assert!(balancer.select("10.0.0.1").await.is_none());
    }

    #[tokio::test]
    async fn test_sticky_session_wins_over_lower_latency() {
        let registry = Arc::new(BackendRegistry::from_backends(vec![
            Backend::new("http://a:8080", 1, true, Duration::from_millis(100)),
            Backend::new("http://b:8080", 1, true, Duration::from_millis(500)),
        ]));
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(300)));
        let balancer = LoadBalancer::new(registry.clone(), sessions.clone());

        let b = registry.iter().nth(1).unwrap().clone();
        sessions.record("10.0.0.1", b).await;

        // B의 지연이 훨씬 높아도 세션이 유효한 동안 B가 유지되어야 함
        let selected = balancer.select("10.0.0.1").await.unwrap();
        assert_eq!(selected.url, "http://b:8080");
    }

    #[tokio::test]
    async fn test_inactive_sticky_backend_falls_through() {
        let registry = Arc::new(BackendRegistry::from_backends(vec![
            Backend::new("http://a:8080", 1, true, Duration::from_millis(100)),
            Backend::new("http://b:8080", 1, true, Duration::from_millis(500)),
        ]));
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(300)));
        let balancer = LoadBalancer::new(registry.clone(), sessions.clone());

        let b = registry.iter().nth(1).unwrap().clone();
        sessions.record("10.0.0.1", b.clone()).await;
        b.set_active(false);

        let selected = balancer.select("10.0.0.1").await.unwrap();
        assert_eq!(selected.url, "http://a:8080");
    }
}
