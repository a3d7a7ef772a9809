use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// 프록시 대상이 되는 단일 오리진 서버입니다.
///
/// `url`과 `weight`는 로드 이후 변경되지 않으며, `active`와 지연 시간은
/// 헬스 모니터와 요청 경로에서 동시에 갱신됩니다.
#[derive(Debug)]
pub struct Backend {
    pub url: String,
    pub weight: u32,
    active: AtomicBool,
    latency_ns: AtomicU64,
    request_count: AtomicU64,
}

impl Backend {
    pub fn new(url: impl Into<String>, weight: u32, active: bool, latency: Duration) -> Self {
        Self {
            url: url.into(),
            weight,
            active: AtomicBool::new(active),
            latency_ns: AtomicU64::new(latency.as_nanos() as u64),
            request_count: AtomicU64::new(0),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }

    /// 가장 최근에 관측된 왕복 지연 시간
    pub fn latency(&self) -> Duration {
        Duration::from_nanos(self.latency_ns.load(Ordering::Relaxed))
    }

    pub fn set_latency(&self, latency: Duration) {
        self.latency_ns
            .store(latency.as_nanos() as u64, Ordering::Relaxed);
    }

    /// 전달된 요청 수를 1 증가시킵니다. 관측용 카운터이며 선택 로직에는
    /// 사용되지 않습니다.
    pub fn mark_request(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// 헬스 체크 엔드포인트 URL
    pub fn health_url(&self) -> String {
        format!("{}/health", self.url.trim_end_matches('/'))
    }
}
