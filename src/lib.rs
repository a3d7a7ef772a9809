//! TLS 종단 리버스 프록시이자 가중 지연 시간 기반 로드 밸런서입니다.
//!
//! # 주요 기능
//!
//! - 가중 지연 시간 기반 백엔드 선택
//! - 클라이언트 IP 단위 세션 고정 (기본 5분)
//! - 주기적 동시 헬스 체크와 엣지 트리거 상태 전이
//! - HTTPS 인바운드, HTTP/HTTPS 아웃바운드 전달
//!
//! # 예제
//!
//! ```
//! use reverse_proxy_balancer::balancer::{Backend, BackendRegistry, LoadBalancer, SessionStore};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = Arc::new(BackendRegistry::from_backends(vec![
//!     Backend::new("http://127.0.0.1:8080", 1, true, Duration::from_millis(100)),
//!     Backend::new("http://127.0.0.1:8081", 3, true, Duration::from_millis(150)),
//! ]));
//! let sessions = Arc::new(SessionStore::new(Duration::from_secs(300)));
//! let balancer = LoadBalancer::new(registry, sessions);
//!
//! // 조정 지연 시간이 가장 낮은 백엔드가 선택되고 세션으로 고정된다
//! let backend = balancer.select("10.0.0.1").await.unwrap();
//! assert_eq!(backend.url, "http://127.0.0.1:8080");
//! # }
//! ```

pub mod balancer;
pub mod logging;
pub mod proxy;
pub mod server;
pub mod settings;
pub mod tls;
