use std::sync::Arc;
use tracing::info;

use crate::balancer::{
    probe_client, BackendRegistry, HealthMonitor, LoadBalancer, SessionStore,
};
use crate::proxy::ProxyConfig;
use crate::settings::Settings;
use super::handler::RequestHandler;
use super::listener::ServerListener;
use super::Result;

/// 설정으로부터 전체 서버를 조립하고 수명을 관리합니다.
///
/// 레지스트리와 세션 테이블은 프로세스가 소유하는 명시적 상태로, 전역
/// 상태 없이 각 구성 요소에 전달됩니다.
pub struct ServerManager {
    settings: Settings,
    registry: Arc<BackendRegistry>,
    handler: Arc<RequestHandler>,
}

impl ServerManager {
    /// 백엔드 정의를 로드하고 구성 요소를 연결합니다.
    ///
    /// 백엔드 파일이나 기간 설정이 잘못된 경우 여기서 실패하며, 프로세스는
    /// 시작되지 않아야 합니다.
    pub fn new(settings: Settings) -> Result<Self> {
        let registry = Arc::new(BackendRegistry::load(&settings.balancer.backends_file)?);
        let sessions = Arc::new(SessionStore::new(settings.balancer.session_timeout()?));
        let balancer = Arc::new(LoadBalancer::new(registry.clone(), sessions.clone()));

        let proxy_config = ProxyConfig::new(settings.balancer.forward_timeout()?)?;
        let prober = probe_client(settings.balancer.probe_timeout()?)?;

        let handler = Arc::new(RequestHandler::new(
            balancer,
            registry.clone(),
            sessions,
            proxy_config,
            prober,
        ));

        Ok(Self {
            settings,
            registry,
            handler,
        })
    }

    /// 헬스 모니터를 띄우고 리스너를 실행합니다. 종료 신호가 처리될
    /// 때까지 반환하지 않습니다.
    pub async fn run(self) -> Result<()> {
        let monitor = HealthMonitor::new(
            self.registry.clone(),
            self.settings.balancer.health_interval()?,
            self.settings.balancer.probe_timeout()?,
        )?;
        tokio::spawn(monitor.run());

        let listener = ServerListener::new(&self.settings).await?;
        let grace = self.settings.balancer.shutdown_grace()?;

        info!(
            port = self.settings.server.https_port,
            backends = self.registry.len(),
            "로드 밸런서 실행"
        );

        listener.run(self.handler, grace).await
    }
}
