use reverse_proxy_balancer::logging;
use reverse_proxy_balancer::server::ServerManager;
use reverse_proxy_balancer::settings::Settings;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let settings = match Settings::load().await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("설정 로드 실패: {}", e);
            std::process::exit(1);
        }
    };

    // 파일 로깅이 켜진 경우 가드를 프로세스 수명 동안 유지해야 한다
    let _guard = logging::init_logging(&settings.logging);

    let manager = match ServerManager::new(settings) {
        Ok(manager) => manager,
        Err(e) => {
            error!(error = %e, "초기화 실패");
            std::process::exit(1);
        }
    };

    if let Err(e) = manager.run().await {
        error!(error = %e, "서버 비정상 종료");
        std::process::exit(1);
    }

    info!("서버가 정상적으로 종료되었습니다");
}
