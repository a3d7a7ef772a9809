use std::sync::Arc;
use std::time::Duration;
use hyper_util::rt::TokioIo;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::settings::Settings;
use crate::tls::TlsConfig;
use super::handler::RequestHandler;
use super::{Error, Result};

/// TLS 전용 인바운드 리스너입니다. 평문 HTTP 인바운드는 지원하지 않습니다.
pub struct ServerListener {
    tls: TlsConfig,
}

impl ServerListener {
    pub async fn new(settings: &Settings) -> Result<Self> {
        // 설정 검증이 인증서/키 존재를 보장한 뒤에만 도달한다
        let cert_path = settings.tls.cert_path.as_ref().ok_or_else(|| {
            Error::Settings(crate::settings::SettingsError::EnvVarMissing {
                var_name: "PROXY_TLS_CERT".to_string(),
            })
        })?;
        let key_path = settings.tls.key_path.as_ref().ok_or_else(|| {
            Error::Settings(crate::settings::SettingsError::EnvVarMissing {
                var_name: "PROXY_TLS_KEY".to_string(),
            })
        })?;

        let tls = TlsConfig::new(cert_path, key_path, settings.server.https_port).await?;
        Ok(Self { tls })
    }

    /// 종료 신호가 올 때까지 연결을 수락하고, 신호 이후에는 진행 중인
    /// 연결을 유예 시간 내에서 기다립니다. 유예 시간을 초과하면 치명적
    /// 에러로 처리합니다.
    pub async fn run(self, handler: Arc<RequestHandler>, shutdown_grace: Duration) -> Result<()> {
        let mut connections: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                result = self.tls.listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            let handler = handler.clone();
                            let acceptor = self.tls.acceptor.clone();

                            connections.spawn(async move {
                                match acceptor.accept(stream).await {
                                    Ok(tls_stream) => {
                                        let io = TokioIo::new(tls_stream);
                                        if let Err(err) = handler.handle_connection(io, peer).await {
                                            error!(error = %err, client = %peer, "HTTPS 연결 처리 실패");
                                        }
                                    }
                                    Err(e) => {
                                        error!(error = %e, client = %peer, "TLS 핸드쉐이크 실패");
                                    }
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "HTTPS 연결 수락 실패");
                        }
                    }
                }

                // 끝난 연결 태스크 정리
                Some(_) = connections.join_next(), if !connections.is_empty() => {}

                _ = tokio::signal::ctrl_c() => {
                    info!("종료 신호 수신, 새 연결 수락 중단");
                    break;
                }
            }
        }

        self.drain(connections, shutdown_grace).await
    }

    async fn drain(&self, mut connections: JoinSet<()>, grace: Duration) -> Result<()> {
        let remaining = connections.len();
        if remaining > 0 {
            info!(connections = remaining, grace = ?grace, "진행 중인 연결 대기");
        }

        let drain_all = async {
            while connections.join_next().await.is_some() {}
        };

        match tokio::time::timeout(grace, drain_all).await {
            Ok(()) => {
                info!("모든 연결 종료 완료");
                Ok(())
            }
            Err(_) => Err(Error::ShutdownTimeout { grace }),
        }
    }
}
