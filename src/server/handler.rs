use std::net::SocketAddr;
use std::sync::Arc;
use hyper::{Request, Response, StatusCode};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use http_body_util::Full;
use tracing::{debug, error, info};

use crate::balancer::{
    recheck_client_latency, BackendRegistry, LoadBalancer, SessionStore,
};
use crate::proxy::{self, ProxyConfig};

const UNAVAILABLE_MESSAGE: &str =
    "All servers are currently unavailable. Please try again later.";

pub struct RequestHandler {
    balancer: Arc<LoadBalancer>,
    registry: Arc<BackendRegistry>,
    sessions: Arc<SessionStore>,
    proxy_config: ProxyConfig,
    probe_client: reqwest::Client,
}

impl RequestHandler {
    pub fn new(
        balancer: Arc<LoadBalancer>,
        registry: Arc<BackendRegistry>,
        sessions: Arc<SessionStore>,
        proxy_config: ProxyConfig,
        probe_client: reqwest::Client,
    ) -> Self {
        Self {
            balancer,
            registry,
            sessions,
            proxy_config,
            probe_client,
        }
    }

    pub async fn handle_request<B>(
        &self,
        req: Request<B>,
        peer: SocketAddr,
    ) -> Result<Response<Full<Bytes>>, std::convert::Infallible>
    where
        B: hyper::body::Body,
        B::Error: std::fmt::Display,
    {
        let client_ip = peer.ip().to_string();

        // 1. 백엔드 선택
        let backend = match self.balancer.select(&client_ip).await {
            Some(backend) => backend,
            None => {
                error!(client = %peer, "활성 백엔드 없음");
                return Ok(unavailable_response());
            }
        };

        // 2. 프록시 전달
        let response = proxy::proxy_request(&self.proxy_config, &backend, peer, req).await;

        // 3. 응답 이후 지연 시간 재측정 태스크
        let registry = self.registry.clone();
        let sessions = self.sessions.clone();
        let probe_client = self.probe_client.clone();
        tokio::spawn(async move {
            debug!(client_ip = %client_ip, "지연 시간 재측정 시작");
            recheck_client_latency(registry, sessions, probe_client, client_ip).await;
        });

        Ok(response)
    }

    pub async fn handle_connection<I>(&self, io: I, peer: SocketAddr) -> Result<(), hyper::Error>
    where
        I: hyper::rt::Read + hyper::rt::Write + Send + Unpin + 'static,
    {
        info!(client = %peer, "Accepted connection");
        http1::Builder::new()
            .serve_connection(
                io,
                service_fn(move |req| self.handle_request(req, peer)),
            )
            .await
    }
}

fn unavailable_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::SERVICE_UNAVAILABLE)
        .body(Full::new(Bytes::from(UNAVAILABLE_MESSAGE)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from(UNAVAILABLE_MESSAGE))))
}
