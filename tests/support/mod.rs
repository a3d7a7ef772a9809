#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// 테스트용 로컬 백엔드 서버
pub struct TestBackend {
    pub url: String,
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestBackend {
    /// 리스너를 내려 이후 연결이 거부되게 한다
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_backend(status: StatusCode) -> TestBackend {
    spawn_backend_with_delay(status, Duration::ZERO).await
}

/// 지정된 상태 코드로 응답하는 백엔드를 띄운다.
///
/// 응답 바디에는 메서드, 경로+쿼리, X-Forwarded-For 값이 들어가므로
/// 전달 경로 검증에 그대로 쓸 수 있다.
pub async fn spawn_backend_with_delay(status: StatusCode, delay: Duration) -> TestBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req: Request<Incoming>| async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }

                    let xff = req
                        .headers()
                        .get("x-forwarded-for")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    let path_and_query = req
                        .uri()
                        .path_and_query()
                        .map(|pq| pq.as_str().to_string())
                        .unwrap_or_else(|| "/".to_string());
                    let body = format!("{} {} xff={}", req.method(), path_and_query, xff);

                    Ok::<_, Infallible>(
                        Response::builder()
                            .status(status)
                            .body(Full::new(Bytes::from(body)))
                            .unwrap(),
                    )
                });

                let _ = http1::Builder::new().serve_connection(io, service).await;
            });
        }
    });

    TestBackend {
        url: format!("http://{}", addr),
        addr,
        handle,
    }
}
