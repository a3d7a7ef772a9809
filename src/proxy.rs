use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use hyper::{Request, Response, StatusCode};
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_LENGTH, TRANSFER_ENCODING};
use http_body_util::{BodyExt, Full};
use url::Url;
use uuid::Uuid;
use tracing::info;

use crate::balancer::Backend;
use crate::logging::{log_request, RequestLog};

/// 프록시 요청을 위한 불변 설정 구조체
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    client: reqwest::Client,
}

impl ProxyConfig {
    pub fn new(forward_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(forward_timeout)
            .build()?;
        Ok(Self { client })
    }
}

/// 인바운드 요청을 선택된 백엔드로 전달하고 응답을 돌려줍니다.
///
/// 메서드, 경로, 쿼리, 바디는 보존하고 스킴과 호스트만 백엔드 오리진으로
/// 덮어씁니다. 전달 실패는 502로 변환될 뿐 백엔드 상태에는 반영하지
/// 않습니다.
pub async fn proxy_request<B>(
    config: &ProxyConfig,
    backend: &Arc<Backend>,
    client_addr: SocketAddr,
    req: Request<B>,
) -> Response<Full<Bytes>>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let request_id = Uuid::new_v4().to_string();
    let start_time = Instant::now();
    let mut log = RequestLog::new(request_id);
    let client = client_addr.to_string();
    log.with_request(&req, &client);
    log.with_backend(&backend.url);

    backend.mark_request();
    info!(backend = %backend.url, "Proxying request to backend");

    let response = match build_target_url(&backend.url, req.uri()) {
        Ok(target) => {
            let (parts, body) = req.into_parts();
            match body.collect().await {
                Ok(collected) => {
                    let body_bytes = collected.to_bytes();
                    match send_upstream(config, target, parts, body_bytes, &client).await {
                        Ok(response) => {
                            log.with_response(response.status());
                            response
                        }
                        Err(e) => {
                            log.with_error(&e);
                            build_error_response(
                                StatusCode::BAD_GATEWAY,
                                format!("Backend request failed: {}", e),
                            )
                        }
                    }
                }
                Err(e) => {
                    log.with_error(&e);
                    build_error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read request body: {}", e),
                    )
                }
            }
        }
        Err(e) => {
            log.with_error(&e);
            build_error_response(
                StatusCode::BAD_GATEWAY,
                format!("Invalid backend URL: {}", e),
            )
        }
    };

    log.duration_ms = start_time.elapsed().as_millis() as u64;
    log_request(&log);

    response
}

/// 백엔드 오리진과 인바운드 경로/쿼리로 전달 대상 URL을 만듭니다.
///
/// 백엔드가 선언한 스킴이 HTTP 계열이 아니면 https로 강제합니다.
fn build_target_url(backend_url: &str, uri: &hyper::Uri) -> Result<Url, url::ParseError> {
    let declared = Url::parse(backend_url)?;
    let scheme = declared.scheme().to_string();

    let mut target = if scheme == "http" || scheme == "https" {
        declared
    } else {
        let secured = format!("https{}", &backend_url[scheme.len()..]);
        Url::parse(&secured)?
    };
    target.set_path(uri.path());
    target.set_query(uri.query());
    Ok(target)
}

async fn send_upstream(
    config: &ProxyConfig,
    target: Url,
    parts: hyper::http::request::Parts,
    body: Bytes,
    client_addr: &str,
) -> Result<Response<Full<Bytes>>, reqwest::Error> {
    let mut headers = parts.headers;
    // 바디를 한 번 모아서 다시 보내므로 전송 관련 헤더는 재계산에 맡긴다
    headers.remove(CONTENT_LENGTH);
    headers.remove(TRANSFER_ENCODING);
    if let Ok(value) = HeaderValue::from_str(client_addr) {
        headers.insert(HeaderName::from_static("x-forwarded-for"), value);
    }

    let upstream = config
        .client
        .request(parts.method, target)
        .headers(headers)
        .body(body)
        .send()
        .await?;

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    response_headers.remove(CONTENT_LENGTH);
    response_headers.remove(TRANSFER_ENCODING);
    let bytes = upstream.bytes().await?;

    let mut builder = Response::builder().status(status);
    if let Some(h) = builder.headers_mut() {
        *h = response_headers;
    }

    Ok(builder.body(Full::new(bytes)).unwrap_or_else(|e| {
        tracing::error!(error = %e, "응답 생성 실패");
        build_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error".to_string(),
        )
    }))
}

pub fn build_error_response(status: StatusCode, message: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::from(message)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal Server Error"))))
}
