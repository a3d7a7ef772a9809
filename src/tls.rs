use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_rustls::rustls::{self, Certificate, PrivateKey};
use tokio_rustls::TlsAcceptor;
use tracing::{error, info};

type Error = Box<dyn std::error::Error + Send + Sync>;

/// 인바운드 HTTPS 리스너와 TLS 수락기입니다.
pub struct TlsConfig {
    pub acceptor: TlsAcceptor,
    pub listener: TcpListener,
}

impl TlsConfig {
    pub async fn new(cert_path: &Path, key_path: &Path, port: u16) -> Result<Self, Error> {
        let tls_config = Self::load_tls_config(cert_path, key_path)?;
        let acceptor = TlsAcceptor::from(Arc::new(tls_config));

        let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await
            .map_err(|e| {
                error!(error = %e, port = port, "HTTPS 포트 바인딩 실패");
                e
            })?;

        info!(port = port, "HTTPS 리스너 시작");
        Ok(Self { acceptor, listener })
    }

    fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<rustls::ServerConfig, Error> {
        let cert_file = File::open(cert_path)?;
        let mut cert_reader = BufReader::new(cert_file);
        let certs: Vec<Certificate> = rustls_pemfile::certs(&mut cert_reader)?
            .into_iter()
            .map(Certificate)
            .collect();

        if certs.is_empty() {
            return Err("인증서 파일에 인증서가 없음".into());
        }

        let key = Self::load_private_key(key_path)?;

        let config = rustls::ServerConfig::builder()
            .with_safe_defaults()
            .with_no_client_auth()
            .with_single_cert(certs, key)?;

        Ok(config)
    }

    // PKCS#8을 먼저 시도하고, 없으면 RSA 형식으로 다시 읽는다
    fn load_private_key(key_path: &Path) -> Result<PrivateKey, Error> {
        let key_file = File::open(key_path)?;
        let mut key_reader = BufReader::new(key_file);
        if let Some(key) = rustls_pemfile::pkcs8_private_keys(&mut key_reader)?.into_iter().next() {
            return Ok(PrivateKey(key));
        }

        let key_file = File::open(key_path)?;
        let mut key_reader = BufReader::new(key_file);
        rustls_pemfile::rsa_private_keys(&mut key_reader)?
            .into_iter()
            .next()
            .map(PrivateKey)
            .ok_or_else(|| "개인키를 찾을 수 없음".into())
    }
}
