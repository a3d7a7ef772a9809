use reverse_proxy_balancer::settings::Settings;
use serial_test::serial;
use std::time::Duration;

// 테스트 전후 환경변수 초기화를 위한 헬퍼 함수
fn cleanup_env() {
    std::env::remove_var("PROXY_CONFIG_FILE");
    std::env::remove_var("PROXY_HTTPS_PORT");
    std::env::remove_var("PROXY_TLS_CERT");
    std::env::remove_var("PROXY_TLS_KEY");
    std::env::remove_var("PROXY_LOG_LEVEL");
    std::env::remove_var("PROXY_LOG_FORMAT");
    std::env::remove_var("PROXY_LOG_DIR");
    std::env::remove_var("PROXY_BACKENDS_FILE");
    std::env::remove_var("PROXY_HEALTH_INTERVAL");
    std::env::remove_var("PROXY_PROBE_TIMEOUT");
    std::env::remove_var("PROXY_FORWARD_TIMEOUT");
    std::env::remove_var("PROXY_SESSION_TIMEOUT");
    std::env::remove_var("PROXY_SHUTDOWN_GRACE");
}

// 검증을 통과할 수 있게 더미 인증서/키 파일을 만들어 환경변수로 지정한다
fn setup_tls_material() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let cert_path = dir.path().join("cert.pem");
    let key_path = dir.path().join("key.pem");
    std::fs::write(&cert_path, b"test cert").unwrap();
    std::fs::write(&key_path, b"test key").unwrap();
    std::env::set_var("PROXY_TLS_CERT", &cert_path);
    std::env::set_var("PROXY_TLS_KEY", &key_path);
    dir
}

#[tokio::test]
#[serial]
async fn test_settings_defaults() {
    cleanup_env();
    let _tls_dir = setup_tls_material();

    let settings = Settings::from_env().await.unwrap();

    assert_eq!(settings.server.https_port, 443);
    assert_eq!(settings.logging.level, tracing::Level::INFO);
    assert_eq!(settings.balancer.backends_file, "backends.json");
    assert_eq!(
        settings.balancer.health_interval().unwrap(),
        Duration::from_secs(10)
    );
    assert_eq!(
        settings.balancer.session_timeout().unwrap(),
        Duration::from_secs(300)
    );
    assert_eq!(
        settings.balancer.shutdown_grace().unwrap(),
        Duration::from_secs(10)
    );

    cleanup_env();
}

#[tokio::test]
#[serial]
async fn test_missing_tls_material_is_fatal() {
    cleanup_env();

    let result = Settings::from_env().await;
    assert!(result.is_err());

    cleanup_env();
}

#[tokio::test]
#[serial]
async fn test_invalid_duration_env_is_fatal() {
    cleanup_env();
    let _tls_dir = setup_tls_material();

    std::env::set_var("PROXY_SESSION_TIMEOUT", "five minutes");
    let result = Settings::from_env().await;
    assert!(result.is_err());

    cleanup_env();
}

#[tokio::test]
#[serial]
async fn test_invalid_log_level_is_fatal() {
    cleanup_env();
    let _tls_dir = setup_tls_material();

    std::env::set_var("PROXY_LOG_LEVEL", "verbose");
    let result = Settings::from_env().await;
    assert!(result.is_err());

    cleanup_env();
}

#[tokio::test]
#[serial]
async fn test_settings_from_toml() {
    cleanup_env();
    let tls_dir = setup_tls_material();
    let cert_path = tls_dir.path().join("cert.pem");
    let key_path = tls_dir.path().join("key.pem");

    let toml_content = format!(
        r#"
        [server]
        https_port = 8443

        [tls]
        cert_path = "{}"
        key_path = "{}"

        [logging]
        format = "json"
        level = "debug"

        [balancer]
        backends_file = "pool.json"
        health_check_interval = "3s"
        session_timeout = "90s"
        "#,
        cert_path.display(),
        key_path.display(),
    );

    let config_path = tls_dir.path().join("proxy.toml");
    std::fs::write(&config_path, toml_content).unwrap();

    let settings = Settings::from_toml_file(&config_path).await.unwrap();

    assert_eq!(settings.server.https_port, 8443);
    assert_eq!(settings.logging.level, tracing::Level::DEBUG);
    assert_eq!(settings.balancer.backends_file, "pool.json");
    assert_eq!(
        settings.balancer.health_interval().unwrap(),
        Duration::from_secs(3)
    );
    assert_eq!(
        settings.balancer.session_timeout().unwrap(),
        Duration::from_secs(90)
    );
    // 지정하지 않은 값은 기본값 유지
    assert_eq!(
        settings.balancer.probe_timeout().unwrap(),
        Duration::from_secs(5)
    );

    cleanup_env();
}
