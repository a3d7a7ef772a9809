use std::fs;
use std::path::Path;
use std::sync::Arc;
use serde::Deserialize;
use tracing::info;

use super::backend::Backend;
use super::error::BackendLoadError;

/// backends.json의 단일 레코드
#[derive(Debug, Deserialize)]
struct BackendRecord {
    url: String,
    /// 사람이 읽을 수 있는 지연 시간 문자열 (예: "120ms")
    latency: String,
    active: bool,
    weight: u32,
}

/// 프로세스 수명 동안 고정된 백엔드 목록입니다.
///
/// 구조는 로드 이후 불변이며, 각 백엔드의 active/latency 필드 값만
/// 변경됩니다.
#[derive(Debug)]
pub struct BackendRegistry {
    backends: Vec<Arc<Backend>>,
}

impl BackendRegistry {
    /// 정적 정의 파일에서 레지스트리를 생성합니다.
    ///
    /// 파일을 읽을 수 없거나, JSON이 잘못되었거나, 지연 시간 문자열을
    /// 파싱할 수 없으면 실패합니다. 시작 시점의 치명적 에러입니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BackendLoadError> {
        let content = fs::read_to_string(&path).map_err(|e| BackendLoadError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        let records: Vec<BackendRecord> = serde_json::from_str(&content)
            .map_err(|e| BackendLoadError::ParseError { source: e })?;

        let registry = Self::from_records(records)?;
        info!(count = registry.len(), "백엔드 레지스트리 로드 완료");
        Ok(registry)
    }

    fn from_records(records: Vec<BackendRecord>) -> Result<Self, BackendLoadError> {
        let mut backends = Vec::with_capacity(records.len());

        for record in records {
            if record.weight == 0 {
                return Err(BackendLoadError::InvalidWeight {
                    url: record.url,
                    weight: record.weight,
                });
            }

            let latency = humantime::parse_duration(record.latency.trim()).map_err(|e| {
                BackendLoadError::InvalidLatency {
                    url: record.url.clone(),
                    value: record.latency.clone(),
                    reason: e.to_string(),
                }
            })?;

            backends.push(Arc::new(Backend::new(
                record.url,
                record.weight,
                record.active,
                latency,
            )));
        }

        Ok(Self { backends })
    }

    /// 이미 생성된 백엔드 목록으로 레지스트리를 구성합니다.
    pub fn from_backends(backends: Vec<Backend>) -> Self {
        Self {
            backends: backends.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Backend>> {
        self.backends.iter()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_from_records() {
        let records = vec![
            BackendRecord {
                url: "http://10.0.0.1:8080".to_string(),
                latency: "120ms".to_string(),
                active: true,
                weight: 3,
            },
            BackendRecord {
                url: "http://10.0.0.2:8080".to_string(),
                latency: "1s".to_string(),
                active: false,
                weight: 1,
            },
        ];

        let registry = BackendRegistry::from_records(records).unwrap();
        assert_eq!(registry.len(), 2);

        let backends: Vec<_> = registry.iter().collect();
        assert_eq!(backends[0].url, "http://10.0.0.1:8080");
        assert_eq!(backends[0].weight, 3);
        assert!(backends[0].is_active());
        assert_eq!(backends[0].latency(), Duration::from_millis(120));

        assert!(!backends[1].is_active());
        assert_eq!(backends[1].latency(), Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_latency_rejected() {
        let records = vec![BackendRecord {
            url: "http://10.0.0.1:8080".to_string(),
            latency: "not-a-duration".to_string(),
            active: true,
            weight: 1,
        }];

        let result = BackendRegistry::from_records(records);
        assert!(matches!(result, Err(BackendLoadError::InvalidLatency { .. })));
    }

    #[test]
    fn test_zero_weight_rejected() {
        let records = vec![BackendRecord {
            url: "http://10.0.0.1:8080".to_string(),
            latency: "10ms".to_string(),
            active: true,
            weight: 0,
        }];

        let result = BackendRegistry::from_records(records);
        assert!(matches!(result, Err(BackendLoadError::InvalidWeight { .. })));
    }
}
