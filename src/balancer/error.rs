use std::fmt;

/// 백엔드 정의 파일 로드 과정에서 발생하는 에러입니다.
#[derive(Debug)]
pub enum BackendLoadError {
    /// 파일을 읽을 수 없음
    FileError {
        path: String,
        error: std::io::Error,
    },
    /// JSON 파싱 실패
    ParseError {
        source: serde_json::Error,
    },
    /// 지연 시간 문자열 파싱 실패
    InvalidLatency {
        url: String,
        value: String,
        reason: String,
    },
    /// 가중치는 1 이상이어야 함
    InvalidWeight {
        url: String,
        weight: u32,
    },
}

impl fmt::Display for BackendLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileError { path, error } =>
                write!(f, "백엔드 파일 {} 읽기 실패: {}", path, error),
            Self::ParseError { source } =>
                write!(f, "백엔드 정의 파싱 실패: {}", source),
            Self::InvalidLatency { url, value, reason } =>
                write!(f, "백엔드 {}의 지연 시간 {} 파싱 실패: {}", url, value, reason),
            Self::InvalidWeight { url, weight } =>
                write!(f, "백엔드 {}의 가중치가 유효하지 않음: {} (1 이상이어야 함)", url, weight),
        }
    }
}

impl std::error::Error for BackendLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileError { error, .. } => Some(error),
            Self::ParseError { source } => Some(source),
            _ => None,
        }
    }
}
