//! エラー型定義モジュール

use std::io;
use thiserror::Error;

/// 設定エラー
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IOエラー: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML解析エラー: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("ディレクトリ作成エラー: {0}")]
    DirectoryCreationError(io::Error),

    #[error("無効な設定値: {0}")]
    InvalidValue(String),
}

/// 追跡APIエラー
///
/// 該当なし（どの運送会社でも結果が得られない）はエラーではなく`None`で表す。
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("通信エラー: {0}")]
    NetworkError(String),

    #[error("レスポンス解析エラー: {0}")]
    ParseError(String),
}

impl From<serde_json::Error> for TrackingError {
    fn from(err: serde_json::Error) -> Self {
        TrackingError::ParseError(err.to_string())
    }
}

/// 履歴ファイルエラー
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("IOエラー: {0}")]
    IoError(#[from] io::Error),

    #[error("JSONシリアライズエラー: {0}")]
    SerializeError(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue("timeout_seconds".to_string());
        assert!(err.to_string().contains("無効な設定値"));
    }

    #[test]
    fn test_tracking_error_display() {
        let err = TrackingError::NetworkError("connection refused".to_string());
        assert!(err.to_string().contains("通信エラー"));
    }

    #[test]
    fn test_tracking_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = TrackingError::from(json_err);
        assert!(matches!(err, TrackingError::ParseError(_)));
    }

    #[test]
    fn test_history_error_display() {
        let err = HistoryError::IoError(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "permission denied",
        ));
        assert!(err.to_string().contains("IOエラー"));
    }
}
