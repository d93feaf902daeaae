//! 設定モジュール

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// 運送会社推定エンドポイント
pub const DEFAULT_GUESS_URL: &str = "http://m.kuaidi100.com/autonumber/auto";
/// 追跡詳細エンドポイント
pub const DEFAULT_QUERY_URL: &str = "http://m.kuaidi100.com/query";

/// アプリケーション設定
#[derive(Debug, Clone)]
pub struct Config {
    /// 履歴ファイルパス
    pub history_path: PathBuf,
    /// 運送会社推定エンドポイントURL
    pub guess_url: String,
    /// 追跡詳細エンドポイントURL
    pub query_url: String,
    /// 一括更新時のリクエスト間隔（ミリ秒）
    pub request_delay_ms: u64,
    /// HTTPタイムアウト（秒）
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            history_path: home.join(".kd100"),
            guess_url: DEFAULT_GUESS_URL.to_string(),
            query_url: DEFAULT_QUERY_URL.to_string(),
            request_delay_ms: 1000,
            timeout_seconds: 15,
        }
    }
}

/// TOML設定ファイル用構造体
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    history_path: Option<String>,
    guess_url: Option<String>,
    query_url: Option<String>,
    request_delay_ms: Option<u64>,
    timeout_seconds: Option<u64>,
}

/// CLI引数
#[derive(Debug, Default)]
pub struct CliArgs {
    pub history: Option<PathBuf>,
}

impl Config {
    /// 設定を読み込む
    ///
    /// 優先順位: CLI引数 > 設定ファイル > デフォルト値
    pub fn load(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let config_path = config_file_path();
        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let file_config: FileConfig = toml::from_str(&content)?;
            config.merge_file_config(&file_config);
        }

        config.merge_cli_args(cli_args);
        config.validate()?;
        config.ensure_directories()?;

        Ok(config)
    }

    /// リクエスト間隔
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// HTTPタイムアウト
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// ファイル設定をマージ
    fn merge_file_config(&mut self, file_config: &FileConfig) {
        if let Some(ref path) = file_config.history_path {
            self.history_path = PathBuf::from(path);
        }
        if let Some(ref url) = file_config.guess_url {
            self.guess_url = url.clone();
        }
        if let Some(ref url) = file_config.query_url {
            self.query_url = url.clone();
        }
        if let Some(delay) = file_config.request_delay_ms {
            self.request_delay_ms = delay;
        }
        if let Some(timeout) = file_config.timeout_seconds {
            self.timeout_seconds = timeout;
        }
    }

    /// CLI引数をマージ
    fn merge_cli_args(&mut self, cli_args: &CliArgs) {
        if let Some(ref path) = cli_args.history {
            self.history_path = path.clone();
        }
    }

    /// 設定値をバリデート
    fn validate(&self) -> Result<(), ConfigError> {
        for url in [&self.guess_url, &self.query_url] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "endpoint must be an http(s) URL: {}",
                    url
                )));
            }
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 履歴ファイルの親ディレクトリを作成
    fn ensure_directories(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.history_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(ConfigError::DirectoryCreationError)?;
            }
        }
        Ok(())
    }
}

/// 設定ファイルのパスを取得
fn config_file_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".kd100.toml")
}
