//! 追跡APIクライアントモジュール
//!
//! 追跡番号から運送会社の候補を推定し、候補を順に詳細エンドポイントへ照会する。
//! 最初に`message == "ok"`を返した候補を正しい運送会社とみなす。

use crate::error::TrackingError;
use crate::record::TrackingRecord;
use serde::Deserialize;
use serde_json::Value;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP GETの抽象化（テストでは偽実装に差し替える）
pub trait Fetcher {
    /// URLを取得しレスポンス本文を返す
    fn get(&self, url: &str, referer: Option<&str>) -> Result<String, TrackingError>;
}

impl<T: Fetcher> Fetcher for &T {
    fn get(&self, url: &str, referer: Option<&str>) -> Result<String, TrackingError> {
        (**self).get(url, referer)
    }
}

/// ureqによるFetcher実装
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent }
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &str, referer: Option<&str>) -> Result<String, TrackingError> {
        debug!("GET {}", url);

        let mut request = self.agent.get(url);
        if let Some(referer) = referer {
            request = request.header("Referer", referer);
        }

        request
            .call()
            .map_err(|e| TrackingError::NetworkError(e.to_string()))?
            .body_mut()
            .read_to_string()
            .map_err(|e| TrackingError::NetworkError(e.to_string()))
    }
}

/// 推定エンドポイントが返す候補
#[derive(Debug, Deserialize)]
struct CarrierCandidate {
    #[serde(rename = "comCode")]
    com_code: String,
}

/// 追跡APIクライアント
pub struct TrackingClient<F: Fetcher> {
    fetcher: F,
    guess_url: String,
    query_url: String,
    quiet: bool,
}

impl<F: Fetcher> TrackingClient<F> {
    /// 新しいTrackingClientを作成
    pub fn new(fetcher: F, guess_url: impl Into<String>, query_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            guess_url: guess_url.into(),
            query_url: query_url.into(),
            quiet: false,
        }
    }

    /// 進捗表示を抑制する
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// 運送会社の候補を推定
    ///
    /// 候補は推定エンドポイントが返した順序のまま返す。
    pub fn resolve_carrier(&self, code: &str) -> Result<Vec<String>, TrackingError> {
        let body = self.fetcher.get(&self.guess_url_for(code), None)?;
        let candidates: Vec<CarrierCandidate> = serde_json::from_str(&body)?;

        Ok(candidates.into_iter().map(|c| c.com_code).collect())
    }

    /// 追跡情報を照会
    ///
    /// `carrier`が指定された場合は推定を行わない。どの候補でも結果が得られなければ`None`。
    pub fn query(
        &self,
        code: &str,
        carrier: Option<&str>,
    ) -> Result<Option<TrackingRecord>, TrackingError> {
        let candidates = match carrier {
            Some(carrier) => vec![carrier.to_string()],
            None => {
                let candidates = self.resolve_carrier(code)?;
                self.narrate(&format!("運送会社の候補: {}", candidates.join(", ")));
                candidates
            }
        };

        let referer = self.guess_url_for(code);

        for carrier in &candidates {
            self.narrate_inline(&format!("{} を照会中... ", carrier));

            let body = self.fetcher.get(&self.detail_url_for(carrier, code), Some(&referer))?;
            let response: Value = serde_json::from_str(&body)?;

            if response.get("message").and_then(Value::as_str) == Some("ok") {
                let mut record: TrackingRecord = serde_json::from_value(response)?;
                if record.nu != code {
                    warn!("照会結果の追跡番号が一致しません: {} != {}", record.nu, code);
                    record.nu = code.to_string();
                }
                if record.data.is_empty() {
                    return Err(TrackingError::ParseError(format!(
                        "追跡イベントが空です: {} ({})",
                        code, carrier
                    )));
                }
                self.narrate("完了");
                return Ok(Some(record));
            }

            let message = response.get("message").cloned().unwrap_or_default();
            debug!("照会失敗 {} ({}): {}", code, carrier, message);
            self.narrate("失敗");
        }

        self.narrate("結果が見つかりませんでした");
        Ok(None)
    }

    /// 推定エンドポイントのURL（詳細照会のRefererにも使う）
    fn guess_url_for(&self, code: &str) -> String {
        format!("{}?num={}", self.guess_url, urlencoding::encode(code))
    }

    /// 詳細エンドポイントのURL
    ///
    /// `temp`はキャッシュ回避用の乱数。
    fn detail_url_for(&self, carrier: &str, code: &str) -> String {
        format!(
            "{}?type={}&postid={}&id=1&valicode=&temp={}",
            self.query_url,
            urlencoding::encode(carrier),
            urlencoding::encode(code),
            rand::random::<f64>()
        )
    }

    fn narrate(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    fn narrate_inline(&self, message: &str) {
        if !self.quiet {
            print!("{}", message);
            let _ = io::stdout().flush();
        }
    }
}
