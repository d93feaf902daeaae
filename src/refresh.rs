//! 一括更新モジュール

use crate::client::{Fetcher, TrackingClient};
use crate::history::History;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 履歴の一括更新
pub struct RefreshEngine<'a, F: Fetcher> {
    client: &'a TrackingClient<F>,
    delay: Duration,
}

impl<'a, F: Fetcher> RefreshEngine<'a, F> {
    /// 新しいRefreshEngineを作成
    ///
    /// `delay`は連続する照会の間に挟む待機時間。
    pub fn new(client: &'a TrackingClient<F>, delay: Duration) -> Self {
        Self { client, delay }
    }

    /// 未完了の追跡レコードを再照会し、新しい履歴を返す
    ///
    /// - 終端状態のレコードは照会せずに取り除く
    /// - 再照会で該当なしになったレコードは取り除く
    /// - 通信・解析エラーの場合は保存済みのレコードをそのまま残す
    ///
    /// ラベルは常に保存済みのレコードから引き継ぐ。
    pub fn refresh(&self, history: History) -> History {
        let mut refreshed = History::new();
        let mut dropped = 0usize;
        let mut queried = false;

        for (code, stored) in history {
            if stored.is_terminal() {
                debug!("終端状態のため履歴から削除: {} (state={})", code, stored.state);
                dropped += 1;
                continue;
            }

            if queried {
                thread::sleep(self.delay);
            }
            queried = true;

            let carrier = Some(stored.com.as_str()).filter(|c| !c.is_empty());
            match self.client.query(&code, carrier) {
                Ok(Some(mut fresh)) => {
                    fresh.label = stored.label;
                    refreshed.insert(code, fresh);
                }
                Ok(None) => {
                    warn!("追跡情報が見つからないため履歴から削除: {}", code);
                    dropped += 1;
                }
                Err(e) => {
                    warn!("更新失敗のため前回の状態を保持: {}: {}", code, e);
                    refreshed.insert(code, stored);
                }
            }
        }

        info!("更新完了: {}件保持, {}件削除", refreshed.len(), dropped);
        refreshed
    }
}
