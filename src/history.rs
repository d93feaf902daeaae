//! 履歴ストアモジュール
//!
//! 追跡番号 → 追跡レコードのマップを単一のJSONファイルに保存する。
//! 読み込みは失敗しても空の履歴として扱い、処理を止めない。

use crate::error::HistoryError;
use crate::record::TrackingRecord;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 追跡番号をキーとした履歴
pub type History = BTreeMap<String, TrackingRecord>;

/// 履歴ストア
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// 新しいHistoryStoreを作成
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 履歴を読み込む
    ///
    /// ファイルが無い・空・壊れている・オブジェクトでない場合は空の履歴を返す。
    /// レコードとして読めないエントリは個別に読み飛ばす。
    pub fn load(&self) -> History {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("履歴ファイルがありません: {}", self.path.display());
                return History::new();
            }
            Err(e) => {
                warn!("履歴ファイル読み込み失敗: {}", e);
                return History::new();
            }
        };

        if content.trim().is_empty() {
            return History::new();
        }

        let entries = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(entries)) => entries,
            Ok(_) => {
                warn!("履歴ファイルがJSONオブジェクトではありません: {}", self.path.display());
                return History::new();
            }
            Err(e) => {
                warn!("履歴ファイル解析失敗: {}", e);
                return History::new();
            }
        };

        let mut history = History::new();
        for (code, mut value) in entries {
            // キーが追跡番号なので、値に`nu`が無くてもキーから補う
            if let Some(fields) = value.as_object_mut() {
                fields.insert("nu".to_string(), Value::String(code.clone()));
            }
            match serde_json::from_value::<TrackingRecord>(value) {
                Ok(record) => {
                    history.insert(code, record);
                }
                Err(e) => warn!("履歴エントリを読み飛ばします ({}): {}", code, e),
            }
        }

        history
    }

    /// 履歴を保存（上書き）
    pub fn save(&self, history: &History) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(history)?;
        fs::write(&self.path, json)?;
        debug!("履歴を保存しました: {}件", history.len());

        Ok(())
    }
}

/// レコードを追跡番号で登録（既存があれば置き換え）
pub fn upsert(history: &mut History, record: TrackingRecord) {
    history.insert(record.nu.clone(), record);
}
