//! 追跡レコードモジュール
//!
//! フィールド名は詳細エンドポイントのJSONに合わせている（`nu`, `com`, `ischeck` など）。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 配達状態コード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentState {
    InTransit,
    Collected,
    Problem,
    Signed,
    ReturnedSigned,
    OutForDelivery,
    Returned,
}

impl ShipmentState {
    /// APIの状態コードから変換（未知のコードはNone）
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(Self::InTransit),
            "1" => Some(Self::Collected),
            "2" => Some(Self::Problem),
            "3" => Some(Self::Signed),
            "4" => Some(Self::ReturnedSigned),
            "5" => Some(Self::OutForDelivery),
            "6" => Some(Self::Returned),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InTransit => "0",
            Self::Collected => "1",
            Self::Problem => "2",
            Self::Signed => "3",
            Self::ReturnedSigned => "4",
            Self::OutForDelivery => "5",
            Self::Returned => "6",
        }
    }

    /// 表示名
    pub fn name(&self) -> &'static str {
        match self {
            Self::InTransit => "輸送中",
            Self::Collected => "集荷済み",
            Self::Problem => "問題あり",
            Self::Signed => "受取済み",
            Self::ReturnedSigned => "返送受取済み",
            Self::OutForDelivery => "配達中",
            Self::Returned => "返送中",
        }
    }

    /// これ以上状態が変わらない終端状態か
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Signed | Self::ReturnedSigned)
    }
}

/// 配達完了フラグ（`ischeck`）
///
/// 取得元によって文字列・数値・真偽値のいずれでも届くため、読み込み時は全て受け付け、
/// 書き出しは常に`"0"`/`"1"`に揃える。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawCheckFlag", into = "String")]
pub enum CheckFlag {
    #[default]
    Unchecked,
    Checked,
}

impl CheckFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchecked => "0",
            Self::Checked => "1",
        }
    }
}

impl fmt::Display for CheckFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CheckFlag> for String {
    fn from(flag: CheckFlag) -> Self {
        flag.as_str().to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCheckFlag {
    Text(String),
    Number(i64),
    Bool(bool),
}

impl TryFrom<RawCheckFlag> for CheckFlag {
    type Error = String;

    fn try_from(raw: RawCheckFlag) -> Result<Self, Self::Error> {
        match raw {
            RawCheckFlag::Text(s) => match s.trim() {
                "" | "0" => Ok(Self::Unchecked),
                "1" => Ok(Self::Checked),
                other => Err(format!("unknown ischeck value: {}", other)),
            },
            RawCheckFlag::Number(0) => Ok(Self::Unchecked),
            RawCheckFlag::Number(1) => Ok(Self::Checked),
            RawCheckFlag::Number(n) => Err(format!("unknown ischeck value: {}", n)),
            RawCheckFlag::Bool(b) => Ok(if b { Self::Checked } else { Self::Unchecked }),
        }
    }
}

/// 追跡イベント（1行分の配送履歴）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub time: String,
    pub context: String,
    /// `ftime`, `location` など未使用のフィールド
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
impl TrackingEvent {
    pub fn new(time: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            context: context.into(),
            extra: Map::new(),
        }
    }
}

/// 追跡レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    /// 追跡番号
    pub nu: String,
    /// 運送会社コード
    pub com: String,
    /// ユーザーが付けたラベル
    #[serde(default, deserialize_with = "null_as_empty")]
    pub label: String,
    #[serde(default)]
    pub ischeck: CheckFlag,
    /// 状態コード（未知のコードもそのまま保持）
    #[serde(default)]
    pub state: String,
    /// 配送履歴（新しい順）
    #[serde(default)]
    pub data: Vec<TrackingEvent>,
    /// `condition`, `status`, `message` などAPIが返すその他のフィールド
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrackingRecord {
    pub fn shipment_state(&self) -> Option<ShipmentState> {
        ShipmentState::from_code(&self.state)
    }

    /// 終端状態（受取済み・返送受取済み）か
    pub fn is_terminal(&self) -> bool {
        self.shipment_state().is_some_and(|s| s.is_terminal())
    }

    /// 最新のイベント
    pub fn latest_event(&self) -> Option<&TrackingEvent> {
        self.data.first()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_codes() {
        for code in ["0", "1", "2", "3", "4", "5", "6"] {
            let state = ShipmentState::from_code(code).unwrap();
            assert_eq!(state.code(), code);
        }
        assert_eq!(ShipmentState::from_code("9"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(ShipmentState::Signed.is_terminal());
        assert!(ShipmentState::ReturnedSigned.is_terminal());
        assert!(!ShipmentState::InTransit.is_terminal());
        assert!(!ShipmentState::Returned.is_terminal());
        assert!(!ShipmentState::OutForDelivery.is_terminal());
    }

    #[test]
    fn test_check_flag_accepts_variants() {
        let cases = [
            (json!("0"), CheckFlag::Unchecked),
            (json!("1"), CheckFlag::Checked),
            (json!(1), CheckFlag::Checked),
            (json!(0), CheckFlag::Unchecked),
            (json!(true), CheckFlag::Checked),
            (json!(""), CheckFlag::Unchecked),
        ];
        for (value, expected) in cases {
            let flag: CheckFlag = serde_json::from_value(value).unwrap();
            assert_eq!(flag, expected);
        }
        assert!(serde_json::from_value::<CheckFlag>(json!("x")).is_err());
    }

    #[test]
    fn test_check_flag_serializes_as_string() {
        assert_eq!(serde_json::to_value(CheckFlag::Checked).unwrap(), json!("1"));
        assert_eq!(serde_json::to_value(CheckFlag::Unchecked).unwrap(), json!("0"));
    }

    #[test]
    fn test_record_from_api_payload() {
        let payload = json!({
            "message": "ok",
            "nu": "123",
            "com": "yuantong",
            "ischeck": "0",
            "condition": "00",
            "state": "0",
            "data": [
                {"time": "2024-12-30 10:00:00", "ftime": "2024-12-30 10:00:00", "context": "到着"},
                {"time": "2024-12-29 09:00:00", "context": "発送"}
            ]
        });

        let record: TrackingRecord = serde_json::from_value(payload).unwrap();
        assert_eq!(record.nu, "123");
        assert_eq!(record.com, "yuantong");
        assert_eq!(record.label, "");
        assert_eq!(record.shipment_state(), Some(ShipmentState::InTransit));
        assert_eq!(record.latest_event().unwrap().context, "到着");
        assert_eq!(record.extra["condition"], json!("00"));
        assert_eq!(record.data[0].extra["ftime"], json!("2024-12-30 10:00:00"));
    }

    #[test]
    fn test_null_label_becomes_empty() {
        let record: TrackingRecord = serde_json::from_value(json!({
            "nu": "1", "com": "sf", "label": null, "state": "3", "data": []
        }))
        .unwrap();
        assert_eq!(record.label, "");
        assert!(record.is_terminal());
        assert!(record.latest_event().is_none());
    }

    #[test]
    fn test_unknown_state_is_not_terminal() {
        let record: TrackingRecord = serde_json::from_value(json!({
            "nu": "1", "com": "sf", "state": "14"
        }))
        .unwrap();
        assert_eq!(record.state, "14");
        assert!(!record.is_terminal());
    }
}
