//! 表示モジュール

use crate::history::History;
use crate::record::TrackingRecord;

const RULE_WIDTH: usize = 75;

/// 追跡レコードの表示
pub struct Report {
    detail: bool,
}

impl Report {
    /// 新しいReportを作成
    ///
    /// `detail`がtrueなら配送履歴を表形式で、falseなら最新イベントを1行で表示する。
    pub fn new(detail: bool) -> Self {
        Self { detail }
    }

    /// レコードを文字列に整形
    pub fn render(&self, record: &TrackingRecord) -> String {
        if self.detail {
            format_detail(record)
        } else {
            format_summary(record)
        }
    }

    /// 単一のレコードを出力
    pub fn print_record(&self, record: &TrackingRecord) {
        println!("{}", self.render(record));
    }

    /// 更新後の履歴を出力
    pub fn print_history(&self, history: &History) {
        if history.is_empty() {
            println!("追跡中の荷物はありません");
            return;
        }

        println!("Latest status:");
        for record in history.values() {
            self.print_record(record);
        }
    }
}

/// 1行サマリー: 追跡番号 ラベル 最新時刻 最新内容
fn format_summary(record: &TrackingRecord) -> String {
    match record.latest_event() {
        Some(event) => format!(
            "{} {} {} {}",
            record.nu, record.label, event.time, event.context
        ),
        None => format!("{} {} (履歴なし)", record.nu, record.label),
    }
}

/// 配送履歴の表
fn format_detail(record: &TrackingRecord) -> String {
    let state = match record.shipment_state() {
        Some(s) => format!("{} ({})", s.name(), s.code()),
        None => record.state.clone(),
    };

    let mut res = format!(
        "追跡番号: {:<20} ラベル: {:<10} 運送会社: {:<15} 配達完了: {} 状態: {}\n",
        record.nu, record.label, record.com, record.ischeck, state
    );
    res += &"=".repeat(RULE_WIDTH);
    res += "\n";
    res += &format!("{:^21}|{:^44}\n", "時刻", "内容");

    if record.data.is_empty() {
        res += &"-".repeat(RULE_WIDTH);
        res += "\n(履歴なし)\n";
    }
    for event in &record.data {
        res += &"-".repeat(RULE_WIDTH);
        res += "\n";
        res += &format!("{:^21}| {}\n", event.time, event.context);
    }

    res += &"=".repeat(RULE_WIDTH);
    res += "\n";
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CheckFlag, TrackingEvent};
    use serde_json::Map;

    fn sample_record() -> TrackingRecord {
        TrackingRecord {
            nu: "123".to_string(),
            com: "yuantong".to_string(),
            label: "本".to_string(),
            ischeck: CheckFlag::Unchecked,
            state: "5".to_string(),
            data: vec![
                TrackingEvent::new("2024-12-30 10:00:00", "派送中"),
                TrackingEvent::new("2024-12-29 09:00:00", "已揽收"),
            ],
            extra: Map::new(),
        }
    }

    #[test]
    fn test_summary_uses_latest_event() {
        let report = Report::new(false);
        assert_eq!(
            report.render(&sample_record()),
            "123 本 2024-12-30 10:00:00 派送中"
        );
    }

    #[test]
    fn test_summary_without_events() {
        let mut record = sample_record();
        record.data.clear();
        assert_eq!(format_summary(&record), "123 本 (履歴なし)");
    }

    #[test]
    fn test_detail_lists_all_events() {
        let text = Report::new(true).render(&sample_record());

        assert!(text.contains("追跡番号: 123"));
        assert!(text.contains("運送会社: yuantong"));
        assert!(text.contains("状態: 配達中 (5)"));
        assert!(text.contains("| 派送中"));
        assert!(text.contains("| 已揽收"));
        assert_eq!(text.matches(&"-".repeat(RULE_WIDTH)).count(), 2);

        // 新しい順のまま表示
        let newest = text.find("派送中").unwrap();
        let oldest = text.find("已揽收").unwrap();
        assert!(newest < oldest);
    }

    #[test]
    fn test_detail_unknown_state_shows_code() {
        let mut record = sample_record();
        record.state = "14".to_string();
        assert!(format_detail(&record).contains("状態: 14"));
    }

    #[test]
    fn test_detail_without_events() {
        let mut record = sample_record();
        record.data.clear();
        assert!(format_detail(&record).contains("(履歴なし)"));
    }
}
