//! CLIモジュール

use crate::client::{Fetcher, HttpFetcher, TrackingClient};
use crate::config::{CliArgs, Config};
use crate::history::{self, History, HistoryStore};
use crate::record::TrackingRecord;
use crate::refresh::RefreshEngine;
use crate::report::Report;
use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// kd100 - kuaidi100 APIで配送状況を追跡する
///
/// 追跡番号を指定すると照会して履歴に追加する。
/// 指定しない場合は履歴中の全ての荷物を更新して表示する。
#[derive(Parser, Debug)]
#[command(name = "kd100")]
#[command(about = "kuaidi100 APIで配送状況を追跡する", long_about = None)]
pub struct Cli {
    /// 追跡番号（指定すると照会して履歴に追加）
    #[arg(short, long)]
    pub code: Option<String>,

    /// 運送会社コード（省略時は追跡番号から推定）
    #[arg(short = 'p', long)]
    pub company: Option<String>,

    /// 荷物に付けるラベル
    #[arg(short, long, default_value = "")]
    pub label: String,

    /// 配送履歴を詳細表示
    #[arg(short, long)]
    pub detail: bool,

    /// 照会中の進捗表示を抑制
    #[arg(short, long)]
    pub quiet: bool,

    /// 履歴ファイルのパス
    #[arg(long)]
    pub history: Option<PathBuf>,
}

/// CLIエントリポイント
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&CliArgs {
        history: cli.history.clone(),
    })?;

    let store = HistoryStore::new(config.history_path.clone());
    let client = TrackingClient::new(
        HttpFetcher::new(config.timeout()),
        config.guess_url.as_str(),
        config.query_url.as_str(),
    )
    .quiet(cli.quiet);
    let report = Report::new(cli.detail);

    match cli.code {
        Some(ref code) => {
            match add_shipment(&client, &store, code, cli.company.as_deref(), &cli.label)? {
                Some(record) => report.print_record(&record),
                None => println!("該当する追跡情報はありません: {}", code),
            }
        }
        None => {
            let history = refresh_all(&client, &store, config.request_delay())?;
            report.print_history(&history);
        }
    }

    Ok(())
}

/// 追跡番号を照会して履歴に追加
///
/// 該当なしの場合は何も保存せず`None`を返す。
/// ラベルが空で既存のレコードがあれば、既存のラベルを引き継ぐ。
pub fn add_shipment<F: Fetcher>(
    client: &TrackingClient<F>,
    store: &HistoryStore,
    code: &str,
    company: Option<&str>,
    label: &str,
) -> Result<Option<TrackingRecord>> {
    let code = code.trim();
    if code.is_empty() {
        bail!("追跡番号が空です");
    }

    let Some(mut record) = client.query(code, company)? else {
        return Ok(None);
    };

    let mut history = store.load();
    record.label = match history.get(&record.nu) {
        Some(existing) if label.is_empty() => existing.label.clone(),
        _ => label.to_string(),
    };

    history::upsert(&mut history, record.clone());
    store.save(&history)?;
    info!("履歴に追加しました: {} ({})", record.nu, record.com);

    Ok(Some(record))
}

/// 履歴全体を更新して保存
pub fn refresh_all<F: Fetcher>(
    client: &TrackingClient<F>,
    store: &HistoryStore,
    delay: Duration,
) -> Result<History> {
    let history = store.load();
    info!("{}件の荷物を更新します ({})", history.len(), store.path().display());

    let refreshed = RefreshEngine::new(client, delay).refresh(history);
    store.save(&refreshed)?;

    Ok(refreshed)
}
