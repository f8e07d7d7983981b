/// フォーム送信イベントの手動再送ツール
///
/// 保存しておいた送信イベント（JSON）を読み込み、Lambdaと同じ処理で
/// 受信サービスに1回だけ転送する。受信サービスの動作確認に使う。
///
/// # ローカル実行
/// ```bash
/// export FORM_WEBHOOK_BASE_URL=https://forms-xxxxxx.run.app
///
/// # ファイルから
/// cargo run --bin form_replay -- --event event.json
///
/// # 標準入力から、送信先を上書き
/// cat event.json | cargo run --bin form_replay -- --base-url http://localhost:8080
/// ```
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use form_relay::application::{DeliveryOutcome, FormSubmitHandler};
use form_relay::infrastructure::{HttpWebhookClient, RelayConfig, init_cli_logging};
use lambda_runtime::Error;
use serde_json::Value;
use tracing::{error, info};

/// コマンドライン引数
#[derive(Parser, Debug)]
#[command(name = "form_replay")]
#[command(about = "保存したフォーム送信イベントをWebhookへ再送")]
struct CliArgs {
    /// 送信イベントJSONファイル（省略時または"-"の場合は標準入力）
    #[arg(long, short = 'e')]
    event: Option<PathBuf>,

    /// 受信サービスのベースURL
    /// 環境変数FORM_WEBHOOK_BASE_URLより優先される
    #[arg(long, short = 'u')]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_cli_logging();

    let args = CliArgs::parse();

    match run(args).await {
        Ok(DeliveryOutcome::Delivered { body }) => {
            info!(body = %body, "再送成功");
            println!("{}", body);
            ExitCode::SUCCESS
        }
        Ok(DeliveryOutcome::Rejected { status, body }) => {
            error!(status = status, body = %body, "送信先がエラーを返却");
            println!("{}", body);
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(error = %err, "再送失敗");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<DeliveryOutcome, Error> {
    let config = match args.base_url {
        Some(base_url) => RelayConfig::new(base_url)?,
        None => RelayConfig::from_env()?,
    };

    let event = read_event(args.event.as_ref(), std::io::stdin())?;

    let client = HttpWebhookClient::new(&config)?;
    info!(url = client.url(), "送信イベントを再送");

    let handler = FormSubmitHandler::new(client);
    let outcome = handler.relay(&event).await?;
    Ok(outcome)
}

/// 送信イベントJSONを読み込む
///
/// パスが省略または"-"の場合は`input`（通常は標準入力）から読む。
fn read_event(path: Option<&PathBuf>, mut input: impl Read) -> Result<Value, Error> {
    let text = match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            input.read_to_string(&mut buf)?;
            buf
        }
    };

    Ok(serde_json::from_str(&text)?)
}
