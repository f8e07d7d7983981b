/// フォーム送信トリガーLambda関数
///
/// フォーム送信イベント（JSON）を受け取り、回答を受信サービスの
/// POST /webhook/form に転送する。
/// 転送の成否に関わらずLambdaとしては常に成功を返す（再試行させない）。
///
/// # 環境変数
/// - FORM_WEBHOOK_BASE_URL: 受信サービスのベースURL（必須）
/// - RUST_LOG: ログレベル（デフォルト: info）
use std::sync::Arc;

use form_relay::application::FormSubmitHandler;
use form_relay::infrastructure::{HttpWebhookClient, RelayConfig, init_logging};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // 設定はコールドスタート時に一度だけ読み込む
    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Relay設定読み込み失敗");
            return Err(err.into());
        }
    };

    let client = HttpWebhookClient::new(&config)?;
    info!(url = client.url(), "Webhook送信先を設定");

    let handler = Arc::new(FormSubmitHandler::new(client));

    let func = service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move {
            handler.handle(&event.payload).await;
            Ok::<(), Error>(())
        }
    });
    lambda_runtime::run(func).await?;
    Ok(())
}
