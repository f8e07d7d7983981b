// WebhookClient - フォーム回答送信用HTTPクライアント
//
// 受信サービスの POST /webhook/form にJSONペイロードを1回だけ送信する。
// 非2xxレスポンスはエラーにせず、ステータスと本文をそのまま返す。
// 再試行は行わない。

use super::config::RelayConfig;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{debug, instrument};

/// Webhook送信のエラー型
///
/// HTTPステータスはエラーではなく`DeliveryResult`として返るため、
/// ここに含まれるのはトランスポート層の失敗のみ。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WebhookError {
    /// HTTPクライアントの構築に失敗
    #[error("HTTPクライアントの構築に失敗: {0}")]
    ClientBuildError(String),

    /// ネットワークエラー（DNS、接続拒否、タイムアウトなど）
    #[error("ネットワークエラー: {0}")]
    NetworkError(String),

    /// レスポンス本文の読み取りに失敗
    #[error("レスポンス本文の読み取りに失敗: {0}")]
    ResponseBodyError(String),
}

/// 1回の送信結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    /// HTTPステータスコード
    pub status: u16,
    /// レスポンス本文
    pub body: String,
}

impl DeliveryResult {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Webhook送信用トレイト
///
/// 実際のHTTPクライアントとテスト用モックを差し替えられるようにする。
#[async_trait]
pub trait WebhookSender: Send + Sync {
    /// JSONテキストを送信先にPOSTする
    ///
    /// # 戻り値
    /// * `Ok(DeliveryResult)` - レスポンスを受信した（ステータスに関わらず）
    /// * `Err(WebhookError)` - レスポンスを受信できなかった
    async fn post_json(&self, body: String) -> Result<DeliveryResult, WebhookError>;
}

/// reqwestによるWebhook送信実装
///
/// タイムアウトはreqwestのデフォルトのまま。
#[derive(Clone)]
pub struct HttpWebhookClient {
    client: Client,
    /// 送信先URL（ベースURL + /webhook/form）
    url: String,
}

impl std::fmt::Debug for HttpWebhookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpWebhookClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl HttpWebhookClient {
    /// 設定からHttpWebhookClientを作成
    pub fn new(config: &RelayConfig) -> Result<Self, WebhookError> {
        let client = Client::builder()
            .build()
            .map_err(|e| WebhookError::ClientBuildError(e.to_string()))?;

        Ok(Self {
            client,
            url: config.webhook_url(),
        })
    }

    /// 送信先URLを取得
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookClient {
    #[instrument(skip(self, body), fields(url = %self.url, body_len = body.len()))]
    async fn post_json(&self, body: String) -> Result<DeliveryResult, WebhookError> {
        debug!("Webhookにフォーム回答を送信");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| WebhookError::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| WebhookError::ResponseBodyError(e.to_string()))?;

        debug!(status = status, "Webhookレスポンスを受信");

        Ok(DeliveryResult { status, body })
    }
}
