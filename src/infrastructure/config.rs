// Webhook送信先の設定
//
// 受信サービスのベースURLを環境変数または明示的な値から読み込む。

use thiserror::Error;
use url::Url;

/// ベースURL環境変数名
pub const BASE_URL_ENV: &str = "FORM_WEBHOOK_BASE_URL";

/// フォーム受信エンドポイントのパス
pub const WEBHOOK_FORM_PATH: &str = "/webhook/form";

/// Relay設定エラー
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RelayConfigError {
    /// 必須の環境変数が設定されていない
    #[error("必須の環境変数が設定されていません: {0}")]
    MissingEnvVar(String),

    /// ベースURLが不正
    #[error("不正なベースURL: url={url}, reason={reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Webhook送信先の設定
///
/// # フィールド
/// - `base_url`: 受信サービスのベースURL (例: "https://forms-xxxxxx.run.app")
#[derive(Debug, Clone)]
pub struct RelayConfig {
    base_url: String,
}

impl RelayConfig {
    /// ベースURLを検証して設定を作成
    ///
    /// http/httpsの絶対URLのみ受け付ける。末尾の`/`は取り除く。
    pub fn new(base_url: impl Into<String>) -> Result<Self, RelayConfigError> {
        let base_url = base_url.into();

        let parsed = Url::parse(&base_url).map_err(|e| RelayConfigError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RelayConfigError::InvalidUrl {
                url: base_url,
                reason: format!("unsupported scheme: {}", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 環境変数から設定を読み込み
    ///
    /// # 環境変数
    /// - `FORM_WEBHOOK_BASE_URL`: 受信サービスのベースURL（必須）
    pub fn from_env() -> Result<Self, RelayConfigError> {
        let base_url = std::env::var(BASE_URL_ENV)
            .map_err(|_| RelayConfigError::MissingEnvVar(BASE_URL_ENV.to_string()))?;

        Self::new(base_url)
    }

    /// ベースURLを取得
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// フォーム受信エンドポイントURLを構築
    ///
    /// # 戻り値
    /// 例: "https://forms-xxxxxx.run.app/webhook/form"
    pub fn webhook_url(&self) -> String {
        format!("{}{}", self.base_url, WEBHOOK_FORM_PATH)
    }
}
