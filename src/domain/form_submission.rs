/// フォーム送信イベント
///
/// フォーム基盤から渡される送信イベント（JSON）を解析し、
/// 質問タイトルと回答値の組の列として保持する。
///
/// # 受け付けるJSON形式
/// ```json
/// {
///   "response": {
///     "itemResponses": [
///       { "item": { "title": "Name" }, "response": "Alice" }
///     ]
///   }
/// }
/// ```
use serde_json::Value;
use thiserror::Error;

use super::AnswerValue;

/// 送信イベント解析のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormEventError {
    /// responseが欠落、またはオブジェクトでない
    #[error("Missing response in event")]
    MissingResponse,

    /// itemResponsesが欠落、または配列でない
    #[error("Missing itemResponses in response")]
    MissingItemResponses,

    /// item.titleが欠落、または文字列でない
    #[error("Missing item title in item response #{index}")]
    MissingTitle { index: usize },

    /// 回答値が対応していない形
    #[error("Unsupported answer shape for question \"{title}\"")]
    UnsupportedAnswer { title: String },
}

/// 回答済みの1つの質問
#[derive(Debug, Clone, PartialEq)]
pub struct ItemResponse {
    /// 質問タイトル
    pub title: String,
    /// 回答値
    pub answer: AnswerValue,
}

impl ItemResponse {
    pub fn new(title: impl Into<String>, answer: impl Into<AnswerValue>) -> Self {
        Self {
            title: title.into(),
            answer: answer.into(),
        }
    }
}

/// 1件のフォーム送信
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormSubmissionEvent {
    /// 回答の列（フォーム上の順序）
    pub item_responses: Vec<ItemResponse>,
}

impl FormSubmissionEvent {
    pub fn new(item_responses: Vec<ItemResponse>) -> Self {
        Self { item_responses }
    }

    /// 送信イベントJSONを解析する
    ///
    /// # 処理フロー
    /// 1. `response`オブジェクトを取得
    /// 2. `itemResponses`配列を取得（空配列はエラーではない）
    /// 3. 各要素から`item.title`と`response`を抽出
    ///
    /// `response`キーが無い要素は未回答（`AnswerValue::None`）として扱う。
    pub fn from_json(event: &Value) -> Result<Self, FormEventError> {
        let response = event
            .get("response")
            .filter(|v| v.is_object())
            .ok_or(FormEventError::MissingResponse)?;

        let items = response
            .get("itemResponses")
            .and_then(|v| v.as_array())
            .ok_or(FormEventError::MissingItemResponses)?;

        let mut item_responses = Vec::with_capacity(items.len());
        for (index, item_response) in items.iter().enumerate() {
            let title = item_response
                .get("item")
                .and_then(|item| item.get("title"))
                .and_then(|v| v.as_str())
                .ok_or(FormEventError::MissingTitle { index })?;

            let answer = match item_response.get("response") {
                Some(raw) => AnswerValue::from_json(raw).ok_or_else(|| {
                    FormEventError::UnsupportedAnswer {
                        title: title.to_string(),
                    }
                })?,
                None => AnswerValue::None,
            };

            item_responses.push(ItemResponse {
                title: title.to_string(),
                answer,
            });
        }

        Ok(Self { item_responses })
    }
}
