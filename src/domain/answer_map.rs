/// 質問タイトル→回答値のマップ
///
/// 送信イベントの回答を挿入順を保ったまま保持し、Webhookに送るJSONオブジェクトになる。
/// 同じタイトルが複数回現れた場合は後の回答で上書きし、キーの位置は最初の出現位置のまま。
use indexmap::IndexMap;
use serde::Serialize;

use super::{AnswerValue, FormSubmissionEvent};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct AnswerMap {
    entries: IndexMap<String, AnswerValue>,
}

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 回答を挿入する
    ///
    /// 既存のタイトルであれば値のみ置き換え（位置はそのまま）、以前の値を返す。
    pub fn insert(&mut self, title: impl Into<String>, answer: AnswerValue) -> Option<AnswerValue> {
        self.entries.insert(title.into(), answer)
    }

    pub fn get(&self, title: &str) -> Option<&AnswerValue> {
        self.entries.get(title)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// タイトルを挿入順に返す
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// JSONテキストにシリアライズする
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&FormSubmissionEvent> for AnswerMap {
    fn from(event: &FormSubmissionEvent) -> Self {
        let mut map = AnswerMap::new();
        for item in &event.item_responses {
            map.insert(item.title.clone(), item.answer.clone());
        }
        map
    }
}
