/// 回答値の型定義
///
/// フォームの各質問に対する回答は、質問の種類によって形が異なる。
/// テキスト・チェックボックス・グリッド・数値・未回答を閉じた列挙型で表現する。
use serde::Serialize;
use serde_json::{Number, Value};

/// 1つの質問に対する回答値
///
/// JSONへのシリアライズ時は受信したときと同じ形で出力される
/// （文字列、文字列配列、文字列配列の配列、数値、null）。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// 記述式・選択式などの単一テキスト回答
    Text(String),
    /// チェックボックスなどの複数選択回答
    TextList(Vec<String>),
    /// グリッド形式の回答（行ごとの選択肢リスト）
    TextGrid(Vec<Vec<String>>),
    /// 数値回答
    Number(Number),
    /// 未回答
    None,
}

impl AnswerValue {
    /// JSON値から回答値を構築する
    ///
    /// # 戻り値
    /// * `Some(AnswerValue)` - 対応する形の場合
    /// * `None` - オブジェクト・真偽値・型が混在した配列など、対応していない形の場合
    ///
    /// `None`の回答が1つでもあると送信全体が抽出エラーとなり、Webhookには何も送られない。
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(AnswerValue::Text(text.clone())),
            Value::Number(number) => Some(AnswerValue::Number(number.clone())),
            Value::Null => Some(AnswerValue::None),
            Value::Array(items) => Self::from_json_array(items),
            Value::Bool(_) | Value::Object(_) => None,
        }
    }

    fn from_json_array(items: &[Value]) -> Option<Self> {
        // 空配列は未選択のチェックボックスとして扱う
        if items.is_empty() {
            return Some(AnswerValue::TextList(Vec::new()));
        }

        if items.iter().all(Value::is_string) {
            let list: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            return Some(AnswerValue::TextList(list));
        }

        if items.iter().all(Value::is_array) {
            let mut rows: Vec<Vec<String>> = Vec::with_capacity(items.len());
            for row in items {
                let cells = row.as_array()?;
                if !cells.iter().all(Value::is_string) {
                    return None;
                }
                rows.push(
                    cells
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect(),
                );
            }
            return Some(AnswerValue::TextGrid(rows));
        }

        None
    }
}

impl From<&str> for AnswerValue {
    fn from(text: &str) -> Self {
        AnswerValue::Text(text.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(text: String) -> Self {
        AnswerValue::Text(text)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(list: Vec<String>) -> Self {
        AnswerValue::TextList(list)
    }
}
