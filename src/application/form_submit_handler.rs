/// フォーム送信ハンドラー
///
/// フォーム送信イベント1件を受け取り、回答をJSONにしてWebhookへ1回だけ転送する。
/// 転送結果（またはエラー）はログに記録し、呼び出し元には伝播しない。
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::domain::{AnswerMap, FormEventError, FormSubmissionEvent};
use crate::infrastructure::{WebhookError, WebhookSender};

/// 転送処理のエラー型
#[derive(Debug, Error)]
pub enum RelayError {
    /// 送信イベントの構造が不正
    #[error("Input extraction error: {0}")]
    Extraction(#[from] FormEventError),

    /// 回答マップのJSONシリアライズに失敗
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Webhookへの送信に失敗（レスポンスを受信できなかった）
    #[error("Transport error: {0}")]
    Transport(#[from] WebhookError),
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Serialization(err.to_string())
    }
}

/// 転送結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 送信先が200を返した
    Delivered { body: String },
    /// 送信先が200以外を返した
    Rejected { status: u16, body: String },
}

impl DeliveryOutcome {
    fn from_response(status: u16, body: String) -> Self {
        if status == 200 {
            DeliveryOutcome::Delivered { body }
        } else {
            DeliveryOutcome::Rejected { status, body }
        }
    }
}

/// フォーム送信イベントをWebhookへ転送するハンドラー
pub struct FormSubmitHandler<WS>
where
    WS: WebhookSender,
{
    /// Webhook送信
    sender: WS,
}

impl<WS> FormSubmitHandler<WS>
where
    WS: WebhookSender,
{
    /// 新しいFormSubmitHandlerを作成
    pub fn new(sender: WS) -> Self {
        Self { sender }
    }

    /// 送信イベントを転送し、結果を返す
    ///
    /// # 処理フロー
    /// 1. イベントから回答の列を取得
    /// 2. 質問タイトル→回答の`AnswerMap`を構築
    /// 3. JSONテキストにシリアライズ
    /// 4. Webhookへ1回POST（非2xxもエラーにしない）
    /// 5. ステータスと本文から`DeliveryOutcome`を作る
    pub async fn relay(&self, event: &Value) -> Result<DeliveryOutcome, RelayError> {
        let submission = FormSubmissionEvent::from_json(event)?;
        let answers = AnswerMap::from(&submission);

        debug!(
            item_count = submission.item_responses.len(),
            answer_count = answers.len(),
            "回答マップを構築"
        );

        let payload = answers.to_json()?;
        let response = self.sender.post_json(payload).await?;

        Ok(DeliveryOutcome::from_response(response.status, response.body))
    }

    /// トリガーの入口
    ///
    /// `relay`を実行し、結果をログに記録する。エラーはログに記録して握りつぶし、
    /// 常に正常終了する。
    pub async fn handle(&self, event: &Value) {
        match self.relay(event).await {
            Ok(DeliveryOutcome::Delivered { body }) => {
                info!(
                    status = 200,
                    body = %body,
                    "✅ Solicitud enviada exitosamente. Respuesta: {}",
                    body
                );
            }
            Ok(DeliveryOutcome::Rejected { status, body }) => {
                error!(
                    status = status,
                    body = %body,
                    "❌ Error al enviar. Status: {}. Respuesta: {}",
                    status,
                    body
                );
            }
            Err(err) => {
                error!(error = %err, "❌ Error en onFormSubmit: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::webhook_client::tests::MockWebhookSender;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    // ==================== テストヘルパー ====================

    /// テスト用のFormSubmitHandlerを作成
    fn create_test_handler() -> (FormSubmitHandler<MockWebhookSender>, MockWebhookSender) {
        let sender = MockWebhookSender::new();
        let handler = FormSubmitHandler::new(sender.clone());
        (handler, sender)
    }

    /// 回答の組から送信イベントを作成
    fn create_event(pairs: &[(&str, Value)]) -> Value {
        let items: Vec<Value> = pairs
            .iter()
            .map(|(title, answer)| json!({ "item": { "title": title }, "response": answer }))
            .collect();
        json!({ "response": { "itemResponses": items } })
    }

    /// 記録されたログ（レベル, メッセージ）
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<(Level, String)>>>);

    impl CapturedLogs {
        fn at_level(&self, level: Level) -> Vec<String> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, message)| message.clone())
                .collect()
        }
    }

    struct CaptureLayer(CapturedLogs);

    #[derive(Default)]
    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{:?}", value);
            }
        }
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = MessageVisitor::default();
            event.record(&mut visitor);
            (self.0).0
                .lock()
                .unwrap()
                .push((*event.metadata().level(), visitor.0));
        }
    }

    /// handleを実行し、その間に出力されたログを返す
    async fn handle_capturing_logs(
        handler: &FormSubmitHandler<MockWebhookSender>,
        event: &Value,
    ) -> CapturedLogs {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::registry().with(CaptureLayer(logs.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        handler.handle(event).await;

        logs
    }

    // ==================== relay テスト ====================

    #[tokio::test]
    async fn test_relay_posts_answers_in_order() {
        let (handler, sender) = create_test_handler();
        let event = create_event(&[("Name", json!("Alice")), ("City", json!("Madrid"))]);

        let outcome = handler.relay(&event).await.unwrap();

        assert_eq!(
            outcome,
            DeliveryOutcome::Delivered {
                body: "OK".to_string()
            }
        );
        assert_eq!(
            sender.sent_bodies(),
            vec![r#"{"Name":"Alice","City":"Madrid"}"#.to_string()]
        );
    }

    #[tokio::test]
    async fn test_relay_empty_responses_posts_empty_object() {
        let (handler, sender) = create_test_handler();
        let event = create_event(&[]);

        handler.relay(&event).await.unwrap();

        assert_eq!(sender.sent_bodies(), vec!["{}".to_string()]);
    }

    #[tokio::test]
    async fn test_relay_duplicate_title_keeps_later_answer() {
        let (handler, sender) = create_test_handler();
        let event = create_event(&[
            ("Pregunta", json!("primera")),
            ("Pregunta", json!("segunda")),
        ]);

        handler.relay(&event).await.unwrap();

        let body: Value = serde_json::from_str(&sender.sent_bodies()[0]).unwrap();
        assert_eq!(body, json!({ "Pregunta": "segunda" }));
    }

    #[tokio::test]
    async fn test_relay_passes_structured_answers_through() {
        let (handler, sender) = create_test_handler();
        let event = create_event(&[
            ("Colores", json!(["rojo", "azul"])),
            ("Edad", json!(30)),
            ("Grid", json!([["a"], ["b", "c"]])),
            ("Opcional", Value::Null),
        ]);

        handler.relay(&event).await.unwrap();

        assert_eq!(
            sender.sent_bodies()[0],
            r#"{"Colores":["rojo","azul"],"Edad":30,"Grid":[["a"],["b","c"]],"Opcional":null}"#
        );
    }

    #[tokio::test]
    async fn test_relay_non_200_is_rejected_outcome() {
        let (handler, sender) = create_test_handler();
        sender.push_response(500, "Internal Server Error");

        let outcome = handler.relay(&create_event(&[])).await.unwrap();

        assert_eq!(
            outcome,
            DeliveryOutcome::Rejected {
                status: 500,
                body: "Internal Server Error".to_string()
            }
        );
    }

    /// 200以外の2xxも失敗として扱う
    #[tokio::test]
    async fn test_relay_201_is_rejected_outcome() {
        let (handler, sender) = create_test_handler();
        sender.push_response(201, "Created");

        let outcome = handler.relay(&create_event(&[])).await.unwrap();

        assert!(matches!(outcome, DeliveryOutcome::Rejected { status: 201, .. }));
    }

    #[tokio::test]
    async fn test_relay_malformed_event_does_not_post() {
        let (handler, sender) = create_test_handler();

        let result = handler.relay(&json!({ "foo": "bar" })).await;

        assert!(matches!(
            result,
            Err(RelayError::Extraction(FormEventError::MissingResponse))
        ));
        assert!(sender.sent_bodies().is_empty());
    }

    /// 対応していない回答が1つあれば送信全体を送らない
    #[tokio::test]
    async fn test_relay_unsupported_answer_drops_whole_submission() {
        let (handler, sender) = create_test_handler();
        let event = create_event(&[("Name", json!("Alice")), ("Agree", json!(true))]);

        let result = handler.relay(&event).await;

        assert!(matches!(
            result,
            Err(RelayError::Extraction(FormEventError::UnsupportedAnswer { ref title })) if title == "Agree"
        ));
        assert!(sender.sent_bodies().is_empty());
    }

    #[tokio::test]
    async fn test_relay_transport_error() {
        let (handler, sender) = create_test_handler();
        sender.push_error(WebhookError::NetworkError("connection refused".to_string()));

        let result = handler.relay(&create_event(&[("Name", json!("Alice"))])).await;

        match result {
            Err(RelayError::Transport(WebhookError::NetworkError(msg))) => {
                assert!(msg.contains("connection refused"));
            }
            other => panic!("Expected Transport error, got {:?}", other),
        }
    }

    // ==================== handle ログテスト ====================

    #[tokio::test]
    async fn test_handle_success_logs_info_with_body() {
        let (handler, sender) = create_test_handler();
        sender.push_response(200, "OK");
        let event = create_event(&[("Name", json!("Alice")), ("City", json!("Madrid"))]);

        let logs = handle_capturing_logs(&handler, &event).await;

        let infos = logs.at_level(Level::INFO);
        assert_eq!(infos.len(), 1);
        assert!(infos[0].contains("✅"));
        assert!(infos[0].contains("Solicitud enviada exitosamente"));
        assert!(infos[0].contains("OK"));
        assert!(logs.at_level(Level::ERROR).is_empty());
    }

    /// 受信サービスのJSON応答は解釈せずそのままログに出す
    #[tokio::test]
    async fn test_handle_success_logs_receiver_json_verbatim() {
        let (handler, sender) = create_test_handler();
        let receiver_body =
            r#"{"success":true,"id":"SOL-1A2B3C4D","message":"Solicitud procesada correctamente"}"#;
        sender.push_response(200, receiver_body);
        let event = create_event(&[("Nombre y Apellido", json!("Ana Pérez"))]);

        let outcome = handler.relay(&event).await.unwrap();
        assert_eq!(
            outcome,
            DeliveryOutcome::Delivered {
                body: receiver_body.to_string()
            }
        );

        sender.push_response(200, receiver_body);
        let logs = handle_capturing_logs(&handler, &event).await;

        let infos = logs.at_level(Level::INFO);
        assert_eq!(infos.len(), 1);
        assert!(infos[0].contains(&format!(
            "✅ Solicitud enviada exitosamente. Respuesta: {}",
            receiver_body
        )));
    }

    #[tokio::test]
    async fn test_handle_failure_status_logs_error_with_status_and_body() {
        let (handler, sender) = create_test_handler();
        sender.push_response(500, "fallo interno");

        let logs = handle_capturing_logs(&handler, &create_event(&[])).await;

        let errors = logs.at_level(Level::ERROR);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Error al enviar. Status: 500"));
        assert!(errors[0].contains("fallo interno"));
        assert!(logs.at_level(Level::INFO).is_empty());
    }

    #[tokio::test]
    async fn test_handle_malformed_event_logs_single_top_level_error() {
        let (handler, sender) = create_test_handler();

        let logs = handle_capturing_logs(&handler, &json!({})).await;

        let errors = logs.at_level(Level::ERROR);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Error en onFormSubmit"));
        assert!(errors[0].contains("Missing response in event"));
        assert!(sender.sent_bodies().is_empty());
    }

    #[tokio::test]
    async fn test_handle_transport_error_logs_single_top_level_error() {
        let (handler, sender) = create_test_handler();
        sender.push_error(WebhookError::NetworkError("dns failure".to_string()));

        let logs = handle_capturing_logs(&handler, &create_event(&[])).await;

        let errors = logs.at_level(Level::ERROR);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Error en onFormSubmit"));
        assert!(errors[0].contains("dns failure"));
    }

    // ==================== エラー型テスト ====================

    #[test]
    fn test_relay_error_display() {
        let err = RelayError::from(FormEventError::MissingItemResponses);
        assert_eq!(
            err.to_string(),
            "Input extraction error: Missing itemResponses in response"
        );

        let err = RelayError::Serialization("bad".to_string());
        assert_eq!(err.to_string(), "Serialization error: bad");

        let err = RelayError::from(WebhookError::NetworkError("timeout".to_string()));
        assert!(err.to_string().starts_with("Transport error:"));
        assert!(err.to_string().contains("timeout"));
    }
}
