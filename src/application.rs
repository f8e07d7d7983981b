// アプリケーション層モジュール
pub mod form_submit_handler;

// 再エクスポート
pub use form_submit_handler::{DeliveryOutcome, FormSubmitHandler, RelayError};
