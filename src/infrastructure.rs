// Infrastructure layer modules
pub mod config;
pub mod logging;
pub mod webhook_client;

// Re-exports
pub use config::{BASE_URL_ENV, RelayConfig, RelayConfigError, WEBHOOK_FORM_PATH};
#[cfg(test)]
pub use logging::init_test_logging;
pub use logging::{init_cli_logging, init_logging};
pub use webhook_client::{DeliveryResult, HttpWebhookClient, WebhookError, WebhookSender};
