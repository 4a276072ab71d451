// notifier/telegram/sender.rs

use crate::model::NotifyError;
use crate::notifier::telegram::TelegramNotifier;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Form fields for `sendMessage`. Without a parse mode Telegram sends the text verbatim.
pub fn message_params(
    chat_id: i64,
    text: &str,
    parse_mode: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut params = vec![("chat_id", chat_id.to_string()), ("text", text.to_string())];
    if let Some(mode) = parse_mode {
        params.push(("parse_mode", mode.to_string()));
    }
    params
}

/// Sends a text message via Telegram.
pub async fn send_text(
    notifier: &TelegramNotifier,
    text: &str,
    parse_mode: Option<&str>,
) -> Result<(), NotifyError> {
    let url = notifier.api_url("sendMessage");
    let params = message_params(notifier.chat_id, text, parse_mode);
    let response = match timeout(
        Duration::from_secs(10),
        notifier.client.post(&url).form(&params).send(),
    )
    .await
    {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => {
            warn!("❌ Telegram send() failed: {:?}", e);
            return Err(NotifyError::ApiError(format!("Send failed: {}", e)));
        }
        Err(_) => {
            warn!("⏳ Telegram send() timed out");
            return Err(NotifyError::Unreachable);
        }
    };
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "unknown".into());
    if !status.is_success() {
        warn!("❌ Telegram API responded [{}]: {}", status, body);
        return Err(NotifyError::ApiError(format!("HTTP {}", status)));
    }
    info!("✅ Telegram message sent [{}]", status);
    Ok(())
}
