pub mod sender;

use crate::config::TelegramConfig;
use crate::model::NotifyError;
use reqwest::Client;
use std::time::Duration;

/// Telegram's hard limit on message length.
pub const MAX_MESSAGE_CHARS: usize = 4096;

pub struct TelegramNotifier {
    pub bot_token: String,
    pub chat_id: i64,
    pub client: Client,
}

impl TelegramNotifier {
    pub fn new(cfg: &TelegramConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::ApiError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            bot_token: cfg.bot_token.clone(),
            chat_id: cfg.chat_id,
            client,
        })
    }

    pub fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }

    /// Sends `text` verbatim; error strings with `_` or `*` must not be parsed as Markdown.
    pub async fn notify_text(&self, text: &str) -> Result<(), NotifyError> {
        sender::send_text(self, text, None).await
    }

    /// Sends the rendered cycle report as a monospace block.
    pub async fn notify_report(&self, report: &str) -> Result<(), NotifyError> {
        sender::send_text(self, &format_report(report), Some("Markdown")).await
    }
}

/// Wraps the report in a code block, truncating to the message limit.
pub fn format_report(report: &str) -> String {
    const HEADER: &str = "📈 Halving cycle report\n```\n";
    const FOOTER: &str = "\n```";
    let budget = MAX_MESSAGE_CHARS - HEADER.chars().count() - FOOTER.chars().count();
    let body: String = report.chars().take(budget).collect();
    format!("{}{}{}", HEADER, body, FOOTER)
}
