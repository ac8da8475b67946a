use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::json;
use tracing::{error, info};

// Discord rejects message content longer than this.
const MAX_CONTENT_CHARS: usize = 2000;

/// Post a price report to a Discord webhook.
pub async fn send_report(client: &Client, webhook_url: &str, message: &str) -> Result<()> {
    let payload = json!({
        "content": truncate(message, MAX_CONTENT_CHARS),
    });

    let response = client
        .post(webhook_url)
        .json(&payload)
        .send()
        .await
        .context("Failed to send Discord webhook")?;

    if response.status().is_success() {
        info!("Sent price report to Discord");
        Ok(())
    } else {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        error!("Discord webhook failed with status {}: {}", status, error_text);
        Err(anyhow::anyhow!("Discord webhook failed: {} - {}", status, error_text))
    }
}

fn truncate(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        return message.to_string();
    }
    // Keep the code block closed so the table still renders.
    let suffix = "\n…\n```";
    let keep = max_chars - suffix.chars().count();
    format!("{}{}", message.chars().take(keep).collect::<String>(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_message_as_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/webhooks/1/token"))
            .and(body_json(json!({ "content": "```\n| Azul |\n```" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/api/webhooks/1/token", server.uri());
        send_report(&Client::new(), &url, "```\n| Azul |\n```")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_webhook_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Webhook Token"))
            .mount(&server)
            .await;

        let err = send_report(&Client::new(), &server.uri(), "hello")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn long_messages_are_truncated() {
        let message = format!("```\n{}\n```", "x".repeat(3000));
        let truncated = truncate(&message, MAX_CONTENT_CHARS);
        assert_eq!(truncated.chars().count(), MAX_CONTENT_CHARS);
        assert!(truncated.ends_with("```"));
        assert_eq!(truncate("short", MAX_CONTENT_CHARS), "short");
    }
}
