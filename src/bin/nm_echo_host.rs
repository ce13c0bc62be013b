//! Minimal native messaging host: announces itself, then echoes every message.
//!
//! `{"quit": true}` stops the host without waiting for the browser to close stdin.

use native_editor_host::config::HostConfig;
use native_editor_host::host::{event_loop_with_config, send_message, NmError};
use native_editor_host::logging;
use serde_json::json;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), NmError> {
    let config = HostConfig::from_env()?;
    logging::init(&config.log)?;

    send_message(&json!({"ready": true})).await?;

    let outcome = event_loop_with_config(&config, |incoming, send| async move {
        match incoming {
            Ok(msg) if msg.get("quit").and_then(|q| q.as_bool()) == Some(true) => {
                send.send(&json!({"bye": true})).await?;
                Err(NmError::Disconnected)
            }
            Ok(msg) => send.send(&json!({"echo": msg})).await,
            Err(e) => {
                send.send(&json!({"ok": false, "error": e.to_string()}))
                    .await
            }
        }
    })
    .await;

    match outcome {
        Ok(()) | Err(NmError::Disconnected) => {
            info!("host stopped");
            Ok(())
        }
        Err(err) => Err(err),
    }
}
