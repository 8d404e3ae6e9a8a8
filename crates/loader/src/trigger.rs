//! Trigger notification parsing.

use serde::Deserialize;

use livesink_core::{NotificationEnvelope, StorageUri};

use crate::error::LoaderError;

/// Payload carried inside a trigger record's message.
#[derive(Debug, Deserialize)]
struct CopyCommandMessage {
    copy_command: String,
}

/// Extracts the COPY command object's location from a raw trigger envelope.
///
/// The envelope's first record carries the payload as a JSON-encoded string;
/// anything missing or malformed along that path is a `Parse` error.
pub fn parse_trigger(raw: &str) -> Result<StorageUri, LoaderError> {
    let envelope: NotificationEnvelope = serde_json::from_str(raw)
        .map_err(|e| LoaderError::Parse(format!("invalid trigger envelope: {}", e)))?;
    let record = envelope
        .records
        .first()
        .ok_or_else(|| LoaderError::Parse("trigger envelope has no records".to_string()))?;
    let payload: CopyCommandMessage = serde_json::from_str(&record.message)
        .map_err(|e| LoaderError::Parse(format!("invalid trigger payload: {}", e)))?;
    StorageUri::parse(&payload.copy_command)
        .map_err(|e| LoaderError::Parse(format!("invalid copy command location: {}", e)))
}
