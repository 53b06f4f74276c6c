use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

const FAVICON_PREFIX: &str = "data:image/png;base64,";

/// The JSON document a server sends in its status response, kept as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerStatus(Value);

impl ServerStatus {
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(Self(serde_json::from_str(json)?))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn summary(&self) -> MotdSummary {
        MotdSummary::from_status(self)
    }
}

impl From<ServerStatus> for Value {
    fn from(status: ServerStatus) -> Self {
        status.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSample {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// The handful of fields a server list usually displays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MotdSummary {
    /// Base64 PNG without the data URL prefix.
    pub icon: Option<String>,
    /// Plain string or chat component, whichever the server sent.
    pub description: Value,
    pub online: Option<u64>,
    pub max: Option<u64>,
    pub players: Vec<PlayerSample>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Fields {
    description: Value,
    favicon: Option<String>,
    players: Players,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Players {
    max: Option<u64>,
    online: Option<u64>,
    sample: Vec<PlayerSample>,
}

impl MotdSummary {
    /// Missing or oddly typed fields are left empty rather than treated as errors.
    pub fn from_status(status: &ServerStatus) -> Self {
        let fields = Fields::deserialize(status.as_value()).unwrap_or_default();
        Self {
            icon: fields
                .favicon
                .map(|icon| icon.strip_prefix(FAVICON_PREFIX).map(str::to_owned).unwrap_or(icon)),
            description: fields.description,
            online: fields.players.online,
            max: fields.players.max,
            players: fields.players.sample,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            ServerStatus::from_json("{\"players\":"),
            Err(ProtocolError::InvalidJson(_))
        ));
    }

    #[test]
    fn keeps_unknown_fields() {
        let status = ServerStatus::from_json(r#"{"enforcesSecureChat":true,"forgeData":{}}"#).unwrap();
        assert_eq!(
            status.into_value(),
            json!({"enforcesSecureChat": true, "forgeData": {}})
        );
    }

    #[test]
    fn summary_of_full_status() {
        let status = ServerStatus::from_json(
            r#"{
                "version": {"name": "1.20.1", "protocol": 763},
                "players": {
                    "max": 100,
                    "online": 2,
                    "sample": [
                        {"name": "thinkofdeath", "id": "4566e69f-c907-48ee-8d71-d7ba5aa00d20"},
                        {"name": "Notch", "id": "069a79f4-44e9-4726-a5be-fca90e38aaf5"}
                    ]
                },
                "description": {"text": "Hello world"},
                "favicon": "data:image/png;base64,iVBORw0KGgo="
            }"#,
        )
        .unwrap();

        let summary = status.summary();
        assert_eq!(summary.icon.as_deref(), Some("iVBORw0KGgo="));
        assert_eq!(summary.description, json!({"text": "Hello world"}));
        assert_eq!(summary.online, Some(2));
        assert_eq!(summary.max, Some(100));
        assert_eq!(summary.players.len(), 2);
        assert_eq!(summary.players[1].name, "Notch");
    }

    #[test]
    fn summary_of_sparse_status() {
        let status = ServerStatus::from_json(
            r#"{"description":"A Minecraft Server","players":{"max":20,"online":0}}"#,
        )
        .unwrap();

        let summary = status.summary();
        assert_eq!(summary.icon, None);
        assert_eq!(summary.description, json!("A Minecraft Server"));
        assert_eq!(summary.online, Some(0));
        assert!(summary.players.is_empty());
    }

    #[test]
    fn summary_of_malformed_status_is_empty() {
        let status = ServerStatus::from_json(r#"{"players":"lots"}"#).unwrap();
        assert_eq!(status.summary(), MotdSummary::default());

        let status = ServerStatus::from_json("[1, 2, 3]").unwrap();
        assert_eq!(status.summary(), MotdSummary::default());
    }
}
