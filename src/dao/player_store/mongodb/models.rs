use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};

use crate::dao::models::{PlayerEntity, PlayerScope};

/// Shape of a document in the `players` collection. `_id` is left to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPlayerDocument {
    network: String,
    channel: String,
    name: String,
    #[serde(default)]
    points: i64,
    #[serde(default)]
    count: i64,
    #[serde(default)]
    eggs: i64,
    #[serde(default)]
    rare_eggs: i64,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<MongoPlayerDocument> for PlayerEntity {
    fn from(value: MongoPlayerDocument) -> Self {
        Self {
            network: value.network,
            channel: value.channel,
            name: value.name,
            points: value.points,
            count: value.count,
            eggs: value.eggs,
            rare_eggs: value.rare_eggs,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

pub fn scope_filter(scope: &PlayerScope) -> Document {
    doc! { "network": scope.network.as_str(), "channel": scope.channel.as_str() }
}

pub fn player_filter(scope: &PlayerScope, name: &str) -> Document {
    doc! { "network": scope.network.as_str(), "channel": scope.channel.as_str(), "name": name }
}
