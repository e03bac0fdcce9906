use mongodb::error::Error as MongoError;
use thiserror::Error;

use crate::dao::models::PlayerScope;

/// Result alias for MongoDB operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed while connecting")]
    InitialPing {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to list players of `{scope}`")]
    ListPlayers {
        scope: PlayerScope,
        #[source]
        source: MongoError,
    },
    #[error("failed to save player `{name}` of `{scope}`")]
    SavePlayer {
        scope: PlayerScope,
        name: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to load the leaderboard of `{scope}`")]
    TopPlayers {
        scope: PlayerScope,
        #[source]
        source: MongoError,
    },
    #[error("failed to read `{field}` of player `{name}`")]
    ReadLedger {
        name: String,
        field: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to increment `{field}` of player `{name}`")]
    UpdateLedger {
        name: String,
        field: &'static str,
        #[source]
        source: MongoError,
    },
}
