use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{DateTime, Document, doc},
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoPlayerDocument, player_filter, scope_filter},
};
use crate::dao::{
    models::{PlayerEntity, PlayerScope},
    player_store::PlayerStore,
    storage::StorageResult,
};

const PLAYER_COLLECTION_NAME: &str = "players";
const EGGS_FIELD: &str = "eggs";
const RARE_EGGS_FIELD: &str = "rare_eggs";

#[derive(Clone)]
pub struct MongoPlayerStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoPlayerStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"network": 1, "channel": 1, "name": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("player_scope_name_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: PLAYER_COLLECTION_NAME,
                index: "network,channel,name",
                source,
            })?;

        Ok(())
    }

    async fn collection(&self) -> Collection<MongoPlayerDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoPlayerDocument>(PLAYER_COLLECTION_NAME)
    }

    async fn list_players(&self, scope: PlayerScope) -> MongoResult<Vec<PlayerEntity>> {
        let collection = self.collection().await;

        let documents: Vec<MongoPlayerDocument> = collection
            .find(scope_filter(&scope))
            .await
            .map_err(|source| MongoDaoError::ListPlayers {
                scope: scope.clone(),
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListPlayers {
                scope: scope.clone(),
                source,
            })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn upsert_player(&self, player: PlayerEntity) -> MongoResult<()> {
        let scope = player.scope();
        let collection = self.collection().await;
        let now = DateTime::now();

        collection
            .update_one(
                player_filter(&scope, &player.name),
                doc! {
                    "$set": { "points": player.points, "count": player.count, "updated_at": now },
                    "$setOnInsert": {
                        "eggs": 0_i64,
                        "rare_eggs": 0_i64,
                        "created_at": DateTime::from_system_time(player.created_at),
                    },
                },
            )
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SavePlayer {
                scope,
                name: player.name.clone(),
                source,
            })?;

        Ok(())
    }

    async fn top_by_points(&self, scope: PlayerScope, limit: usize) -> MongoResult<Vec<PlayerEntity>> {
        let collection = self.collection().await;

        let documents: Vec<MongoPlayerDocument> = collection
            .find(scope_filter(&scope))
            .sort(doc! {"points": -1, "count": -1, "name": 1})
            .limit(limit as i64)
            .await
            .map_err(|source| MongoDaoError::TopPlayers {
                scope: scope.clone(),
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::TopPlayers {
                scope: scope.clone(),
                source,
            })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn read_ledger(
        &self,
        scope: PlayerScope,
        name: String,
        field: &'static str,
    ) -> MongoResult<i64> {
        let collection = self.collection().await;
        let document = collection
            .find_one(player_filter(&scope, &name))
            .await
            .map_err(|source| MongoDaoError::ReadLedger {
                name: name.clone(),
                field,
                source,
            })?;

        Ok(document
            .map(PlayerEntity::from)
            .map(|player| ledger_value(&player, field))
            .unwrap_or(0))
    }

    async fn increment_ledger(
        &self,
        scope: PlayerScope,
        name: String,
        field: &'static str,
        delta: i64,
    ) -> MongoResult<i64> {
        if delta <= 0 {
            return self.read_ledger(scope, name, field).await;
        }

        let other = if field == EGGS_FIELD {
            RARE_EGGS_FIELD
        } else {
            EGGS_FIELD
        };
        let now = DateTime::now();
        let mut increment = Document::new();
        increment.insert(field, delta);
        let mut on_insert = doc! { "points": 0_i64, "count": 0_i64, "created_at": now };
        on_insert.insert(other, 0_i64);

        let collection = self.collection().await;
        let document = collection
            .find_one_and_update(
                player_filter(&scope, &name),
                doc! {
                    "$inc": increment,
                    "$set": { "updated_at": now },
                    "$setOnInsert": on_insert,
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::UpdateLedger {
                name: name.clone(),
                field,
                source,
            })?;

        Ok(document
            .map(PlayerEntity::from)
            .map(|player| ledger_value(&player, field))
            .unwrap_or(delta))
    }
}

fn ledger_value(player: &PlayerEntity, field: &str) -> i64 {
    if field == EGGS_FIELD {
        player.eggs
    } else {
        player.rare_eggs
    }
}

impl PlayerStore for MongoPlayerStore {
    fn list_players(&self, scope: PlayerScope) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_players(scope).await.map_err(Into::into) })
    }

    fn upsert_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_player(player).await.map_err(Into::into) })
    }

    fn top_by_points(
        &self,
        scope: PlayerScope,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.top_by_points(scope, limit).await.map_err(Into::into) })
    }

    fn get_eggs(&self, scope: PlayerScope, name: String) -> BoxFuture<'static, StorageResult<i64>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .read_ledger(scope, name, EGGS_FIELD)
                .await
                .map_err(Into::into)
        })
    }

    fn add_eggs(
        &self,
        scope: PlayerScope,
        name: String,
        delta: i64,
    ) -> BoxFuture<'static, StorageResult<i64>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .increment_ledger(scope, name, EGGS_FIELD, delta)
                .await
                .map_err(Into::into)
        })
    }

    fn get_rare_eggs(&self, scope: PlayerScope, name: String) -> BoxFuture<'static, StorageResult<i64>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .read_ledger(scope, name, RARE_EGGS_FIELD)
                .await
                .map_err(Into::into)
        })
    }

    fn add_rare_eggs(
        &self,
        scope: PlayerScope,
        name: String,
        delta: i64,
    ) -> BoxFuture<'static, StorageResult<i64>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .increment_ledger(scope, name, RARE_EGGS_FIELD, delta)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
