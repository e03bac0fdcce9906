/// Database model definitions.
pub mod models;
/// Player roster and egg ledger storage backends.
pub mod player_store;
/// Storage abstraction layer for database operations.
pub mod storage;
