//! In-memory roster of a channel's players.

use indexmap::IndexMap;

use crate::dao::models::{PlayerEntity, PlayerScope};

/// Identity function for player names: trimmed and lower-cased.
///
/// Every roster, cooldown and egg-ledger key goes through this.
pub fn canonical_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Live score of a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub points: i64,
    pub count: i64,
}

impl Player {
    fn new(name: String, points: i64, count: i64) -> Self {
        Self {
            name,
            points,
            count,
        }
    }

    /// Persisted form of the player within `scope`.
    pub fn to_entity(&self, scope: &PlayerScope) -> PlayerEntity {
        PlayerEntity::new(scope, self.name.clone(), self.points, self.count)
    }
}

/// Canonical-name-keyed roster, insertion ordered.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: IndexMap<String, Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the roster from stored rows. Existing entries win over stored ones.
    pub fn seed<I>(&mut self, rows: I) -> usize
    where
        I: IntoIterator<Item = PlayerEntity>,
    {
        let mut added = 0;
        for row in rows {
            let name = canonical_name(&row.name);
            if self.players.contains_key(&name) {
                continue;
            }
            self.players
                .insert(name.clone(), Player::new(name, row.points, row.count));
            added += 1;
        }
        added
    }

    /// Entry for `name`, matched canonically.
    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.get(&canonical_name(name))
    }

    /// Look up `name`, creating a zero-score entry if needed.
    ///
    /// The flag is `true` when the entry was just created.
    pub fn get_or_insert(&mut self, name: &str) -> (&mut Player, bool) {
        let key = canonical_name(name);
        let created = !self.players.contains_key(&key);
        let player = self
            .players
            .entry(key.clone())
            .or_insert_with(|| Player::new(key, 0, 0));
        (player, created)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Players sorted by `key` descending, insertion order on ties.
    pub fn sorted_by<K, F>(&self, key: F) -> Vec<&Player>
    where
        K: Ord,
        F: Fn(&Player) -> K,
    {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by(|a, b| key(b).cmp(&key(a)));
        players
    }
}
