use serde::{Deserialize, Serialize};

/// Which threshold table maps shot counts to level labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelTable {
    /// Twelve tiers, the default.
    #[default]
    Fine,
    /// Five tiers.
    Coarse,
}

/// (lowest shot count, label), sorted ascending.
const FINE_TIERS: &[(i64, &str)] = &[
    (0, "Beginner"),
    (10, "Initiate"),
    (101, "Adept"),
    (200, "Expert"),
    (500, "Master"),
    (800, "Grandmaster"),
    (1_000, "Legendary Phoenix"),
    (3_000, "Mythic Dragon"),
    (5_000, "Cosmic Falcon"),
    (10_000, "Lord of Pigeons"),
    (15_000, "Sky Emperor"),
    (25_000, "Eternal Coo"),
];

const COARSE_TIERS: &[(i64, &str)] = &[
    (0, "Beginner"),
    (10, "Novice"),
    (100, "Hunter"),
    (500, "Expert"),
    (1_000, "Master"),
];

impl LevelTable {
    /// Label for a player who has shot `count` pigeons.
    pub fn label(&self, count: i64) -> &'static str {
        let tiers = match self {
            LevelTable::Fine => FINE_TIERS,
            LevelTable::Coarse => COARSE_TIERS,
        };
        tiers
            .iter()
            .rev()
            .find(|(floor, _)| count >= *floor)
            .map(|(_, label)| *label)
            .unwrap_or(tiers[0].1)
    }
}
