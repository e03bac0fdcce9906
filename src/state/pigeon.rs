//! Pigeon species, spawn actions and the controller owning the single active target.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use thiserror::Error;
use tokio::time::Instant;

use super::dice::Dice;

/// Closed set of pigeon kinds that can spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PigeonKind {
    /// Ordinary pigeon, easy to hit and cheap.
    CartelMember,
    /// Rare and hard to hit.
    Boss,
    /// Middle of the road.
    White,
}

impl PigeonKind {
    /// Name used in chat messages.
    pub fn label(&self) -> &'static str {
        match self {
            PigeonKind::CartelMember => "cartel member",
            PigeonKind::Boss => "boss",
            PigeonKind::White => "white",
        }
    }
}

/// Immutable species template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pigeon {
    /// Species.
    pub kind: PigeonKind,
    /// Points granted for a successful shot.
    pub points: i64,
    /// Percent chance (0..=100) that a single shot connects.
    pub success_rate: u32,
}

impl Pigeon {
    /// Species template with its reward and hit chance.
    pub const fn new(kind: PigeonKind, points: i64, success_rate: u32) -> Self {
        Self {
            kind,
            points,
            success_rate,
        }
    }
}

/// Species table used by every channel.
pub const SPECIES: [Pigeon; 3] = [
    Pigeon::new(PigeonKind::CartelMember, 10, 85),
    Pigeon::new(PigeonKind::Boss, 100, 25),
    Pigeon::new(PigeonKind::White, 50, 50),
];

/// Flavor descriptor attached to a spawn. Only [`SpawnAction::Mating`] matters to the game rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnAction {
    /// Made off with an item.
    Stole,
    /// Soiled an item.
    Pooped,
    /// Perched on an item.
    Landed,
    /// A mating pair; makes the kill eligible for eggs.
    Mating,
}

/// Action table used by every channel.
pub const ACTIONS: [SpawnAction; 4] = [
    SpawnAction::Stole,
    SpawnAction::Pooped,
    SpawnAction::Landed,
    SpawnAction::Mating,
];

impl SpawnAction {
    /// Whether the spawn makes the egg economy eligible.
    pub fn is_mating(&self) -> bool {
        matches!(self, SpawnAction::Mating)
    }

    fn items(&self) -> &'static [&'static str] {
        match self {
            SpawnAction::Stole => &["tv", "wallet", "food"],
            SpawnAction::Pooped => &["car", "head", "laptop"],
            SpawnAction::Landed => &[
                "balcony",
                "head",
                "car",
                "house",
                "swimming pool",
                "bed",
                "couch",
                "laptop",
            ],
            SpawnAction::Mating => &["balcony", "car", "bed", "swimming pool", "couch", "laptop"],
        }
    }

    /// Render the spawn notification, choosing one of the action's items at random.
    pub fn announce(&self, kind: PigeonKind, dice: &Dice) -> String {
        let item = dice.pick(self.items()).copied().unwrap_or("house");
        let label = kind.label();
        match self {
            SpawnAction::Stole => format!("A {label} pigeon stole your {item}!"),
            SpawnAction::Pooped => format!("A {label} pigeon pooped on your {item}!"),
            SpawnAction::Landed => format!("A {label} pigeon has landed on your {item}!"),
            SpawnAction::Mating => format!("Two {label} pigeons are mating at your {item}!"),
        }
    }
}

/// The target currently up for grabs in a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveTarget {
    /// What was spawned.
    pub species: Pigeon,
    /// Spawned with the mating action.
    pub is_mating: bool,
    /// When it appeared.
    pub spawned_at: Instant,
    /// Identifier minted for this spawn.
    pub spawn_id: u64,
}

/// Slot holding at most one [`ActiveTarget`]. Lives behind the channel's target lock.
#[derive(Debug, Default)]
pub struct TargetSlot {
    active: Option<ActiveTarget>,
}

impl TargetSlot {
    /// Target currently up, if any.
    pub fn active(&self) -> Option<&ActiveTarget> {
        self.active.as_ref()
    }

    /// Remove the target, returning what was there.
    pub fn clear(&mut self) -> Option<ActiveTarget> {
        self.active.take()
    }
}

/// Result of a single spawn tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A fresh target appeared.
    Spawned {
        /// Identifier of the new spawn.
        spawn_id: u64,
        /// Species that appeared.
        pigeon: Pigeon,
        /// Whether eggs are in play.
        is_mating: bool,
        /// Chat line announcing it.
        announcement: String,
    },
    /// The previous target outlived the dwell time and left.
    Escaped {
        /// Species that got away.
        pigeon: Pigeon,
    },
    /// A target is up but has not been around long enough to escape.
    Waiting,
}

impl TickOutcome {
    /// Chat line for the outcome, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            TickOutcome::Spawned { announcement, .. } => Some(announcement.clone()),
            TickOutcome::Escaped { pigeon } => Some(format!(
                "~ coo coo ~ the {} pigeon has made a clean escape ~",
                pigeon.kind.label()
            )),
            TickOutcome::Waiting => None,
        }
    }
}

/// Invalid spawn tables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnTableError {
    /// The named table has no entries.
    #[error("spawn table `{0}` must not be empty")]
    Empty(&'static str),
}

/// Drives the target lifecycle and mints spawn identifiers.
pub struct PigeonSpawnController {
    species: Vec<Pigeon>,
    actions: Vec<SpawnAction>,
    dwell: Duration,
    last_spawn_id: AtomicU64,
}

impl PigeonSpawnController {
    /// Controller over the built-in species and action tables.
    pub fn new(dwell: Duration) -> Self {
        Self {
            species: SPECIES.to_vec(),
            actions: ACTIONS.to_vec(),
            dwell,
            last_spawn_id: AtomicU64::new(0),
        }
    }

    /// Controller over custom tables. Both must be non-empty.
    pub fn with_tables(
        species: Vec<Pigeon>,
        actions: Vec<SpawnAction>,
        dwell: Duration,
    ) -> Result<Self, SpawnTableError> {
        if species.is_empty() {
            return Err(SpawnTableError::Empty("species"));
        }
        if actions.is_empty() {
            return Err(SpawnTableError::Empty("actions"));
        }
        Ok(Self {
            species,
            actions,
            dwell,
            last_spawn_id: AtomicU64::new(0),
        })
    }

    /// Identifier of the most recent spawn. 0 before the first one.
    pub fn current_spawn_id(&self) -> u64 {
        self.last_spawn_id.load(Ordering::SeqCst)
    }

    /// Advance the lifecycle by one step. At most one target event per call.
    ///
    /// Callers must hold the target lock for the whole call.
    pub fn tick(&self, slot: &mut TargetSlot, dice: &Dice, now: Instant) -> TickOutcome {
        if let Some(active) = slot.active() {
            if now.saturating_duration_since(active.spawned_at) < self.dwell {
                return TickOutcome::Waiting;
            }
            let pigeon = active.species;
            slot.clear();
            return TickOutcome::Escaped { pigeon };
        }

        let (Some(pigeon), Some(action)) = (
            dice.pick(&self.species).copied(),
            dice.pick(&self.actions).copied(),
        ) else {
            return TickOutcome::Waiting;
        };

        let spawn_id = self.last_spawn_id.fetch_add(1, Ordering::SeqCst) + 1;
        let is_mating = action.is_mating();
        slot.active = Some(ActiveTarget {
            species: pigeon,
            is_mating,
            spawned_at: now,
            spawn_id,
        });

        TickOutcome::Spawned {
            spawn_id,
            pigeon,
            is_mating,
            announcement: action.announce(pigeon.kind, dice),
        }
    }

    /// Place a specific target in the slot, minting a new spawn id.
    ///
    /// Used by tests and operator tooling that need a known target.
    pub fn force_spawn(
        &self,
        slot: &mut TargetSlot,
        pigeon: Pigeon,
        is_mating: bool,
        now: Instant,
    ) -> u64 {
        let spawn_id = self.last_spawn_id.fetch_add(1, Ordering::SeqCst) + 1;
        slot.active = Some(ActiveTarget {
            species: pigeon,
            is_mating,
            spawned_at: now,
            spawn_id,
        });
        spawn_id
    }
}
