use std::{collections::HashMap, time::Duration};

use tokio::time::Instant;

/// Attempts allowed against a single spawn before a cooldown kicks in.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
/// Length of the cooldown once the attempt budget is spent.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default)]
struct CooldownRecord {
    last_seen_spawn_id: u64,
    attempts_since_spawn: u32,
    cooldown_until: Option<Instant>,
}

/// Answer from [`CooldownGate::try_consume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The shot may go ahead.
    Allowed,
    /// Cooling down.
    Denied {
        /// Time left on the cooldown.
        wait: Duration,
    },
}

impl Admission {
    /// `true` for [`Admission::Allowed`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Per-player attempt budget tied to the current spawn.
///
/// Keys are canonical player names. A change of spawn id wipes both the attempt
/// counter and any pending cooldown for that player.
#[derive(Debug)]
pub struct CooldownGate {
    records: HashMap<String, CooldownRecord>,
    max_attempts: u32,
    cooldown: Duration,
}

impl CooldownGate {
    pub fn new(max_attempts: u32, cooldown: Duration) -> Self {
        Self {
            records: HashMap::new(),
            max_attempts,
            cooldown,
        }
    }

    /// Spend one attempt for `name` against `spawn_id`, or report how long to wait.
    pub fn try_consume(&mut self, name: &str, spawn_id: u64, now: Instant) -> Admission {
        let record = self.records.entry(name.to_owned()).or_default();

        if record.last_seen_spawn_id != spawn_id {
            record.last_seen_spawn_id = spawn_id;
            record.attempts_since_spawn = 0;
            record.cooldown_until = None;
        }

        match record.cooldown_until {
            Some(until) if until > now => return Admission::Denied { wait: until - now },
            _ => {}
        }

        if record.attempts_since_spawn >= self.max_attempts {
            record.attempts_since_spawn = 0;
            record.cooldown_until = Some(now + self.cooldown);
            return Admission::Denied {
                wait: self.cooldown,
            };
        }

        record.attempts_since_spawn += 1;
        Admission::Allowed
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_COOLDOWN)
    }
}
