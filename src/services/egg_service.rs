//! Egg rewards for shooting a mating pigeon, plus the rare-egg bonus.

use tracing::debug;

use crate::{
    dao::storage::StorageResult,
    services::format::group_thousands,
    state::{
        dice::Dice,
        game::Game,
        pigeon::{ActiveTarget, PigeonKind},
        roster::{Player, canonical_name},
    },
};

/// Eggs a mating pair of `kind` is carrying before any crack.
pub fn base_eggs(kind: PigeonKind) -> i64 {
    match kind {
        PigeonKind::CartelMember => 1,
        PigeonKind::White => 2,
        PigeonKind::Boss => 5,
    }
}

/// Split of the base eggs after the crack roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrackOutcome {
    /// Eggs that survived.
    pub kept: i64,
    /// Eggs lost in the fall.
    pub cracked: i64,
}

/// Roll how many eggs survive the shot.
///
/// Cartel members always lose their egg; white keeps 0 or 1; boss keeps 0 to 4.
pub fn crack(kind: PigeonKind, dice: &Dice) -> CrackOutcome {
    let base = base_eggs(kind);
    let kept = match kind {
        PigeonKind::CartelMember => 0,
        PigeonKind::White | PigeonKind::Boss => i64::from(dice.below(base as u32)),
    };
    CrackOutcome {
        kept,
        cracked: base - kept,
    }
}

/// Award eggs for a kill on `target`. `None` unless the target was mating.
pub async fn collect_mating_eggs(
    game: &Game,
    target: &ActiveTarget,
    shooter: &str,
) -> StorageResult<Option<String>> {
    if !target.is_mating {
        return Ok(None);
    }

    let scope = game.scope().clone();
    let name = canonical_name(shooter);
    let CrackOutcome { kept, cracked } = crack(target.species.kind, game.dice());
    debug!(%scope, player = %name, kept, cracked, "mating eggs rolled");

    if kept <= 0 {
        let total = game.store().get_eggs(scope, name).await?;
        return Ok(Some(format!(
            "Oh no... the eggs cracked during the chaos! No eggs collected. You now have {} egg(s) in total.",
            group_thousands(total)
        )));
    }

    let total = game.store().add_eggs(scope.clone(), name.clone(), kept).await?;
    if cracked > 0 {
        return Ok(Some(format!(
            "Yay!! {shooter} has collected {} egg(s)... Unfortunately, {} cracked! You now have {} egg(s) in total.",
            group_thousands(kept),
            group_thousands(cracked),
            group_thousands(total)
        )));
    }

    let rare = game.store().get_rare_eggs(scope, name).await?;
    Ok(Some(format!(
        "{shooter} collected {} egg(s)! Total eggs: {} (Rare egg(s): {})",
        group_thousands(kept),
        group_thousands(total),
        group_thousands(rare)
    )))
}

/// Independent rare-egg roll after a mating kill.
///
/// On collection the egg counts toward both ledgers and `player` gets the point bonus.
pub async fn try_rare_egg(
    game: &Game,
    target: &ActiveTarget,
    shooter: &str,
    player: &mut Player,
) -> StorageResult<Option<String>> {
    if !target.is_mating {
        return Ok(None);
    }

    let odds = game.config().rare_egg;
    if !game.dice().chance(odds.appear_percent) {
        return Ok(None);
    }
    if !game.dice().chance(odds.success_percent) {
        return Ok(Some(format!(
            "A mysterious rare egg appeared for {shooter}... but it cracked and vanished!"
        )));
    }

    let scope = game.scope().clone();
    let name = canonical_name(shooter);
    let eggs = game.store().add_eggs(scope.clone(), name.clone(), 1).await?;
    let rare = game.store().add_rare_eggs(scope, name, 1).await?;
    player.points += odds.point_bonus;

    Ok(Some(format!(
        "WOW! {shooter} collected a LEGENDARY rare egg! +{} points with +1 egg | Eggs: {} (Rare: {}) | Points: {}",
        group_thousands(odds.point_bonus),
        group_thousands(eggs),
        group_thousands(rare),
        group_thousands(player.points)
    )))
}

/// `!eggs`: report the caller's egg totals.
pub async fn egg_balance(game: &Game, caller: &str) -> StorageResult<String> {
    let scope = game.scope().clone();
    let name = canonical_name(caller);
    let eggs = game.store().get_eggs(scope.clone(), name.clone()).await?;
    let rare = game.store().get_rare_eggs(scope, name).await?;
    Ok(format!(
        "{caller} has {} egg(s) total, including {} rare egg(s)",
        group_thousands(eggs),
        group_thousands(rare)
    ))
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use tokio::time::Instant;

    use super::*;
    use crate::{
        config::{GameConfig, RareEggConfig},
        dao::{
            models::PlayerScope,
            player_store::{PlayerStore, memory::MemoryPlayerStore},
        },
        state::{chat::RecordingSink, pigeon::Pigeon, pigeon::SPECIES, roster::PlayerRegistry},
    };

    const TRIALS: usize = 2_000;

    fn kept_values(kind: PigeonKind) -> HashSet<i64> {
        let dice = Dice::seeded(99);
        let base = base_eggs(kind);
        (0..TRIALS)
            .map(|_| {
                let outcome = crack(kind, &dice);
                assert_eq!(outcome.kept + outcome.cracked, base);
                outcome.kept
            })
            .collect()
    }

    #[test]
    fn cartel_eggs_always_crack() {
        let dice = Dice::seeded(1);
        for _ in 0..TRIALS {
            assert_eq!(
                crack(PigeonKind::CartelMember, &dice),
                CrackOutcome { kept: 0, cracked: 1 }
            );
        }
    }

    #[test]
    fn white_keeps_zero_or_one() {
        assert_eq!(kept_values(PigeonKind::White), HashSet::from([0, 1]));
    }

    #[test]
    fn boss_keeps_zero_to_four() {
        assert_eq!(kept_values(PigeonKind::Boss), HashSet::from([0, 1, 2, 3, 4]));
    }

    fn game_with(store: &MemoryPlayerStore, rare_egg: RareEggConfig) -> Game {
        let config = GameConfig {
            rare_egg,
            ..GameConfig::default()
        };
        Game::with_dice(
            PlayerScope::new("testnet", "#test"),
            config,
            Arc::new(store.clone()),
            Arc::new(RecordingSink::new()),
            Dice::seeded(4),
        )
    }

    fn target(species: Pigeon, is_mating: bool) -> ActiveTarget {
        ActiveTarget {
            species,
            is_mating,
            spawned_at: Instant::now(),
            spawn_id: 1,
        }
    }

    fn always(appear: u32, success: u32) -> RareEggConfig {
        RareEggConfig {
            appear_percent: appear,
            success_percent: success,
            point_bonus: 500,
        }
    }

    #[tokio::test]
    async fn non_mating_targets_award_nothing() {
        let store = MemoryPlayerStore::new();
        let game = game_with(&store, always(100, 100));
        let mut roster = PlayerRegistry::new();
        let (player, _) = roster.get_or_insert("Shooter");
        let boss = target(SPECIES[1], false);

        assert_eq!(collect_mating_eggs(&game, &boss, "Shooter").await.unwrap(), None);
        assert_eq!(try_rare_egg(&game, &boss, "Shooter", player).await.unwrap(), None);
        assert_eq!(player.points, 0);
        assert!(store.player(game.scope(), "shooter").is_none());
    }

    #[tokio::test]
    async fn cracked_cartel_eggs_report_total_without_writing() {
        let store = MemoryPlayerStore::new();
        let game = game_with(&store, always(0, 0));
        store
            .add_eggs(game.scope().clone(), "shooter".into(), 3)
            .await
            .unwrap();

        let message = collect_mating_eggs(&game, &target(SPECIES[0], true), "Shooter")
            .await
            .unwrap()
            .unwrap();
        assert!(message.contains("No eggs collected"));
        assert!(message.contains("3 egg(s)"));
        assert_eq!(store.get_eggs(game.scope().clone(), "shooter".into()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn boss_eggs_land_in_the_canonical_ledger() {
        let store = MemoryPlayerStore::new();
        let game = game_with(&store, always(0, 0));
        let boss = target(SPECIES[1], true);

        for _ in 0..50 {
            collect_mating_eggs(&game, &boss, "  MixedCase ").await.unwrap();
        }
        let total = store
            .get_eggs(game.scope().clone(), "mixedcase".into())
            .await
            .unwrap();
        assert!(total > 0);
        assert!(total <= 4 * 50);
    }

    #[tokio::test]
    async fn rare_egg_collected_updates_both_ledgers_and_points() {
        let store = MemoryPlayerStore::new();
        let game = game_with(&store, always(100, 100));
        let mut roster = PlayerRegistry::new();
        let (player, _) = roster.get_or_insert("Lucky");
        player.points = 10;

        let message = try_rare_egg(&game, &target(SPECIES[2], true), "Lucky", player)
            .await
            .unwrap()
            .unwrap();

        assert!(message.contains("LEGENDARY"));
        assert_eq!(player.points, 510);
        let row = store.player(game.scope(), "lucky").unwrap();
        assert_eq!(row.eggs, 1);
        assert_eq!(row.rare_eggs, 1);
    }

    #[tokio::test]
    async fn rare_egg_that_vanishes_changes_nothing() {
        let store = MemoryPlayerStore::new();
        let game = game_with(&store, always(100, 0));
        let mut roster = PlayerRegistry::new();
        let (player, _) = roster.get_or_insert("unlucky");

        let message = try_rare_egg(&game, &target(SPECIES[2], true), "unlucky", player)
            .await
            .unwrap()
            .unwrap();

        assert!(message.contains("vanished"));
        assert_eq!(player.points, 0);
        assert!(store.player(game.scope(), "unlucky").is_none());
    }

    #[tokio::test]
    async fn rare_egg_that_never_appears_is_silent() {
        let store = MemoryPlayerStore::new();
        let game = game_with(&store, always(0, 100));
        let mut roster = PlayerRegistry::new();
        let (player, _) = roster.get_or_insert("nobody");
        assert_eq!(
            try_rare_egg(&game, &target(SPECIES[0], true), "nobody", player)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn balance_reads_both_counters() {
        let store = MemoryPlayerStore::new();
        let game = game_with(&store, always(0, 0));
        store.add_eggs(game.scope().clone(), "eggy".into(), 1_200).await.unwrap();
        store.add_rare_eggs(game.scope().clone(), "eggy".into(), 2).await.unwrap();

        let line = egg_balance(&game, "Eggy").await.unwrap();
        assert_eq!(line, "Eggy has 1,200 egg(s) total, including 2 rare egg(s)");
    }
}
