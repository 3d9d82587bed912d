//! Player abilities: melee, ranged, area spell and self heal
//!
//! Every ability runs the same gate: live player, exploring, this ability's
//! cooldown elapsed, then the mana cost. Only a successful gate records the
//! cooldown and spends mana.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::dice::Dice;
use super::feedback::{FeedbackColor, PresentationSink};
use super::projectile;
use super::state::{Enemy, GameState, Player};
use crate::consts::*;

/// The canonical ability table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    Melee,
    Ranged,
    Spell,
    Heal,
}

impl AbilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbilityKind::Melee => "melee",
            AbilityKind::Ranged => "ranged",
            AbilityKind::Spell => "spell",
            AbilityKind::Heal => "heal",
        }
    }

    pub fn mana_cost(&self) -> f32 {
        match self {
            AbilityKind::Melee => 0.0,
            AbilityKind::Ranged => RANGED_MANA_COST,
            AbilityKind::Spell => SPELL_MANA_COST,
            AbilityKind::Heal => HEAL_MANA_COST,
        }
    }

    pub fn cooldown_ms(&self, player: &Player) -> f64 {
        match self {
            AbilityKind::Melee => player.attack_cooldown_ms,
            AbilityKind::Ranged => RANGED_COOLDOWN_MS,
            AbilityKind::Spell => SPELL_COOLDOWN_MS,
            AbilityKind::Heal => HEAL_COOLDOWN_MS,
        }
    }
}

/// Result of an ability request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbilityOutcome {
    /// Ability went off. `amount` is total damage dealt (or HP restored for heal).
    Fired { hits: usize, amount: f32, crit: bool },
    /// Not enough mana; nothing happened except feedback
    InsufficientResource,
    /// Still on cooldown; silently ignored
    CoolingDown,
    /// No player, or not exploring
    Unavailable,
}

impl AbilityOutcome {
    pub fn fired(&self) -> bool {
        matches!(self, AbilityOutcome::Fired { .. })
    }
}

/// Run the shared gate. On success the cooldown is recorded and mana spent.
fn gate(
    state: &mut GameState,
    ability: AbilityKind,
    now: f64,
    sink: &mut dyn PresentationSink,
) -> Result<(), AbilityOutcome> {
    let exploring = state.is_exploring();
    let Some(player) = state.player.as_mut() else {
        log::warn!("{} requested with no player", ability.as_str());
        return Err(AbilityOutcome::Unavailable);
    };
    if !exploring {
        return Err(AbilityOutcome::Unavailable);
    }

    if !player.cooldowns.ready(ability, now, ability.cooldown_ms(player)) {
        return Err(AbilityOutcome::CoolingDown);
    }

    if !player.mana.spend(ability.mana_cost()) {
        sink.insufficient_resource(ability, player.pos);
        return Err(AbilityOutcome::InsufficientResource);
    }

    player.cooldowns.mark(ability, now);
    sink.ability_cast(ability, player.pos);
    Ok(())
}

/// Apply `base` damage with a crit roll to one enemy. Returns (damage, crit).
pub(crate) fn strike_enemy(
    enemy: &mut Enemy,
    base: f32,
    dice: &mut Dice,
    sink: &mut dyn PresentationSink,
) -> (f32, bool) {
    let (mult, crit) = dice.crit();
    let dealt = enemy.hp.drain(base * mult);
    let color = if crit {
        sink.critical_hit(enemy.pos);
        FeedbackColor::Crit
    } else {
        FeedbackColor::Damage
    };
    sink.floating_number(enemy.pos, &format!("{}", dealt.round()), color);
    (dealt, crit)
}

/// Refund mana for a landed melee/projectile hit
pub(crate) fn refund_hit(player: &mut Player, sink: &mut dyn PresentationSink) {
    let restored = player.mana.restore(MANA_REFUND_PER_HIT);
    if restored > 0.0 {
        sink.floating_number(player.pos, &format!("+{}", restored.round()), FeedbackColor::Mana);
    }
}

/// Melee swing at the nearest enemy within attack range
pub fn melee_attack(
    state: &mut GameState,
    now: f64,
    sink: &mut dyn PresentationSink,
) -> AbilityOutcome {
    if let Err(outcome) = gate(state, AbilityKind::Melee, now, sink) {
        return outcome;
    }
    let Some(player) = state.player.as_mut() else {
        return AbilityOutcome::Unavailable;
    };

    let base = player.attack_damage * player.modifiers().melee;
    let target = state
        .enemies
        .iter_mut()
        .filter(|e| !e.is_dead())
        .map(|e| (e.pos.distance(player.pos), e))
        .filter(|(d, _)| *d <= player.attack_range)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, e)| e);

    let outcome = match target {
        Some(enemy) => {
            let (dealt, crit) = strike_enemy(enemy, base, &mut state.dice, sink);
            refund_hit(player, sink);
            AbilityOutcome::Fired {
                hits: 1,
                amount: dealt,
                crit,
            }
        }
        None => AbilityOutcome::Fired {
            hits: 0,
            amount: 0.0,
            crit: false,
        },
    };

    state.reap_dead_enemies(sink);
    outcome
}

/// Fire a projectile from the player toward `target`
pub fn ranged_attack(
    state: &mut GameState,
    target: Vec2,
    now: f64,
    sink: &mut dyn PresentationSink,
) -> AbilityOutcome {
    if let Err(outcome) = gate(state, AbilityKind::Ranged, now, sink) {
        return outcome;
    }
    let Some(player) = state.player.as_ref() else {
        return AbilityOutcome::Unavailable;
    };

    let origin = player.pos;
    let damage = player.ranged_damage * player.modifiers().ranged;
    projectile::spawn(state, origin, target, damage);

    // Damage lands later, on collision
    AbilityOutcome::Fired {
        hits: 0,
        amount: 0.0,
        crit: false,
    }
}

/// Area spell: damages every enemy within `SPELL_RADIUS` of the player
pub fn cast_spell(
    state: &mut GameState,
    now: f64,
    sink: &mut dyn PresentationSink,
) -> AbilityOutcome {
    if let Err(outcome) = gate(state, AbilityKind::Spell, now, sink) {
        return outcome;
    }
    let Some(player) = state.player.as_ref() else {
        return AbilityOutcome::Unavailable;
    };

    let center = player.pos;
    let base = player.spell_damage * player.modifiers().spell;
    let mut hits = 0;
    let mut total = 0.0;
    let mut any_crit = false;

    for enemy in state
        .enemies
        .iter_mut()
        .filter(|e| !e.is_dead() && e.pos.distance(center) <= SPELL_RADIUS)
    {
        let variance = state
            .dice
            .range(1.0 - SPELL_VARIANCE, 1.0 + SPELL_VARIANCE);
        let (dealt, crit) = strike_enemy(enemy, base * variance, &mut state.dice, sink);
        hits += 1;
        total += dealt;
        any_crit |= crit;
    }

    log::debug!("Spell hit {} enemies for {:.1}", hits, total);
    state.reap_dead_enemies(sink);
    AbilityOutcome::Fired {
        hits,
        amount: total,
        crit: any_crit,
    }
}

/// Self heal
pub fn heal(state: &mut GameState, now: f64, sink: &mut dyn PresentationSink) -> AbilityOutcome {
    if let Err(outcome) = gate(state, AbilityKind::Heal, now, sink) {
        return outcome;
    }
    let Some(player) = state.player.as_mut() else {
        return AbilityOutcome::Unavailable;
    };

    let (mult, crit) = state.dice.crit();
    let amount = player.heal_amount * player.modifiers().heal * mult;
    let restored = player.hp.restore(amount);
    if crit {
        sink.critical_hit(player.pos);
    }
    sink.floating_number(player.pos, &format!("+{}", restored.round()), FeedbackColor::Heal);

    AbilityOutcome::Fired {
        hits: 1,
        amount: restored,
        crit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;
    use crate::sim::class::ClassKind;
    use crate::sim::feedback::{EventLog, FeedbackEvent, NullSink};
    use crate::sim::state::RunMode;

    fn exploring_state(class: ClassKind, roll: f32) -> GameState {
        let mut state = GameState::with_dice(Dice::fixed(roll), Difficulty::Normal);
        state.mode = RunMode::Exploring;
        state.player = Some(Player::new("Hero", class));
        state
    }

    fn player(state: &GameState) -> &Player {
        state.player.as_ref().unwrap()
    }

    #[test]
    fn test_melee_hits_nearest_in_range() {
        let mut state = exploring_state(ClassKind::Warrior, 0.5);
        let pos = player(&state).pos;
        let far = state.spawn_enemy_at(pos + Vec2::new(50.0, 0.0));
        let near = state.spawn_enemy_at(pos + Vec2::new(0.0, 30.0));

        let outcome = melee_attack(&mut state, 1000.0, &mut NullSink);
        assert!(outcome.fired());

        let hp = |id| state.enemies.iter().find(|e| e.id == id).unwrap().hp.current();
        assert_eq!(hp(near), ENEMY_HP - 15.0 * 1.5);
        assert_eq!(hp(far), ENEMY_HP);
    }

    #[test]
    fn test_melee_cooldown_is_silent() {
        let mut state = exploring_state(ClassKind::Warrior, 0.5);
        let pos = player(&state).pos;
        state.spawn_enemy_at(pos + Vec2::new(10.0, 0.0));

        assert!(melee_attack(&mut state, 1000.0, &mut NullSink).fired());
        let mut log = EventLog::new();
        assert_eq!(
            melee_attack(&mut state, 1200.0, &mut log),
            AbilityOutcome::CoolingDown
        );
        assert!(log.is_empty());
        assert!(melee_attack(&mut state, 1500.0, &mut log).fired());
    }

    #[test]
    fn test_melee_whiff_still_records_cooldown() {
        let mut state = exploring_state(ClassKind::Warrior, 0.5);
        let outcome = melee_attack(&mut state, 100.0, &mut NullSink);
        assert_eq!(
            outcome,
            AbilityOutcome::Fired {
                hits: 0,
                amount: 0.0,
                crit: false
            }
        );
        assert_eq!(player(&state).cooldowns.melee, Some(100.0));
    }

    #[test]
    fn test_crit_doubles_damage() {
        let mut state = exploring_state(ClassKind::Mage, 0.01);
        let pos = player(&state).pos;
        state.spawn_enemy_at(pos + Vec2::new(10.0, 0.0));

        let mut log = EventLog::new();
        let outcome = melee_attack(&mut state, 0.0, &mut log);
        assert_eq!(
            outcome,
            AbilityOutcome::Fired {
                hits: 1,
                amount: 8.0 * CRIT_MULTIPLIER,
                crit: true
            }
        );
        assert_eq!(log.count(|e| matches!(e, FeedbackEvent::CriticalHit { .. })), 1);
    }

    #[test]
    fn test_killing_blow_removes_enemy() {
        let mut state = exploring_state(ClassKind::Warrior, 0.5);
        let pos = player(&state).pos;
        let id = state.spawn_enemy_at(pos + Vec2::new(10.0, 0.0));
        state.enemies[0].hp.drain(ENEMY_HP - 5.0);

        melee_attack(&mut state, 0.0, &mut NullSink);
        assert!(state.enemies.iter().all(|e| e.id != id));
        assert_eq!(state.kills, 1);
    }

    #[test]
    fn test_ranged_spends_mana_and_spawns_projectile() {
        let mut state = exploring_state(ClassKind::Ranger, 0.5);
        let mana = player(&state).mana.current();
        let target = player(&state).pos + Vec2::new(100.0, 0.0);

        assert!(ranged_attack(&mut state, target, 0.0, &mut NullSink).fired());
        assert_eq!(player(&state).mana.current(), mana - RANGED_MANA_COST);
        assert_eq!(state.projectiles.len(), 1);
        assert!((state.projectiles[0].damage - 14.0 * 1.4).abs() < 1e-4);
        assert!(state.projectiles[0].vel.x > 0.0);
    }

    #[test]
    fn test_spell_only_hits_enemies_in_radius() {
        let mut state = exploring_state(ClassKind::Mage, 0.5);
        let pos = player(&state).pos;
        state.spawn_enemy_at(pos + Vec2::new(SPELL_RADIUS - 1.0, 0.0));
        state.spawn_enemy_at(pos + Vec2::new(0.0, SPELL_RADIUS + 20.0));

        let outcome = cast_spell(&mut state, 0.0, &mut NullSink);
        match outcome {
            AbilityOutcome::Fired { hits, .. } => assert_eq!(hits, 1),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(
            player(&state).mana.current(),
            ClassKind::Mage.base_stats().mana - SPELL_MANA_COST
        );
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut state = exploring_state(ClassKind::Cleric, 0.5);
        state.player.as_mut().unwrap().hp.drain(10.0);

        let outcome = heal(&mut state, 0.0, &mut NullSink);
        assert_eq!(
            outcome,
            AbilityOutcome::Fired {
                hits: 1,
                amount: 10.0,
                crit: false
            }
        );
        assert_eq!(player(&state).hp.current(), player(&state).hp.max());
    }

    #[test]
    fn test_abilities_unavailable_when_paused() {
        let mut state = exploring_state(ClassKind::Warrior, 0.5);
        state.mode = RunMode::Paused;
        assert_eq!(heal(&mut state, 0.0, &mut NullSink), AbilityOutcome::Unavailable);
        assert_eq!(player(&state).cooldowns.heal, None);
    }

    #[test]
    fn test_no_player_is_noop() {
        let mut state = GameState::with_dice(Dice::fixed(0.5), Difficulty::Normal);
        state.mode = RunMode::Exploring;
        assert_eq!(
            cast_spell(&mut state, 0.0, &mut NullSink),
            AbilityOutcome::Unavailable
        );
    }
}
