//! Tactical combat integration tests

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use warfront::character::{Character, CharacterClass, CharacterStats, ClassModifierTable};
use warfront::combat::*;
use warfront::core::{Faction, TacticalConfig, Vec2};
use warfront::events::{EventKind, GameEvent};

fn unit(id: u32, faction: Faction, agility: u32, health: u32) -> CombatUnit {
    let character = Character::new(format!("Unit {}", id), CharacterClass::Warrior)
        .with_stats(CharacterStats { strength: 10, agility, intelligence: 10, endurance: 10 })
        .with_health(health, 100);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    CombatUnit::from_character(
        CombatUnitId(id),
        &character,
        faction,
        Vec2::new(id as f32, 0.0),
        &ClassModifierTable::default(),
        0.0,
        &mut rng,
    )
}

fn duel(enemy_health: u32, config: TacticalConfig, seed: u64) -> TacticalEngine {
    let mut engine = TacticalEngine::new(
        vec![unit(1, Faction::Player, 30, 100), unit(2, Faction::Enemy, 10, enemy_health)],
        config,
        ChaCha8Rng::seed_from_u64(seed),
    );
    engine.start_combat().unwrap();
    engine
}

#[test]
fn test_attack_damage_within_range() {
    let mut engine = duel(100, TacticalConfig::default(), 11);
    assert_eq!(engine.state().active_unit().unwrap().id, CombatUnitId(1));
    assert_eq!(engine.state().active_unit().unwrap().max_action_points, 6);

    assert!(engine.execute_action(CombatAction::attack(CombatUnitId(2))).unwrap());

    let target = engine.state().unit(CombatUnitId(2)).unwrap();
    let dealt = 100 - target.health;
    assert!((10..=25).contains(&dealt), "dealt {}", dealt);
    assert_eq!(engine.state().active_unit().unwrap().action_points, 4);
}

#[test]
fn test_lethal_attack_ends_in_player_victory() {
    let mut engine = duel(5, TacticalConfig::default(), 1);

    assert!(engine.execute_action(CombatAction::attack(CombatUnitId(2))).unwrap());

    let target = engine.state().unit(CombatUnitId(2)).unwrap();
    assert!(target.health <= 0);
    assert_eq!(target.turn_state, TurnState::Dead);
    assert_eq!(target.condition(), UnitCondition::Dead);
    assert!(engine.is_completed());
    assert_eq!(engine.outcome(), VictoryStatus::PlayerVictory);

    let events = engine.drain_events();
    assert!(events.iter().any(|e| e.kind() == EventKind::UnitEliminated));
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::CombatEnded { outcome: VictoryStatus::PlayerVictory, .. }
    )));
}

#[test]
fn test_unaffordable_action_leaves_state_untouched() {
    let mut engine = duel(100, TacticalConfig::default(), 2);
    let action = CombatAction::new(ActionKind::Attack { target: CombatUnitId(2) }, 7);

    assert!(!engine.execute_action(action).unwrap());

    let actor = engine.state().active_unit().unwrap();
    assert_eq!(actor.action_points, 6);
    assert!(engine.state().action_history.is_empty());
    assert_eq!(engine.state().unit(CombatUnitId(2)).unwrap().health, 100);
}

#[test]
fn test_actions_rejected_after_completion() {
    let mut engine = duel(1, TacticalConfig::default(), 3);
    engine.execute_action(CombatAction::attack(CombatUnitId(2))).unwrap();
    assert!(engine.is_completed());

    let history = engine.state().action_history.len();
    assert!(!engine.execute_action(CombatAction::defend()).unwrap());
    assert!(!engine.execute_action(CombatAction::wait()).unwrap());
    assert_eq!(engine.state().action_history.len(), history);
}

#[test]
fn test_spending_all_points_passes_the_turn() {
    let mut engine = duel(100, TacticalConfig::default(), 4);

    for _ in 0..3 {
        assert!(engine.execute_action(CombatAction::move_to(Vec2::new(0.0, 1.0))).unwrap());
    }
    assert_eq!(engine.state().active_unit().unwrap().id, CombatUnitId(1));
    assert!(engine.execute_action(CombatAction::defend()).unwrap());
    assert!(engine.execute_action(CombatAction::attack(CombatUnitId(2))).unwrap());

    let turn = engine.state().current_turn.as_ref().unwrap();
    assert_eq!(turn.active_unit, CombatUnitId(2));
    assert_eq!(turn.turn_number, 2);
    assert_eq!(turn.remaining_action_points, 6);
    assert_eq!(engine.state().unit(CombatUnitId(1)).unwrap().turn_state, TurnState::Acted);
}

#[test]
fn test_wait_ends_turn_and_rounds_wrap() {
    let mut engine = duel(100, TacticalConfig::default(), 5);

    assert!(engine.execute_action(CombatAction::wait()).unwrap());
    assert!(engine.execute_action(CombatAction::wait()).unwrap());

    let turn = engine.state().current_turn.as_ref().unwrap();
    assert_eq!(turn.active_unit, CombatUnitId(1));
    assert_eq!(turn.round, 2);
    assert!(engine.state().units.iter().all(|u| u.turn_state == TurnState::Pending));
}

#[test]
fn test_defending_lasts_until_own_next_turn() {
    let mut engine = duel(100, TacticalConfig::default(), 6);

    engine.execute_action(CombatAction::defend()).unwrap();
    engine.execute_action(CombatAction::wait()).unwrap();
    assert!(engine.state().unit(CombatUnitId(1)).unwrap().has_effect(StatusEffect::Defending));

    // Enemy turn passes, the defender's next turn clears the stance
    engine.execute_action(CombatAction::wait()).unwrap();
    assert!(!engine.state().unit(CombatUnitId(1)).unwrap().has_effect(StatusEffect::Defending));
}

#[test]
fn test_attack_on_invalid_target_rejected() {
    let mut engine = duel(100, TacticalConfig::default(), 7);

    assert!(!engine.execute_action(CombatAction::attack(CombatUnitId(1))).unwrap());
    assert!(!engine.execute_action(CombatAction::attack(CombatUnitId(42))).unwrap());
    assert_eq!(engine.state().active_unit().unwrap().action_points, 6);
}

#[test]
fn test_turn_order_skips_the_dead() {
    let mut engine = TacticalEngine::new(
        vec![
            unit(1, Faction::Player, 40, 100),
            unit(2, Faction::Enemy, 30, 1),
            unit(3, Faction::Enemy, 20, 100),
        ],
        TacticalConfig::default(),
        ChaCha8Rng::seed_from_u64(8),
    );
    engine.start_combat().unwrap();
    let order = engine.state().turn_order.clone();
    assert_eq!(order, vec![CombatUnitId(1), CombatUnitId(2), CombatUnitId(3)]);

    engine.execute_action(CombatAction::attack(CombatUnitId(2))).unwrap();
    engine.execute_action(CombatAction::wait()).unwrap();

    assert_eq!(engine.state().active_unit().unwrap().id, CombatUnitId(3));
    assert_eq!(engine.state().turn_order, order);
}

#[test]
fn test_turn_cap_ends_in_draw() {
    let config = TacticalConfig {
        max_turns: Some(3),
        ..Default::default()
    };
    let mut engine = duel(100, config, 9);

    for _ in 0..3 {
        assert!(engine.execute_action(CombatAction::wait()).unwrap());
    }
    assert!(engine.is_completed());
    assert_eq!(engine.outcome(), VictoryStatus::Draw);
}

#[test]
fn test_time_limit_is_reported_not_enforced() {
    let config = TacticalConfig {
        turn_time_limit_secs: 5,
        ..Default::default()
    };
    let engine = duel(100, config, 10);
    assert_eq!(engine.state().current_turn.as_ref().unwrap().time_limit_secs, 5);
}

#[test]
fn test_same_seed_same_battle() {
    let play = |seed| {
        let mut engine = duel(100, TacticalConfig::default(), seed);
        let mut steps = 0;
        while let Some(action) = ai::choose_action(engine.state()) {
            engine.execute_action(action).unwrap();
            steps += 1;
            assert!(steps < 1000);
        }
        let health: Vec<_> = engine.state().units.iter().map(|u| u.health).collect();
        (engine.outcome(), engine.state().action_history.len(), health)
    };

    assert_eq!(play(77), play(77));
}

#[test]
fn test_start_without_units_is_fatal() {
    let mut engine = TacticalEngine::new(Vec::new(), TacticalConfig::default(), ChaCha8Rng::seed_from_u64(1));
    assert!(engine.start_combat().is_err());
}

#[test]
fn test_event_stream_for_a_turn() {
    let mut engine = duel(100, TacticalConfig::default(), 12);
    let opening = engine.drain_events();
    assert!(matches!(
        opening.first(),
        Some(GameEvent::TurnStarted { unit: CombatUnitId(1), turn_number: 1, .. })
    ));

    engine.execute_action(CombatAction::wait()).unwrap();
    let kinds: Vec<_> = engine.drain_events().iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::ActionExecuted,
            EventKind::StateUpdated,
            EventKind::TurnStarted,
            EventKind::StateUpdated,
        ]
    );
}
