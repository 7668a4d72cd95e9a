//! Tactical combat engine
//!
//! One instance per battle: setup -> active -> completed.
//!
//! Turn order is fixed at start by initiative. Each turn the active unit
//! gets its full action point pool and spends it through `execute_action`;
//! the turn ends when the pool is empty. Victory is evaluated at every turn
//! end, then the next living unit in circular order takes over.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::combat::state::{
    ActionKind, ActionOutcome, ActionRecord, CombatAction, CombatState, CombatStatus, TurnInfo, TurnPhase,
    VictoryCondition, VictoryStatus,
};
use crate::combat::unit::{CombatUnit, CombatUnitId, StatusEffect, TurnState};
use crate::core::config::TacticalConfig;
use crate::core::error::{Result, WarError};
use crate::core::types::CampaignId;
use crate::events::GameEvent;

pub struct TacticalEngine<R: Rng = ChaCha8Rng> {
    config: TacticalConfig,
    state: CombatState,
    rng: R,
    events: Vec<GameEvent>,
}

impl<R: Rng> TacticalEngine<R> {
    /// Assemble a battle in `Setup` from already-derived units
    pub fn new(units: Vec<CombatUnit>, config: TacticalConfig, rng: R) -> Self {
        let mut conditions = vec![VictoryCondition::EliminateOpposition];
        if let Some(limit) = config.max_turns {
            conditions.push(VictoryCondition::TurnLimit(limit));
        }
        Self {
            config,
            state: CombatState::new(units, conditions),
            rng,
            events: Vec::new(),
        }
    }

    pub fn with_campaign(mut self, campaign: CampaignId) -> Self {
        self.state.campaign_id = Some(campaign);
        self
    }

    pub fn state(&self) -> &CombatState {
        &self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state.status == CombatStatus::Completed
    }

    pub fn outcome(&self) -> VictoryStatus {
        self.state.victory.status
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Fix turn order and hand the first turn to the fastest living unit
    pub fn start_combat(&mut self) -> Result<()> {
        if self.state.units.is_empty() {
            return Err(WarError::NoCombatUnits);
        }
        if self.state.status != CombatStatus::Setup {
            return Ok(());
        }

        let mut order: Vec<&CombatUnit> = self.state.units.iter().collect();
        order.sort_by_key(|u| Reverse(OrderedFloat(u.initiative)));
        self.state.turn_order = order.into_iter().map(|u| u.id).collect();
        self.state.status = CombatStatus::Active;

        info!(
            battle = %self.state.battle_id.0,
            units = self.state.units.len(),
            "combat started"
        );

        let first = self
            .state
            .turn_order
            .iter()
            .copied()
            .find(|id| self.state.unit(*id).is_some_and(|u| u.is_alive()));

        match first {
            Some(id) => self.begin_turn(id, 1, 1),
            None => {
                self.complete(VictoryStatus::Draw);
                Ok(())
            }
        }
    }

    /// Spend action points on behalf of the active unit.
    ///
    /// `Ok(false)` means the action was rejected and nothing changed.
    pub fn execute_action(&mut self, action: CombatAction) -> Result<bool> {
        if self.state.status != CombatStatus::Active {
            return Ok(false);
        }
        let Some(turn) = self.state.current_turn.as_ref() else {
            return Ok(false);
        };
        let actor_id = turn.active_unit;
        let turn_number = turn.turn_number;
        let actor_idx = self.index_of(actor_id)?;

        let actor = &self.state.units[actor_idx];
        if !actor.is_alive() || action.cost > actor.action_points {
            return Ok(false);
        }
        let available = actor.action_points;

        let spent = match action.kind {
            ActionKind::Wait => available,
            _ => action.cost,
        };

        let outcome = match action.kind {
            ActionKind::Move { to } => {
                let actor = &mut self.state.units[actor_idx];
                let from = actor.position;
                actor.position = to;
                ActionOutcome::Moved { from, to }
            }
            ActionKind::Attack { target } => {
                let victim_idx = match self.state.unit_index(target) {
                    Some(idx) if idx != actor_idx && self.state.units[idx].is_alive() => idx,
                    _ => return Ok(false),
                };
                let amount = self.roll_damage();
                let victim = &mut self.state.units[victim_idx];
                let killed = victim.apply_damage(amount);
                ActionOutcome::Damaged {
                    target,
                    amount,
                    remaining_health: victim.health,
                    killed,
                }
            }
            ActionKind::Defend => {
                self.state.units[actor_idx].add_effect(StatusEffect::Defending);
                ActionOutcome::Defending
            }
            ActionKind::Wait => ActionOutcome::Waited,
        };

        let remaining = {
            let actor = &mut self.state.units[actor_idx];
            actor.action_points -= spent;
            actor.action_points
        };

        let record = ActionRecord {
            turn_number,
            actor: actor_id,
            action,
            points_spent: spent,
            outcome,
        };
        if let Some(turn) = self.state.current_turn.as_mut() {
            turn.remaining_action_points = remaining;
            turn.actions.push(record);
        }
        self.state.action_history.push(record);

        let battle = self.state.battle_id;
        debug!(actor = actor_id.0, ?outcome, remaining, "action executed");
        self.events.push(GameEvent::ActionExecuted { battle, record });

        let mut side_wiped = false;
        if let ActionOutcome::Damaged { target, killed: true, .. } = outcome {
            info!(unit = target.0, "unit eliminated");
            self.events.push(GameEvent::UnitEliminated { battle, unit: target });
            side_wiped = self.state.evaluate_victory() != VictoryStatus::Ongoing;
        }
        self.events.push(GameEvent::StateUpdated { battle });

        if remaining == 0 || side_wiped {
            self.end_turn()?;
        }
        Ok(true)
    }

    fn roll_damage(&mut self) -> i32 {
        let (min, max) = (self.config.damage_min, self.config.damage_max);
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    fn index_of(&self, id: CombatUnitId) -> Result<usize> {
        self.state.unit_index(id).ok_or(WarError::UnknownUnit(id))
    }

    fn begin_turn(&mut self, id: CombatUnitId, turn_number: u32, round: u32) -> Result<()> {
        let idx = self.index_of(id)?;
        let unit = &mut self.state.units[idx];
        unit.action_points = unit.max_action_points;
        unit.clear_effect(StatusEffect::Defending);
        let points = unit.action_points;

        self.state.current_turn = Some(TurnInfo {
            turn_number,
            round,
            phase: TurnPhase::Action,
            active_unit: id,
            remaining_action_points: points,
            actions: Vec::new(),
            time_limit_secs: self.config.turn_time_limit_secs,
        });

        let battle = self.state.battle_id;
        debug!(unit = id.0, turn_number, round, "turn started");
        self.events.push(GameEvent::TurnStarted { battle, unit: id, turn_number });
        self.events.push(GameEvent::StateUpdated { battle });
        Ok(())
    }

    fn end_turn(&mut self) -> Result<()> {
        let Some(turn) = self.state.current_turn.as_mut() else {
            return Ok(());
        };
        turn.phase = TurnPhase::Ended;
        let (active, turn_number, round) = (turn.active_unit, turn.turn_number, turn.round);

        let idx = self.index_of(active)?;
        let unit = &mut self.state.units[idx];
        if unit.is_alive() {
            unit.turn_state = TurnState::Acted;
        }

        let status = self.state.evaluate_victory();
        if status != VictoryStatus::Ongoing {
            self.complete(status);
            return Ok(());
        }
        if self.state.turn_limit().is_some_and(|limit| turn_number >= limit) {
            self.complete(VictoryStatus::Draw);
            return Ok(());
        }

        self.advance_turn(active, turn_number, round)
    }

    /// Hand the turn to the next living unit after `current`, wrapping around
    fn advance_turn(&mut self, current: CombatUnitId, turn_number: u32, round: u32) -> Result<()> {
        let len = self.state.turn_order.len();
        let start = self.state.turn_order.iter().position(|id| *id == current).unwrap_or(0);

        for step in 1..=len {
            let pos = (start + step) % len;
            let id = self.state.turn_order[pos];
            let idx = self.index_of(id)?;
            if !self.state.units[idx].is_alive() {
                continue;
            }

            let wrapped = start + step >= len;
            let round = if wrapped {
                for unit in self.state.units.iter_mut().filter(|u| u.is_alive()) {
                    unit.turn_state = TurnState::Pending;
                }
                round + 1
            } else {
                round
            };
            return self.begin_turn(id, turn_number + 1, round);
        }

        self.complete(VictoryStatus::Draw);
        Ok(())
    }

    fn complete(&mut self, status: VictoryStatus) {
        self.state.status = CombatStatus::Completed;
        self.state.victory.status = status;
        self.state.current_turn = None;

        let battle = self.state.battle_id;
        info!(battle = %battle.0, ?status, actions = self.state.action_history.len(), "combat ended");
        self.events.push(GameEvent::CombatEnded { battle, outcome: status });
        self.events.push(GameEvent::StateUpdated { battle });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Character, CharacterClass, CharacterStats, ClassModifierTable};
    use crate::combat::unit::UnitCondition;
    use crate::core::types::{Faction, Vec2};
    use crate::events::EventKind;
    use rand::SeedableRng;

    fn unit(id: u32, faction: Faction, agility: u32, health: u32) -> CombatUnit {
        let character = Character::new(format!("Unit {}", id), CharacterClass::Warrior)
            .with_stats(CharacterStats { strength: 10, agility, intelligence: 10, endurance: 10 })
            .with_health(health, 100);
        let mut rng = ChaCha8Rng::seed_from_u64(id as u64);
        CombatUnit::from_character(
            CombatUnitId(id),
            &character,
            faction,
            Vec2::ZERO,
            &ClassModifierTable::default(),
            10.0,
            &mut rng,
        )
    }

    fn engine(units: Vec<CombatUnit>) -> TacticalEngine {
        TacticalEngine::new(units, TacticalConfig::default(), ChaCha8Rng::seed_from_u64(3))
    }

    fn duel(enemy_health: u32) -> TacticalEngine {
        let mut e = engine(vec![
            unit(1, Faction::Player, 50, 100),
            unit(2, Faction::Enemy, 0, enemy_health),
        ]);
        e.start_combat().unwrap();
        e
    }

    fn active(e: &TacticalEngine) -> CombatUnitId {
        e.state().current_turn.as_ref().unwrap().active_unit
    }

    #[test]
    fn test_start_requires_units() {
        let mut e = engine(Vec::new());
        assert!(matches!(e.start_combat(), Err(WarError::NoCombatUnits)));
        assert_eq!(e.state().status, CombatStatus::Setup);
    }

    #[test]
    fn test_turn_order_by_initiative() {
        let e = duel(100);
        assert_eq!(e.state().turn_order, vec![CombatUnitId(1), CombatUnitId(2)]);
        assert_eq!(e.state().status, CombatStatus::Active);
        assert_eq!(active(&e), CombatUnitId(1));
        assert_eq!(e.state().current_turn.as_ref().unwrap().remaining_action_points, 6);
    }

    #[test]
    fn test_attack_deals_damage_in_range() {
        let mut e = duel(100);
        assert!(e.execute_action(CombatAction::attack(CombatUnitId(2))).unwrap());

        let target = e.state().unit(CombatUnitId(2)).unwrap();
        let dealt = 100 - target.health;
        assert!((10..=25).contains(&dealt), "dealt {}", dealt);
        assert_eq!(e.state().active_unit().unwrap().action_points, 4);
        assert_eq!(e.state().current_turn.as_ref().unwrap().remaining_action_points, 4);
        assert_eq!(e.state().action_history.len(), 1);
    }

    #[test]
    fn test_lethal_attack_wins() {
        let mut e = duel(5);
        assert!(e.execute_action(CombatAction::attack(CombatUnitId(2))).unwrap());

        assert_eq!(e.state().unit(CombatUnitId(2)).unwrap().condition(), UnitCondition::Dead);
        assert!(e.is_completed());
        assert_eq!(e.outcome(), VictoryStatus::PlayerVictory);

        let kinds: Vec<_> = e.drain_events().iter().map(|ev| ev.kind()).collect();
        assert!(kinds.contains(&EventKind::UnitEliminated));
        assert!(kinds.contains(&EventKind::CombatEnded));
    }

    #[test]
    fn test_attack_only_hurts_the_target() {
        let mut e = engine(vec![
            unit(1, Faction::Player, 50, 100),
            unit(2, Faction::Enemy, 0, 100),
            unit(3, Faction::Enemy, 0, 100),
        ]);
        e.start_combat().unwrap();

        assert!(e.execute_action(CombatAction::attack(CombatUnitId(3))).unwrap());

        assert_eq!(e.state().unit(CombatUnitId(1)).unwrap().health, 100);
        assert_eq!(e.state().unit(CombatUnitId(2)).unwrap().health, 100);
        assert!(e.state().unit(CombatUnitId(3)).unwrap().health < 100);
        match e.state().action_history[0].outcome {
            ActionOutcome::Damaged { target, .. } => assert_eq!(target, CombatUnitId(3)),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_overspend_rejected_without_mutation() {
        let mut e = duel(100);
        let action = CombatAction::new(ActionKind::Attack { target: CombatUnitId(2) }, 7);
        assert!(!e.execute_action(action).unwrap());
        assert_eq!(e.state().active_unit().unwrap().action_points, 6);
        assert!(e.state().action_history.is_empty());
        assert_eq!(e.state().unit(CombatUnitId(2)).unwrap().health, 100);
    }

    #[test]
    fn test_attack_on_dead_or_missing_target_rejected() {
        let mut e = engine(vec![
            unit(1, Faction::Player, 50, 100),
            unit(2, Faction::Enemy, 0, 0),
            unit(3, Faction::Enemy, 0, 100),
        ]);
        e.start_combat().unwrap();

        assert!(!e.execute_action(CombatAction::attack(CombatUnitId(2))).unwrap());
        assert!(!e.execute_action(CombatAction::attack(CombatUnitId(42))).unwrap());
        assert!(!e.execute_action(CombatAction::attack(CombatUnitId(1))).unwrap());
        assert!(e.state().action_history.is_empty());
    }

    #[test]
    fn test_spending_all_points_ends_turn() {
        let mut e = duel(100);
        for _ in 0..6 {
            assert!(e.execute_action(CombatAction::move_to(Vec2::new(1.0, 0.0))).unwrap());
        }
        assert_eq!(active(&e), CombatUnitId(2));
        assert_eq!(e.state().current_turn.as_ref().unwrap().turn_number, 2);
        assert_eq!(e.state().unit(CombatUnitId(1)).unwrap().turn_state, TurnState::Acted);
    }

    #[test]
    fn test_wait_ends_turn_and_rounds_wrap() {
        let mut e = duel(100);
        assert!(e.execute_action(CombatAction::wait()).unwrap());
        assert_eq!(active(&e), CombatUnitId(2));
        assert!(e.execute_action(CombatAction::wait()).unwrap());

        let turn = e.state().current_turn.as_ref().unwrap();
        assert_eq!(turn.active_unit, CombatUnitId(1));
        assert_eq!(turn.round, 2);
        assert_eq!(e.state().unit(CombatUnitId(2)).unwrap().turn_state, TurnState::Pending);
    }

    #[test]
    fn test_defend_sets_effect_until_next_turn() {
        let mut e = duel(100);
        assert!(e.execute_action(CombatAction::defend()).unwrap());
        assert!(e.state().unit(CombatUnitId(1)).unwrap().has_effect(StatusEffect::Defending));

        e.execute_action(CombatAction::wait()).unwrap();
        assert!(e.state().unit(CombatUnitId(1)).unwrap().has_effect(StatusEffect::Defending));
        e.execute_action(CombatAction::wait()).unwrap();
        assert!(!e.state().unit(CombatUnitId(1)).unwrap().has_effect(StatusEffect::Defending));
    }

    #[test]
    fn test_dead_units_skipped() {
        let mut e = engine(vec![
            unit(1, Faction::Player, 50, 100),
            unit(2, Faction::Enemy, 30, 0),
            unit(3, Faction::Enemy, 0, 100),
        ]);
        e.start_combat().unwrap();
        assert_eq!(e.state().turn_order.len(), 3);

        e.execute_action(CombatAction::wait()).unwrap();
        assert_eq!(active(&e), CombatUnitId(3));
    }

    #[test]
    fn test_completed_rejects_actions() {
        let mut e = duel(1);
        e.execute_action(CombatAction::attack(CombatUnitId(2))).unwrap();
        assert!(e.is_completed());
        assert!(!e.execute_action(CombatAction::wait()).unwrap());
        assert!(e.state().current_turn.is_none());
    }

    #[test]
    fn test_turn_limit_draw() {
        let config = TacticalConfig { max_turns: Some(2), ..TacticalConfig::default() };
        let mut e = TacticalEngine::new(
            vec![unit(1, Faction::Player, 50, 100), unit(2, Faction::Enemy, 0, 100)],
            config,
            ChaCha8Rng::seed_from_u64(9),
        );
        e.start_combat().unwrap();
        e.execute_action(CombatAction::wait()).unwrap();
        e.execute_action(CombatAction::wait()).unwrap();
        assert!(e.is_completed());
        assert_eq!(e.outcome(), VictoryStatus::Draw);
    }

    #[test]
    fn test_same_seed_same_battle() {
        let run = || {
            let mut e = duel(100);
            for _ in 0..3 {
                e.execute_action(CombatAction::attack(CombatUnitId(2))).unwrap();
            }
            e.state().unit(CombatUnitId(2)).unwrap().health
        };
        assert_eq!(run(), run());
    }
}
