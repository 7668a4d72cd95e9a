//! Mode orchestrator
//!
//! Owns the STRATEGIC -> TRANSITION -> TACTICAL -> TRANSITION -> STRATEGIC
//! cycle. The strategic engine is paused before a tactical engine exists and
//! only resumed after that engine has completed and been discarded, so the
//! army registry has exactly one writer at any time.

pub mod deploy;
pub mod folding;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::campaign::army::{Army, ArmyId, ArmyStatus, Squad};
use crate::campaign::engine::{StrategicEngine, StrategicGameState};
use crate::combat::ai;
use crate::combat::engine::TacticalEngine;
use crate::combat::state::{CombatAction, CombatState, VictoryStatus};
use crate::core::config::GameConfig;
use crate::core::error::{Result, WarError};
use crate::core::types::{BattleId, CampaignId, Faction, Vec2};
use crate::events::{EventBus, EventKind, GameEvent, SubscriptionId};

pub use deploy::deploy_armies;
pub use folding::{fold_battle, FoldSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Strategic,
    Transition,
    Tactical,
    /// Terminal; every command is rejected
    Stopped,
}

/// The battle currently being fought and who is fighting it
struct ActiveBattle {
    engine: TacticalEngine,
    armies: [ArmyId; 2],
}

/// Summary of the last battle folded back into the campaign
#[derive(Debug, Clone, PartialEq)]
pub struct BattleReport {
    pub battle: BattleId,
    pub armies: [ArmyId; 2],
    pub outcome: VictoryStatus,
    pub summary: FoldSummary,
}

pub struct ModeOrchestrator {
    config: GameConfig,
    mode: GameMode,
    campaign_id: CampaignId,
    strategic: StrategicEngine,
    battle: Option<ActiveBattle>,
    bus: EventBus,
    rng: ChaCha8Rng,
    last_report: Option<BattleReport>,
}

impl ModeOrchestrator {
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self {
            strategic: StrategicEngine::new(config.strategic.clone()),
            config,
            mode: GameMode::Strategic,
            campaign_id: CampaignId::new(),
            battle: None,
            bus: EventBus::new(),
            rng,
            last_report: None,
        })
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    pub fn strategic(&self) -> &StrategicEngine {
        &self.strategic
    }

    pub fn state(&self) -> &StrategicGameState {
        self.strategic.state()
    }

    pub fn army(&self, id: ArmyId) -> Option<&Army> {
        self.strategic.army(id)
    }

    /// State of the running battle, if any
    pub fn combat_state(&self) -> Option<&CombatState> {
        self.battle.as_ref().map(|b| b.engine.state())
    }

    pub fn last_report(&self) -> Option<&BattleReport> {
        self.last_report.as_ref()
    }

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    // === COMMANDS ===

    /// Register a new army. Allowed in every mode except `Stopped`.
    ///
    /// Every squad must bring at least one unit.
    pub fn create_army(&mut self, squads: Vec<Squad>, position: Vec2, faction: Faction) -> Result<ArmyId> {
        if self.mode == GameMode::Stopped {
            return Err(WarError::Stopped);
        }
        if squads.is_empty() {
            return Err(WarError::EmptyArmy);
        }
        if let Some(hollow) = squads.iter().find(|s| s.units.is_empty()) {
            return Err(WarError::EmptySquad(hollow.id));
        }
        let id = self.strategic.spawn_army(squads, position, faction);
        self.flush_strategic();
        Ok(id)
    }

    pub fn move_army(&mut self, id: ArmyId, destination: Vec2) -> bool {
        self.mode == GameMode::Strategic && self.strategic.move_army(id, destination)
    }

    pub fn halt_army(&mut self, id: ArmyId) -> bool {
        self.mode == GameMode::Strategic && self.strategic.halt_army(id)
    }

    pub fn resupply_army(&mut self, id: ArmyId, food: f32, ammunition: f32) -> bool {
        if self.mode != GameMode::Strategic {
            return false;
        }
        let accepted = self.strategic.resupply_army(id, food, ammunition);
        self.flush_strategic();
        accepted
    }

    pub fn pause_strategic(&mut self) {
        if self.mode == GameMode::Strategic {
            self.strategic.pause();
            self.flush_strategic();
        }
    }

    pub fn resume_strategic(&mut self) {
        if self.mode == GameMode::Strategic {
            self.strategic.resume();
            self.flush_strategic();
        }
    }

    /// Enter the terminal mode, discarding any battle in progress
    pub fn stop(&mut self) {
        if self.mode == GameMode::Stopped {
            return;
        }
        if self.battle.take().is_some() {
            warn!("stopping with a battle in progress; result discarded");
        }
        self.strategic.pause();
        self.flush_strategic();
        self.set_mode(GameMode::Stopped);
    }

    /// Feed wall-clock time to the strategic layer and react to what happens
    pub fn update(&mut self, elapsed: f32) -> Result<()> {
        if self.mode != GameMode::Strategic {
            return Ok(());
        }
        self.strategic.advance(elapsed);
        self.process_strategic_events()
    }

    /// Run exactly one strategic tick of `dt` seconds
    pub fn tick(&mut self, dt: f32) -> Result<()> {
        if self.mode != GameMode::Strategic {
            return Ok(());
        }
        self.strategic.tick(dt);
        self.process_strategic_events()
    }

    /// Forward an action to the running battle. `Ok(false)` means rejected.
    pub fn execute_action(&mut self, action: CombatAction) -> Result<bool> {
        if self.mode != GameMode::Tactical {
            return Ok(false);
        }
        let Some(battle) = self.battle.as_mut() else {
            return Ok(false);
        };

        let accepted = battle.engine.execute_action(action)?;
        let completed = battle.engine.is_completed();
        self.flush_tactical();

        if completed {
            self.fold_results();
        }
        Ok(accepted)
    }

    /// Let the built-in AI play the current battle to the end.
    ///
    /// Returns the outcome if the battle finished within `max_actions`.
    pub fn auto_resolve_combat(&mut self, max_actions: usize) -> Result<Option<VictoryStatus>> {
        for _ in 0..max_actions {
            let Some(action) = self.battle.as_ref().and_then(|b| ai::choose_action(b.engine.state())) else {
                break;
            };
            if !self.execute_action(action)? {
                break;
            }
            if self.battle.is_none() {
                return Ok(self.last_report.as_ref().map(|r| r.outcome));
            }
        }
        Ok(None)
    }

    /// Let the AI act for enemy units until a player unit is up or the battle ends
    pub fn play_enemy_turns(&mut self) -> Result<()> {
        loop {
            let Some(state) = self.combat_state() else {
                return Ok(());
            };
            if state.active_unit().map(|u| u.faction) != Some(Faction::Enemy) {
                return Ok(());
            }
            let Some(action) = ai::choose_action(state) else {
                return Ok(());
            };
            if !self.execute_action(action)? {
                return Ok(());
            }
        }
    }

    // === INTERNALS ===

    fn set_mode(&mut self, to: GameMode) {
        let from = self.mode;
        if from == to {
            return;
        }
        self.mode = to;
        info!(?from, ?to, "mode changed");
        self.bus.publish(&GameEvent::ModeChanged { from, to });
    }

    fn flush_strategic(&mut self) {
        for event in self.strategic.drain_events() {
            self.bus.publish(&event);
        }
    }

    fn flush_tactical(&mut self) {
        let Some(battle) = self.battle.as_mut() else {
            return;
        };
        for event in battle.engine.drain_events() {
            self.bus.publish(&event);
        }
    }

    fn process_strategic_events(&mut self) -> Result<()> {
        let mut encounter = None;

        for event in self.strategic.drain_events() {
            self.bus.publish(&event);
            match event {
                GameEvent::ArmyReachedDestination { army, .. } => self.rally_if_retreating(army),
                GameEvent::ArmiesEngaged { army_a, army_b, .. } => encounter = Some((army_a, army_b)),
                _ => {}
            }
        }

        match encounter {
            Some((a, b)) => self.begin_battle(a, b),
            None => Ok(()),
        }
    }

    fn rally_if_retreating(&mut self, id: ArmyId) {
        if let Some(army) = self.strategic.state_mut().armies.get_mut(&id) {
            if army.status == ArmyStatus::Retreating {
                army.status = ArmyStatus::Active;
                info!(army = id.0, "army rallied");
                self.bus.publish(&GameEvent::ArmyRallied { army: id });
            }
        }
    }

    /// Hand an encounter off to a new tactical battle.
    ///
    /// Units are derived before anything is mutated, so a failed deployment
    /// leaves the orchestrator in STRATEGIC with the engine running.
    fn begin_battle(&mut self, a: ArmyId, b: ArmyId) -> Result<()> {
        let first = self.strategic.army(a).ok_or(WarError::UnknownArmy(a))?;
        let second = self.strategic.army(b).ok_or(WarError::UnknownArmy(b))?;
        let units = deploy_armies(first, second, &self.config, &mut self.rng)?;

        self.set_mode(GameMode::Transition);
        self.strategic.pause();
        self.flush_strategic();
        for id in [a, b] {
            if let Some(army) = self.strategic.state_mut().armies.get_mut(&id) {
                army.status = ArmyStatus::Engaged;
            }
        }

        let battle_rng = ChaCha8Rng::seed_from_u64(self.rng.gen());
        let engine = TacticalEngine::new(units, self.config.tactical.clone(), battle_rng).with_campaign(self.campaign_id);
        let battle_id = engine.state().battle_id;
        let unit_count = engine.state().units.len();

        self.bus.publish(&GameEvent::CombatInitiated { battle: battle_id, army_a: a, army_b: b });
        self.battle = Some(ActiveBattle { engine, armies: [a, b] });
        self.bus.publish(&GameEvent::TacticalBattleReady { battle: battle_id, units: unit_count });
        self.set_mode(GameMode::Tactical);

        let started = match self.battle.as_mut() {
            Some(battle) => battle.engine.start_combat(),
            None => Ok(()),
        };
        if let Err(err) = started {
            self.abort_battle([a, b]);
            return Err(err);
        }
        info!(battle = %battle_id.0, army_a = a.0, army_b = b.0, units = unit_count, "tactical battle started");
        self.flush_tactical();

        if self.battle.as_ref().is_some_and(|b| b.engine.is_completed()) {
            self.fold_results();
        }
        Ok(())
    }

    /// Undo a battle that could not start
    fn abort_battle(&mut self, armies: [ArmyId; 2]) {
        self.battle = None;
        for id in armies {
            if let Some(army) = self.strategic.state_mut().armies.get_mut(&id) {
                army.status = ArmyStatus::Active;
            }
        }
        self.set_mode(GameMode::Transition);
        self.strategic.resume();
        self.flush_strategic();
        self.set_mode(GameMode::Strategic);
    }

    /// Apply a completed battle to the registry and return to STRATEGIC
    fn fold_results(&mut self) {
        let Some(battle) = self.battle.take() else {
            return;
        };
        self.set_mode(GameMode::Transition);

        let combat = battle.engine.state();
        let outcome = combat.victory.status;
        let summary = fold_battle(self.strategic.state_mut(), combat, battle.armies, &self.config.strategic);

        for id in &summary.destroyed {
            self.bus.publish(&GameEvent::ArmyDestroyed { army: *id });
        }
        self.bus.publish(&GameEvent::CombatResolved {
            battle: combat.battle_id,
            outcome,
            casualties: summary.casualties,
            destroyed: summary.destroyed.clone(),
        });
        info!(
            battle = %combat.battle_id.0,
            ?outcome,
            casualties = summary.casualties,
            destroyed = summary.destroyed.len(),
            "combat resolved"
        );

        self.last_report = Some(BattleReport {
            battle: combat.battle_id,
            armies: battle.armies,
            outcome,
            summary,
        });
        drop(battle);

        self.strategic.resume();
        self.flush_strategic();
        self.set_mode(GameMode::Strategic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::army::SquadId;
    use crate::character::{Character, CharacterClass};
    use crate::events::EventRecorder;

    fn squad(n: usize) -> Squad {
        let units = (0..n).map(|i| Character::new(format!("Pike {}", i), CharacterClass::Warrior)).collect();
        Squad::new(SquadId(1), "Pikes", units)
    }

    #[test]
    fn test_starts_strategic() {
        let orch = ModeOrchestrator::new(GameConfig::default()).unwrap();
        assert_eq!(orch.mode(), GameMode::Strategic);
        assert!(orch.combat_state().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GameConfig::default();
        config.tactical.damage_min = 50;
        assert!(ModeOrchestrator::new(config).is_err());
    }

    #[test]
    fn test_create_army_requires_squads() {
        let mut orch = ModeOrchestrator::new(GameConfig::default()).unwrap();
        assert!(matches!(orch.create_army(Vec::new(), Vec2::ZERO, Faction::Player), Err(WarError::EmptyArmy)));
    }

    #[test]
    fn test_create_army_rejects_empty_squad() {
        let mut orch = ModeOrchestrator::new(GameConfig::default()).unwrap();
        let recorder = EventRecorder::attach(orch.events());
        let hollow = Squad::new(SquadId(7), "Hollow", Vec::new());

        let result = orch.create_army(vec![squad(2), hollow], Vec2::ZERO, Faction::Player);

        assert!(matches!(result, Err(WarError::EmptySquad(SquadId(7)))));
        assert!(orch.state().armies.is_empty());
        assert_eq!(recorder.count(EventKind::ArmyCreated), 0);
    }

    #[test]
    fn test_aborted_battle_restores_strategic() {
        let mut orch = ModeOrchestrator::new(GameConfig::default()).unwrap();
        let a = orch.create_army(vec![squad(2)], Vec2::ZERO, Faction::Player).unwrap();
        let b = orch.create_army(vec![squad(2)], Vec2::new(2.0, 0.0), Faction::Enemy).unwrap();
        orch.tick(1.0 / 60.0).unwrap();
        assert_eq!(orch.mode(), GameMode::Tactical);

        orch.abort_battle([a, b]);

        assert_eq!(orch.mode(), GameMode::Strategic);
        assert!(!orch.state().paused);
        assert!(orch.combat_state().is_none());
        assert_eq!(orch.army(a).unwrap().status, ArmyStatus::Active);
        assert_eq!(orch.army(b).unwrap().status, ArmyStatus::Active);
    }

    #[test]
    fn test_pause_resume_only_in_strategic() {
        let mut orch = ModeOrchestrator::new(GameConfig::default()).unwrap();
        let recorder = EventRecorder::attach(orch.events());

        orch.pause_strategic();
        assert!(orch.state().paused);
        orch.resume_strategic();
        assert!(!orch.state().paused);
        assert_eq!(recorder.count(EventKind::StrategicPaused), 1);
        assert_eq!(recorder.count(EventKind::StrategicResumed), 1);
    }

    #[test]
    fn test_encounter_enters_tactical() {
        let mut orch = ModeOrchestrator::new(GameConfig::default()).unwrap();
        let recorder = EventRecorder::attach(orch.events());
        let a = orch.create_army(vec![squad(2)], Vec2::ZERO, Faction::Player).unwrap();
        let b = orch.create_army(vec![squad(2)], Vec2::new(2.0, 0.0), Faction::Enemy).unwrap();

        orch.tick(1.0 / 60.0).unwrap();

        assert_eq!(orch.mode(), GameMode::Tactical);
        assert!(orch.state().paused);
        assert_eq!(orch.army(a).unwrap().status, ArmyStatus::Engaged);
        assert_eq!(orch.army(b).unwrap().status, ArmyStatus::Engaged);
        assert_eq!(orch.combat_state().unwrap().units.len(), 4);

        let modes: Vec<_> = recorder
            .of_kind(EventKind::ModeChanged)
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::ModeChanged { to, .. } => Some(to),
                _ => None,
            })
            .collect();
        assert_eq!(modes, vec![GameMode::Transition, GameMode::Tactical]);
    }

    #[test]
    fn test_enemy_turns_hand_back_to_player() {
        let mut orch = ModeOrchestrator::new(GameConfig::default()).unwrap();
        orch.create_army(vec![squad(2)], Vec2::ZERO, Faction::Player).unwrap();
        orch.create_army(vec![squad(2)], Vec2::new(2.0, 0.0), Faction::Enemy).unwrap();
        orch.tick(1.0 / 60.0).unwrap();

        orch.play_enemy_turns().unwrap();

        match orch.combat_state() {
            Some(state) => {
                assert_eq!(state.active_unit().unwrap().faction, Faction::Player);
                assert_eq!(state.campaign_id, Some(orch.campaign_id()));
            }
            None => assert_eq!(orch.last_report().unwrap().outcome, VictoryStatus::EnemyVictory),
        }
    }

    #[test]
    fn test_stop_is_terminal() {
        let mut orch = ModeOrchestrator::new(GameConfig::default()).unwrap();
        let a = orch.create_army(vec![squad(2)], Vec2::ZERO, Faction::Player).unwrap();
        orch.stop();

        assert_eq!(orch.mode(), GameMode::Stopped);
        assert!(!orch.move_army(a, Vec2::new(1.0, 1.0)));
        assert!(matches!(orch.create_army(vec![squad(1)], Vec2::ZERO, Faction::Enemy), Err(WarError::Stopped)));
        assert!(!orch.execute_action(CombatAction::wait()).unwrap());
    }
}
