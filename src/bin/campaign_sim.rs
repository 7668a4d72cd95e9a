//! Headless Campaign Runner
//!
//! Marches a player and an enemy army into each other, lets the AI fight
//! every battle that breaks out, and reports the state of the campaign.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use warfront::campaign::{ArmyStatus, Squad, SquadId};
use warfront::character::{Character, CharacterClass};
use warfront::combat::VictoryStatus;
use warfront::core::{Faction, GameConfig, Result, Vec2};
use warfront::events::{EventKind, GameEvent};
use warfront::orchestrator::{GameMode, ModeOrchestrator};

/// Headless Campaign Runner - two armies, one map, AI battles
#[derive(Parser, Debug)]
#[command(name = "campaign_sim")]
#[command(about = "Run a two-army campaign and report the outcome")]
struct Args {
    /// TOML config file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed, overrides the config
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated campaign time in seconds
    #[arg(long, default_value_t = 30.0)]
    seconds: f32,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,

    /// Debug-level logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct ArmySummary {
    id: u32,
    faction: Faction,
    status: ArmyStatus,
    position: Vec2,
    squads: usize,
    units: usize,
    food: f32,
    ammunition: f32,
    morale: f32,
}

#[derive(Serialize)]
struct BattleSummary {
    outcome: VictoryStatus,
    casualties: usize,
    destroyed: Vec<u32>,
}

#[derive(Serialize)]
struct CampaignResult {
    seed: u64,
    elapsed: f64,
    mode: GameMode,
    battles: Vec<BattleSummary>,
    armies: Vec<ArmySummary>,
}

const FRAME: f32 = 0.25;
const MAX_BATTLE_ACTIONS: usize = 2000;

fn squad(id: u32, name: &str, roster: &[(CharacterClass, &str)]) -> Squad {
    let units = roster.iter().map(|(class, who)| Character::new(*who, *class)).collect();
    Squad::new(SquadId(id), name, units)
}

fn run(args: &Args) -> Result<CampaignResult> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let seed = config.seed;

    let mut orch = ModeOrchestrator::new(config)?;
    let battles = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = battles.clone();
    orch.subscribe(EventKind::CombatResolved, move |event| {
        if let GameEvent::CombatResolved { outcome, casualties, destroyed, .. } = event {
            sink.borrow_mut().push(BattleSummary {
                outcome: *outcome,
                casualties: *casualties,
                destroyed: destroyed.iter().map(|a| a.0).collect(),
            });
        }
    });

    let player = orch.create_army(
        vec![
            squad(1, "Vanguard", &[(CharacterClass::Warrior, "Aldric"), (CharacterClass::Warrior, "Bryn"), (CharacterClass::Cleric, "Cerys")]),
            squad(2, "Skirmishers", &[(CharacterClass::Ranger, "Dain"), (CharacterClass::Rogue, "Esk")]),
        ],
        Vec2::new(-20.0, 0.0),
        Faction::Player,
    )?;
    let enemy = orch.create_army(
        vec![
            squad(1, "Raiders", &[(CharacterClass::Rogue, "Gorm"), (CharacterClass::Warrior, "Hask"), (CharacterClass::Warrior, "Ivo")]),
            squad(2, "Hexers", &[(CharacterClass::Mage, "Jorun"), (CharacterClass::Ranger, "Kell")]),
        ],
        Vec2::new(20.0, 0.0),
        Faction::Enemy,
    )?;
    orch.move_army(player, Vec2::new(20.0, 0.0));
    orch.move_army(enemy, Vec2::new(-20.0, 0.0));

    let mut remaining = args.seconds;
    while remaining > 0.0 && orch.mode() != GameMode::Stopped {
        match orch.mode() {
            GameMode::Tactical => {
                if orch.auto_resolve_combat(MAX_BATTLE_ACTIONS)?.is_none() {
                    tracing::warn!("battle did not finish, stopping");
                    orch.stop();
                }
            }
            _ => {
                let frame = remaining.min(FRAME);
                orch.update(frame)?;
                remaining -= frame;
            }
        }
    }

    let armies = orch
        .state()
        .armies
        .values()
        .map(|a| ArmySummary {
            id: a.id.0,
            faction: a.faction,
            status: a.status,
            position: a.position,
            squads: a.squads.len(),
            units: a.unit_count(),
            food: a.supplies.food,
            ammunition: a.supplies.ammunition,
            morale: a.supplies.morale,
        })
        .collect();

    let battles = battles.take();
    Ok(CampaignResult {
        seed,
        elapsed: orch.state().elapsed,
        mode: orch.mode(),
        battles,
        armies,
    })
}

fn print_text(result: &CampaignResult) {
    println!("=== Campaign (seed {}) ===", result.seed);
    println!("Elapsed: {:.2}s  Mode: {:?}", result.elapsed, result.mode);
    println!();
    println!("Battles: {}", result.battles.len());
    for (i, b) in result.battles.iter().enumerate() {
        println!("  #{} {:?}: {} casualties, destroyed {:?}", i + 1, b.outcome, b.casualties, b.destroyed);
    }
    println!();
    println!("Armies:");
    for a in &result.armies {
        println!(
            "  Army {} {:?} {:?} at ({:.1}, {:.1}): {} squads / {} units, food {:.1} ammo {:.1} morale {:.1}",
            a.id, a.faction, a.status, a.position.x, a.position.z, a.squads, a.units, a.food, a.ammunition, a.morale
        );
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "warfront=debug" } else { "warfront=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    match run(&args).and_then(|result| report(&args, &result)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn report(args: &Args, result: &CampaignResult) -> Result<()> {
    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(result)?),
        _ => print_text(result),
    }
    Ok(())
}
