//! Headless Skirmish Runner
//!
//! Drives the tactical commander through a seeded toy skirmish and prints the
//! final army status. Units move in straight lines and trade fixed damage;
//! the point is to watch mode changes and intents, not to model combat.

use std::process::ExitCode;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use vanguard::army::{CommandSink, IntentKind, TacticalCommander, TickObservation, UnitIntent};
use vanguard::core::{load_config, Position, Result, StructureId, TacticsConfig, TacticsError, UnitId};
use vanguard::units::{FriendlyStructure, FriendlyUnit, ObservedUnit, OrderStatus, UnitCatalog, UnitKind};

/// Headless Skirmish Runner - exercise the tactical core on synthetic data
#[derive(Parser, Debug)]
#[command(name = "skirmish_runner")]
#[command(about = "Run a seeded synthetic skirmish through the tactical commander")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 3000)]
    ticks: u64,

    /// Tactics config file (TOML); defaults are used when absent
    #[arg(long)]
    config: Option<String>,

    /// Unit catalog file (TOML); the bundled catalog is used when absent
    #[arg(long)]
    catalog: Option<String>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Log every mode transition to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Units cover this much ground per tick
const UNIT_SPEED: f32 = 4.0;
/// Damage dealt per attack, both sides
const HIT_DAMAGE: u32 = 6;
/// Melee reach used by the toy simulation
const CONTACT_RANGE: f32 = 24.0;
/// A new unit joins the army this often
const REINFORCE_INTERVAL: u64 = 60;
/// A hostile wave spawns this often
const WAVE_INTERVAL: u64 = 700;

/// Toy world the commander plays against
struct Skirmish {
    rng: ChaCha8Rng,
    catalog: UnitCatalog,
    structures: Vec<FriendlyStructure>,
    army: Vec<FriendlyUnit>,
    hostiles: Vec<ObservedUnit>,
    enemy_base: Position,
    enemy_base_seen: bool,
    starts: Vec<Position>,
    next_id: u32,
    /// Current order per army unit, in index order
    orders: Vec<Option<IntentKind>>,
}

impl Skirmish {
    fn new(seed: u64, catalog: UnitCatalog) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let starts = vec![
            Position::new(3500.0, 300.0),
            Position::new(300.0, 3500.0),
            Position::new(3500.0, 3500.0),
        ];
        let enemy_base = starts[rng.gen_range(0..starts.len())];

        let mut skirmish = Self {
            rng,
            catalog,
            structures: vec![
                FriendlyStructure::new(StructureId(1), UnitKind::Nexus, Position::new(300.0, 300.0)),
                FriendlyStructure::new(StructureId(2), UnitKind::PhotonCannon, Position::new(420.0, 360.0)),
            ],
            army: Vec::new(),
            hostiles: Vec::new(),
            enemy_base,
            enemy_base_seen: false,
            starts,
            next_id: 1,
            orders: Vec::new(),
        };
        for _ in 0..4 {
            skirmish.reinforce();
        }
        skirmish
    }

    fn next_id(&mut self) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;
        id
    }

    fn reinforce(&mut self) {
        let kind = if self.rng.gen_bool(0.5) {
            UnitKind::Zealot
        } else {
            UnitKind::Dragoon
        };
        let id = self.next_id();
        let jitter = Position::new(self.rng.gen_range(-60.0..60.0), self.rng.gen_range(-60.0..60.0));
        let position = Position::new(300.0, 300.0) + jitter;
        self.army.push(FriendlyUnit::from_catalog(&self.catalog, id, kind, position));
        self.orders.push(None);
    }

    fn spawn_wave(&mut self) {
        let size = self.rng.gen_range(2..10);
        let origin = self.enemy_base;
        for _ in 0..size {
            let kind = match self.rng.gen_range(0..4) {
                0 => UnitKind::Hydralisk,
                1 => UnitKind::Drone,
                _ => UnitKind::Zergling,
            };
            let id = self.next_id();
            let hp = self.catalog.data(kind).max_hit_points;
            let jitter = Position::new(self.rng.gen_range(-80.0..80.0), self.rng.gen_range(-80.0..80.0));
            self.hostiles
                .push(ObservedUnit::from_catalog(&self.catalog, id, kind, origin + jitter, hp));
        }
        tracing::info!("Hostile wave of {} units from {:?}", size, origin);
    }

    fn unexplored_starts(&self) -> Vec<Position> {
        if self.enemy_base_seen {
            Vec::new()
        } else {
            self.starts.clone()
        }
    }

    /// Advance the toy world one tick using the orders currently held
    fn step(&mut self) {
        let base = Position::new(300.0, 300.0);

        for (i, unit) in self.army.iter_mut().enumerate() {
            let destination = match self.orders[i] {
                Some(IntentKind::Move(p)) | Some(IntentKind::AttackMove(p)) => Some(p),
                Some(IntentKind::AttackUnit(target)) => {
                    self.hostiles.iter().find(|h| h.id == target).map(|h| h.position)
                }
                None => None,
            };
            let Some(destination) = destination else {
                unit.order = OrderStatus::Idle;
                continue;
            };

            let delta = destination - unit.position;
            let remaining = delta.length();
            if remaining <= CONTACT_RANGE {
                unit.order = match self.orders[i] {
                    Some(IntentKind::AttackUnit(_)) => OrderStatus::Attacking,
                    _ => OrderStatus::Idle,
                };
                continue;
            }
            unit.position = unit.position + delta.normalize() * UNIT_SPEED.min(remaining);
            unit.order = match self.orders[i] {
                Some(IntentKind::Move(_)) => OrderStatus::Moving,
                _ => OrderStatus::Attacking,
            };
        }

        // Hostiles march on the base and trade blows with anything in reach
        for hostile in &mut self.hostiles {
            let delta = base - hostile.position;
            if delta.length() > CONTACT_RANGE {
                hostile.position = hostile.position + delta.normalize() * (UNIT_SPEED * 0.75);
            }
        }
        for unit in &mut self.army {
            for hostile in &mut self.hostiles {
                if unit.position.distance(&hostile.position) <= CONTACT_RANGE {
                    hostile.hit_points = hostile.hit_points.saturating_sub(HIT_DAMAGE);
                    if !hostile.is_worker() {
                        unit.hit_points = unit.hit_points.saturating_sub(HIT_DAMAGE / 2);
                    }
                }
            }
        }

        self.hostiles.retain(|h| h.is_alive());
        let mut kept_orders = Vec::with_capacity(self.orders.len());
        for (unit, order) in self.army.iter().zip(&self.orders) {
            if unit.hit_points > 0 {
                kept_orders.push(*order);
            }
        }
        self.army.retain(|u| u.hit_points > 0);
        self.orders = kept_orders;

        if self
            .army
            .iter()
            .any(|u| u.position.distance(&self.enemy_base) < 400.0)
        {
            self.enemy_base_seen = true;
        }
    }
}

impl CommandSink for Skirmish {
    fn issue(&mut self, intent: &UnitIntent) -> Result<()> {
        let Some(idx) = self.army.iter().position(|u| u.id == intent.unit) else {
            return Err(TacticsError::CommandRejected {
                unit: intent.unit,
                reason: "unit is gone".to_string(),
            });
        };
        self.orders[idx] = Some(intent.kind);
        Ok(())
    }
}

fn run(args: &Args) -> Result<String> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => TacticsConfig::default(),
    };
    let catalog = match &args.catalog {
        Some(path) => UnitCatalog::load(path)?,
        None => UnitCatalog::bundled()?,
    };
    let mut commander = TacticalCommander::new(config, catalog.clone())?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut skirmish = Skirmish::new(seed, catalog);

    for tick in 0..args.ticks {
        if tick > 0 && tick % REINFORCE_INTERVAL == 0 {
            skirmish.reinforce();
        }
        if tick > 0 && tick % WAVE_INTERVAL == 0 {
            skirmish.spawn_wave();
        }

        // The commander only sees hostiles near something of ours
        let visible: Vec<ObservedUnit> = skirmish
            .hostiles
            .iter()
            .filter(|h| {
                skirmish.army.iter().any(|u| u.position.distance(&h.position) < 350.0)
                    || skirmish.structures.iter().any(|s| s.position.distance(&h.position) < 900.0)
            })
            .cloned()
            .collect();
        let army = skirmish.army.clone();
        let structures = skirmish.structures.clone();
        let starts = skirmish.unexplored_starts();
        let enemy_base = skirmish.enemy_base_seen.then_some(skirmish.enemy_base);

        let obs = TickObservation::new(tick, &army, &structures, &visible)
            .with_enemy_base(enemy_base)
            .with_unexplored_starts(&starts);
        let report = commander.process_tick(&obs, &mut skirmish);

        if args.verbose {
            if let Some(t) = report.transition {
                eprintln!("[tick {}] {} -> {}", tick, t.from, t.to);
            }
        }

        skirmish.step();
    }

    let status = commander.status();
    let output = if args.format == "text" {
        let mut text = format!(
            "seed {}: {} after {} ticks\n  army supply {}, rally {:?}, target {:?}\n",
            seed, status.description, args.ticks, status.army_supply, status.rally_point, status.attack_target
        );
        for threat in &status.threats {
            text.push_str(&format!(
                "  threat {:?}: {} units (supply {}) at {:.0} from {:?}\n",
                threat.severity, threat.units, threat.supply, threat.structure_distance, threat.nearest_structure
            ));
        }
        text
    } else {
        serde_json::to_string_pretty(&status)?
    };
    Ok(output)
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vanguard=info,skirmish_runner=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("skirmish failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
