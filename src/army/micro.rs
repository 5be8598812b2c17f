//! Per-unit combat micro: kiting, focus fire and pulling back damaged units
//!
//! Bookkeeping is keyed by unit id and created lazily the first time a unit
//! is commanded. Entries for dead units are never cleaned up; the map is
//! bounded by the number of units we ever owned.

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::army::intents::{IntentKind, IntentPlan};
use crate::core::config::MicroConfig;
use crate::core::types::{Position, Tick, UnitId};
use crate::units::catalog::UnitCatalog;
use crate::units::observed::{FriendlyUnit, ObservedUnit};

/// Micro bookkeeping for one unit
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UnitMicroState {
    pub last_attack: Option<Tick>,
    /// Last intent micro gave this unit
    pub intent: Option<IntentKind>,
}

#[derive(Debug, Clone)]
pub struct CombatMicro {
    config: MicroConfig,
    units: AHashMap<UnitId, UnitMicroState>,
}

impl CombatMicro {
    pub fn new(config: MicroConfig) -> Self {
        Self {
            config,
            units: AHashMap::new(),
        }
    }

    pub fn unit_state(&self, unit: UnitId) -> Option<&UnitMicroState> {
        self.units.get(&unit)
    }

    /// Pretend `unit` attacked at `tick`
    pub fn record_attack(&mut self, unit: UnitId, tick: Tick) {
        self.units.entry(unit).or_default().last_attack = Some(tick);
    }

    pub fn ticks_since_attack(&self, unit: UnitId, tick: Tick) -> Tick {
        self.units
            .get(&unit)
            .and_then(|s| s.last_attack)
            .map(|last| tick.saturating_sub(last))
            .unwrap_or(self.config.never_attacked_ticks)
    }

    pub fn is_ranged(&self, unit: &FriendlyUnit, catalog: &UnitCatalog) -> bool {
        catalog.ground_range(unit.kind) > self.config.ranged_threshold
    }

    /// Below the retreat hit-point percentage but still alive
    pub fn should_retreat(&self, unit: &FriendlyUnit) -> bool {
        unit.hit_points > 0
            && (unit.hit_points as u64) * 100
                < (unit.max_hit_points as u64) * self.config.retreat_hp_percent as u64
    }

    /// Step back while the weapon cools down, shoot when it is ready
    ///
    /// Returns `None` when nothing is in range.
    pub fn kite(
        &mut self,
        unit: &FriendlyUnit,
        hostiles: &[&ObservedUnit],
        catalog: &UnitCatalog,
        tick: Tick,
    ) -> Option<IntentKind> {
        let reach = catalog.ground_range(unit.kind) + self.config.kite_range_buffer;
        let closest = hostiles
            .iter()
            .map(|h| (*h, unit.position.distance(&h.position)))
            .filter(|(_, d)| *d <= reach)
            .min_by_key(|(_, d)| OrderedFloat(*d))
            .map(|(h, _)| h)?;

        if self.ticks_since_attack(unit.id, tick) < self.config.weapon_cooldown {
            let away = unit.position - closest.position;
            if away.length() <= 0.0 {
                return None;
            }
            let retreat = unit.position + away.normalize() * self.config.kite_retreat_distance;
            tracing::trace!("Unit {:?} kiting away from {:?}", unit.id, closest.id);
            let intent = IntentKind::Move(retreat);
            self.units.entry(unit.id).or_default().intent = Some(intent);
            Some(intent)
        } else {
            tracing::trace!("Unit {:?} firing on {:?}", unit.id, closest.id);
            let intent = IntentKind::AttackUnit(closest.id);
            let entry = self.units.entry(unit.id).or_default();
            entry.last_attack = Some(tick);
            entry.intent = Some(intent);
            Some(intent)
        }
    }

    /// One target for the whole army
    ///
    /// Priority: workers (nearest), damaged units (lowest hit points),
    /// high-value units (nearest), anything (nearest). Distances are taken
    /// from the first army unit.
    pub fn select_focus_target<'a>(
        &self,
        army: &[FriendlyUnit],
        hostiles: &[&'a ObservedUnit],
        catalog: &UnitCatalog,
    ) -> Option<&'a ObservedUnit> {
        let reference = army.first()?.position;
        let nearest = |filter: &dyn Fn(&ObservedUnit) -> bool| {
            hostiles
                .iter()
                .copied()
                .filter(|h| filter(*h))
                .min_by_key(|h| OrderedFloat(reference.distance(&h.position)))
        };

        if let Some(worker) = nearest(&|h| h.is_worker()) {
            return Some(worker);
        }

        let damaged = hostiles
            .iter()
            .copied()
            .filter(|h| h.is_damaged(self.config.damaged_fraction))
            .min_by_key(|h| h.hit_points);
        if damaged.is_some() {
            return damaged;
        }

        if let Some(high_value) = nearest(&|h| catalog.is_high_value(h.kind)) {
            return Some(high_value);
        }

        nearest(&|_| true)
    }

    /// Full micro pass for the army against `hostiles`
    ///
    /// Writes into `plan` in three layers: kiting for ranged units, focus
    /// fire for everyone (on idle units or refresh ticks), then pulling
    /// back damaged units. Later layers replace earlier ones per unit.
    pub fn execute(
        &mut self,
        army: &[FriendlyUnit],
        hostiles: &[&ObservedUnit],
        rally_point: Option<Position>,
        catalog: &UnitCatalog,
        tick: Tick,
        plan: &mut IntentPlan,
    ) {
        if hostiles.is_empty() {
            return;
        }

        for unit in army {
            if !self.is_ranged(unit, catalog) {
                continue;
            }
            if let Some(intent) = self.kite(unit, hostiles, catalog, tick) {
                plan.assign(unit.id, intent);
            }
        }

        if let Some(target) = self.select_focus_target(army, hostiles, catalog) {
            tracing::debug!("Focus fire on {:?} ({:?})", target.id, target.kind);
            let refresh = tick % self.config.refresh_interval == 0;
            for unit in army {
                if (unit.is_idle() || refresh) && !self.should_retreat(unit) {
                    let intent = IntentKind::AttackUnit(target.id);
                    self.units.entry(unit.id).or_default().intent = Some(intent);
                    plan.assign(unit.id, intent);
                }
            }
        }

        if let Some(rally) = rally_point {
            for unit in army {
                if !self.should_retreat(unit) {
                    continue;
                }
                let intent = IntentKind::Move(rally);
                self.units.entry(unit.id).or_default().intent = Some(intent);
                plan.assign(unit.id, intent);
            }
        }
    }
}
