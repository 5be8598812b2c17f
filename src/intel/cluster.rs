//! Spatial clustering of visible hostile units
//!
//! Clusters are rebuilt from scratch every tick. Every input unit lands in
//! exactly one cluster and every cluster has at least one member.

use serde::{Deserialize, Serialize};

use crate::core::config::{ClusterStrategy, ThreatConfig};
use crate::core::types::{Position, UnitId};
use crate::units::observed::ObservedUnit;

/// A group of hostile units standing close together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCluster {
    members: Vec<UnitId>,
    centroid: Position,
    total_supply: u32,
}

impl UnitCluster {
    /// Build from member units; `first` guarantees the cluster is non-empty
    fn from_members<'a>(first: &'a ObservedUnit, rest: impl Iterator<Item = &'a ObservedUnit>) -> Self {
        let mut members = vec![first.id];
        let mut sum = first.position;
        let mut total_supply = first.supply;
        for unit in rest {
            members.push(unit.id);
            sum = sum + unit.position;
            total_supply += unit.supply;
        }
        let n = members.len() as f32;
        let centroid = Position::new(sum.x / n, sum.y / n);
        Self {
            members,
            centroid,
            total_supply,
        }
    }

    pub fn members(&self) -> &[UnitId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn centroid(&self) -> Position {
        self.centroid
    }

    pub fn total_supply(&self) -> u32 {
        self.total_supply
    }
}

/// Groups visible hostile combat units into clusters
#[derive(Debug, Clone)]
pub struct ThreatClusterer {
    radius: f32,
    strategy: ClusterStrategy,
}

impl ThreatClusterer {
    pub fn new(radius: f32, strategy: ClusterStrategy) -> Self {
        Self { radius, strategy }
    }

    pub fn from_config(config: &ThreatConfig) -> Self {
        Self::new(config.cluster_radius, config.cluster_strategy)
    }

    pub fn cluster(&self, units: &[ObservedUnit]) -> Vec<UnitCluster> {
        match self.strategy {
            ClusterStrategy::SeedRadius => cluster_by_seed(units, self.radius),
            ClusterStrategy::Transitive => cluster_transitive(units, self.radius),
        }
    }
}

/// Greedy seed expansion
///
/// Each unprocessed unit in input order becomes a seed and absorbs every
/// unprocessed unit within `radius` of the seed itself. Membership is not
/// chained through other members, so the result depends on input order.
pub fn cluster_by_seed(units: &[ObservedUnit], radius: f32) -> Vec<UnitCluster> {
    let mut processed = vec![false; units.len()];
    let mut clusters = Vec::new();

    for (seed_idx, seed) in units.iter().enumerate() {
        if processed[seed_idx] {
            continue;
        }
        processed[seed_idx] = true;

        let mut joined = Vec::new();
        for (idx, other) in units.iter().enumerate() {
            if processed[idx] {
                continue;
            }
            if seed.position.distance(&other.position) <= radius {
                processed[idx] = true;
                joined.push(other);
            }
        }

        clusters.push(UnitCluster::from_members(seed, joined.into_iter()));
    }

    clusters
}

/// Connected components of the "within radius" graph
///
/// Order-independent alternative to [`cluster_by_seed`]: two units share a
/// cluster whenever a chain of units, each within `radius` of the next,
/// links them.
pub fn cluster_transitive(units: &[ObservedUnit], radius: f32) -> Vec<UnitCluster> {
    let mut sets = DisjointSet::new(units.len());
    for i in 0..units.len() {
        for j in (i + 1)..units.len() {
            if units[i].position.distance(&units[j].position) <= radius {
                sets.union(i, j);
            }
        }
    }

    // Group by root, clusters ordered by their first member's input index
    let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
    for idx in 0..units.len() {
        let root = sets.find(idx);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(idx),
            None => groups.push((root, vec![idx])),
        }
    }

    groups
        .into_iter()
        .map(|(_, members)| {
            let first = &units[members[0]];
            UnitCluster::from_members(first, members[1..].iter().map(|&i| &units[i]))
        })
        .collect()
}

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}
