//! Recent co-occupancy, kept only while contact tracing is in force.

use rustc_hash::FxHashMap;

use epi_core::{AgentId, Timestamp};

/// Last time each pair of individuals shared a room.
///
/// Stored symmetrically as one map per individual.  Lookups feed isolation
/// decisions that draw no randomness, so the hash order never affects a run.
#[derive(Debug, Default)]
pub struct ContactLog {
    last_seen: Vec<FxHashMap<AgentId, Timestamp>>,
}

impl ContactLog {
    pub fn new(population: usize) -> Self {
        Self { last_seen: vec![FxHashMap::default(); population] }
    }

    /// Everyone in `room` met everyone else at `now`.
    pub fn record_room(&mut self, room: &[AgentId], now: Timestamp) {
        for (i, &a) in room.iter().enumerate() {
            for &b in &room[i + 1..] {
                self.last_seen[a.index()].insert(b, now);
                self.last_seen[b.index()].insert(a, now);
            }
        }
    }

    /// Contacts of `agent` seen at or after `since`, ascending by id.
    pub fn contacts_since(&self, agent: AgentId, since: Timestamp) -> Vec<AgentId> {
        let mut out: Vec<AgentId> = self.last_seen[agent.index()]
            .iter()
            .filter(|&(_, &t)| t >= since)
            .map(|(&b, _)| b)
            .collect();
        out.sort_unstable();
        out
    }

    /// Forget contacts older than `since`.
    pub fn prune(&mut self, since: Timestamp) {
        for map in &mut self.last_seen {
            map.retain(|_, t| *t >= since);
        }
    }

    pub fn clear(&mut self) {
        for map in &mut self.last_seen {
            map.clear();
        }
    }

    /// Number of logged (directed) contacts.
    pub fn len(&self) -> usize {
        self.last_seen.iter().map(FxHashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.iter().all(FxHashMap::is_empty)
    }
}
