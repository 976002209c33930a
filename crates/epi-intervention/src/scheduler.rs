//! Two-heap interval scheduler.
//!
//! # Heaps
//!
//! * **inactive**: min-heap on `(start_day, index)` of interventions not yet
//!   applied.
//! * **active**: min-heap on `(end_day, index)` of interventions in force.
//!
//! `index` is the position in the configured list, so equal days resolve in
//! configuration order and the key is a total order.
//!
//! # Day step
//!
//! ```text
//! step(day):
//!   pop + deactivate every active   with end_day   ≤ day
//!   pop + activate   every inactive with start_day ≤ day
//! ```
//!
//! An intervention is therefore in force on days `start_day .. end_day`.  A
//! window with `start_day == end_day` holds for that single day and is lifted
//! by the next step.
//!
//! # Closures
//!
//! A closure covers the first `round(n × fraction)` buildings of its category
//! list (ascending id).  The exact prefix is remembered per intervention and
//! reopened on deactivation; buildings count overlapping closures, so lifting
//! one closure never reopens a building another one still holds.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use epi_core::BuildingId;
use epi_spatial::Environment;

use crate::param::{InterventionKind, InterventionParam};
use crate::policy::ActivePolicies;
use crate::InterventionResult;

/// Kinds activated and lifted by one [`Interventions::step`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterventionChanges {
    pub activated:   Vec<InterventionKind>,
    pub deactivated: Vec<InterventionKind>,
}

impl InterventionChanges {
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty() && self.deactivated.is_empty()
    }
}

pub struct Interventions {
    params:   Vec<InterventionParam>,
    inactive: BinaryHeap<Reverse<(u32, usize)>>,
    active:   BinaryHeap<Reverse<(u32, usize)>>,
    /// Indices of active interventions in activation order.
    active_order: Vec<usize>,
    /// Buildings closed by each intervention while it is active.
    closed:   Vec<Vec<BuildingId>>,
    policies: ActivePolicies,
}

impl Interventions {
    /// Validate the configured list and queue every intervention as
    /// inactive.  Nothing is applied until the first [`step`](Self::step).
    ///
    /// # Errors
    ///
    /// The first [`InterventionError`](crate::InterventionError) found, in
    /// configuration order.
    pub fn new(params: Vec<InterventionParam>) -> InterventionResult<Self> {
        for (i, p) in params.iter().enumerate() {
            p.validate(i)?;
        }
        let n = params.len();
        let mut this = Self {
            params,
            inactive:     BinaryHeap::with_capacity(n),
            active:       BinaryHeap::with_capacity(n),
            active_order: Vec::with_capacity(n),
            closed:       vec![Vec::new(); n],
            policies:     ActivePolicies::default(),
        };
        this.fill_inactive();
        Ok(this)
    }

    fn fill_inactive(&mut self) {
        self.inactive.clear();
        self.active.clear();
        self.active_order.clear();
        for (i, p) in self.params.iter().enumerate() {
            self.inactive.push(Reverse((p.start_day, i)));
            self.closed[i].clear();
        }
        self.policies = ActivePolicies::default();
    }

    pub fn params(&self) -> &[InterventionParam] {
        &self.params
    }

    pub fn policies(&self) -> &ActivePolicies {
        &self.policies
    }

    pub fn is_active(&self, kind: InterventionKind) -> bool {
        self.active_order.iter().any(|&i| self.params[i].kind == kind)
    }

    pub fn active_count(&self) -> usize {
        self.active_order.len()
    }

    pub fn pending_count(&self) -> usize {
        self.inactive.len()
    }

    /// Apply the schedule for `day`; see the module docs.
    pub fn step(&mut self, day: u32, env: &mut Environment) -> InterventionChanges {
        let mut changes = InterventionChanges::default();

        while let Some(&Reverse((end, idx))) = self.active.peek() {
            if end > day {
                break;
            }
            self.active.pop();
            self.deactivate(idx, env);
            changes.deactivated.push(self.params[idx].kind);
        }

        while let Some(&Reverse((start, idx))) = self.inactive.peek() {
            if start > day {
                break;
            }
            self.inactive.pop();
            self.activate(idx, env);
            changes.activated.push(self.params[idx].kind);
            self.active.push(Reverse((self.params[idx].end_day, idx)));
        }

        if !changes.is_empty() {
            self.recompute_policies();
        }
        changes
    }

    /// Forget all applied state, re-queue every intervention and replay day
    /// 0.
    ///
    /// Expects `env` to have been reset first (closure counters cleared);
    /// closures held by this scheduler are dropped, not reopened.
    pub fn reset(&mut self, env: &mut Environment) -> InterventionChanges {
        self.fill_inactive();
        self.step(0, env)
    }

    fn activate(&mut self, idx: usize, env: &mut Environment) {
        let p = &self.params[idx];
        log::info!("activating {} (days {}..{})", p.kind, p.start_day, p.end_day);
        if let Some(category) = p.kind.closes() {
            let list = env.buildings_of(category);
            let total = list.len();
            let count = ((total as f64 * p.get("fraction")).round() as usize).min(total);
            let prefix = list[..count].to_vec();
            for &b in &prefix {
                env.building_mut(b).close();
            }
            log::debug!("{}: closed {count} of {total} {category} buildings", p.kind);
            self.closed[idx] = prefix;
        }
        self.active_order.push(idx);
    }

    fn deactivate(&mut self, idx: usize, env: &mut Environment) {
        log::info!("lifting {}", self.params[idx].kind);
        for b in self.closed[idx].drain(..) {
            env.building_mut(b).reopen();
        }
        self.active_order.retain(|&i| i != idx);
    }

    fn recompute_policies(&mut self) {
        let mut policies = ActivePolicies::default();
        for &i in &self.active_order {
            policies.apply(&self.params[i]);
        }
        self.policies = policies;
    }
}
