//! The compartment-count reducer.

use std::ops::Index;

use epi_core::HealthState;

/// Individuals per [`HealthState`].
///
/// The only mutation is [`apply`](Self::apply), which moves one individual
/// between two compartments, so the total is fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompartmentTable {
    counts: [u32; HealthState::COUNT],
}

impl CompartmentTable {
    /// `population` individuals, all susceptible.
    pub fn new(population: u32) -> Self {
        let mut counts = [0; HealthState::COUNT];
        counts[HealthState::Susceptible.index()] = population;
        Self { counts }
    }

    /// Move one individual from `old` to `new`.
    ///
    /// # Panics
    ///
    /// When `old` is empty: a transition was applied twice or never recorded.
    pub fn apply(&mut self, old: HealthState, new: HealthState) {
        let from = &mut self.counts[old.index()];
        assert!(*from > 0, "compartment {} would go negative", old.as_str());
        *from -= 1;
        self.counts[new.index()] += 1;
    }

    #[inline]
    pub fn get(&self, state: HealthState) -> u32 {
        self.counts[state.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Exposed plus every infectious state.
    pub fn active_cases(&self) -> u32 {
        HealthState::ALL
            .iter()
            .filter(|s| s.is_active_case())
            .map(|&s| self.get(s))
            .sum()
    }

    /// Counts in [`HealthState::ALL`] order.
    pub fn as_array(&self) -> [u32; HealthState::COUNT] {
        self.counts
    }
}

impl Index<HealthState> for CompartmentTable {
    type Output = u32;

    fn index(&self, state: HealthState) -> &u32 {
        &self.counts[state.index()]
    }
}
