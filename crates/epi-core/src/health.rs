//! Epidemiological compartments.

use serde::{Deserialize, Serialize};

/// The health state of one individual.  Exactly one per individual at any
/// time.
///
/// `Recovered` and `Deceased` are terminal for an infection episode.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthState {
    #[default]
    Susceptible,
    Exposed,
    Infectious,
    Asymptomatic,
    SymptomaticMild,
    SymptomaticSevere,
    Recovered,
    Deceased,
}

impl HealthState {
    /// Number of compartments.
    pub const COUNT: usize = 8;

    /// All compartments in table order.
    pub const ALL: [HealthState; Self::COUNT] = [
        HealthState::Susceptible,
        HealthState::Exposed,
        HealthState::Infectious,
        HealthState::Asymptomatic,
        HealthState::SymptomaticMild,
        HealthState::SymptomaticSevere,
        HealthState::Recovered,
        HealthState::Deceased,
    ];

    /// Position of this state in [`ALL`](Self::ALL) and in count tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Can this individual transmit to a co-occupant?
    #[inline]
    pub fn is_infectious(self) -> bool {
        matches!(
            self,
            HealthState::Infectious
                | HealthState::Asymptomatic
                | HealthState::SymptomaticMild
                | HealthState::SymptomaticSevere
        )
    }

    /// Exposed or infectious: counted as a prevalent case.
    #[inline]
    pub fn is_active_case(self) -> bool {
        self == HealthState::Exposed || self.is_infectious()
    }

    pub fn is_symptomatic(self) -> bool {
        matches!(self, HealthState::SymptomaticMild | HealthState::SymptomaticSevere)
    }

    /// Label used for CSV column headers and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Susceptible       => "susceptible",
            HealthState::Exposed           => "exposed",
            HealthState::Infectious        => "infectious",
            HealthState::Asymptomatic      => "asymptomatic",
            HealthState::SymptomaticMild   => "symptomatic_mild",
            HealthState::SymptomaticSevere => "symptomatic_severe",
            HealthState::Recovered         => "recovered",
            HealthState::Deceased          => "deceased",
        }
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
