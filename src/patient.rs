//! Patient age representation and pediatric age bands.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Patient age as recorded at the bedside: whole years plus months.
///
/// `months` is not required to be below 12; `{ years: 0, months: 18 }` is
/// the same age as `{ years: 1, months: 6 }` for every calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PatientAge {
    /// Whole years.
    pub years: u32,
    /// Additional months.
    pub months: u32,
}

impl PatientAge {
    /// Age from years and months.
    #[must_use]
    pub const fn new(years: u32, months: u32) -> Self {
        Self { years, months }
    }

    /// Age in whole years.
    #[must_use]
    pub const fn from_years(years: u32) -> Self {
        Self { years, months: 0 }
    }

    /// Age in months only.
    #[must_use]
    pub const fn from_months(months: u32) -> Self {
        Self { years: 0, months }
    }

    /// Total age in months, saturating on overflow.
    #[must_use]
    pub const fn total_months(&self) -> u32 {
        self.years.saturating_mul(12).saturating_add(self.months)
    }

    /// Age in fractional years.
    #[must_use]
    pub fn as_years_f64(&self) -> f64 {
        f64::from(self.total_months()) / 12.0
    }

    /// Completed whole years.
    #[must_use]
    pub const fn whole_years(&self) -> u32 {
        self.total_months() / 12
    }

    /// Age band for vital-sign lookups.
    #[must_use]
    pub const fn band(&self) -> AgeBand {
        AgeBand::for_months(self.total_months())
    }
}

impl fmt::Display for PatientAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}y{}m", self.years, self.months)
    }
}

/// Pediatric age bands used for vital-sign reference ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    /// Under one month.
    Neonate,
    /// One to eleven months.
    Infant,
    /// One and two years.
    Toddler,
    /// Three to five years.
    Preschool,
    /// Six to eleven years.
    SchoolAge,
    /// Twelve years and older.
    Adolescent,
}

impl AgeBand {
    /// Band containing an age of `total_months`.
    #[must_use]
    pub const fn for_months(total_months: u32) -> Self {
        match total_months {
            0 => Self::Neonate,
            1..=11 => Self::Infant,
            12..=35 => Self::Toddler,
            36..=71 => Self::Preschool,
            72..=143 => Self::SchoolAge,
            _ => Self::Adolescent,
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neonate => write!(f, "neonate"),
            Self::Infant => write!(f, "infant"),
            Self::Toddler => write!(f, "toddler"),
            Self::Preschool => write!(f, "preschool"),
            Self::SchoolAge => write!(f, "school_age"),
            Self::Adolescent => write!(f, "adolescent"),
        }
    }
}
