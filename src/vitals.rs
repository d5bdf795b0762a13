//! Age-banded pediatric vital-sign reference ranges.
//!
//! Ranges are awake normal values. A reading outside its band's range is
//! "high for age" or "low for age"; a missing reading is neither.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::findings::{keys, FindingSnapshot};
use crate::patient::{AgeBand, PatientAge};

/// Vital signs with age-dependent normal ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalSign {
    /// Beats per minute.
    HeartRate,
    /// Breaths per minute.
    RespiratoryRate,
    /// Systolic blood pressure, mmHg.
    SystolicBp,
}

impl VitalSign {
    /// The snapshot key this vital sign is read from.
    #[must_use]
    pub const fn finding_key(self) -> &'static str {
        match self {
            Self::HeartRate => keys::HEART_RATE,
            Self::RespiratoryRate => keys::RESPIRATORY_RATE,
            Self::SystolicBp => keys::SYSTOLIC_BP,
        }
    }
}

impl fmt::Display for VitalSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeartRate => write!(f, "heart_rate"),
            Self::RespiratoryRate => write!(f, "respiratory_rate"),
            Self::SystolicBp => write!(f, "systolic_bp"),
        }
    }
}

/// Inclusive normal range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    /// Lowest normal value.
    pub low: f64,
    /// Highest normal value.
    pub high: f64,
}

impl ReferenceRange {
    const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Returns true if `value` lies within the range.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Normal range for `sign` at `age`.
#[must_use]
pub const fn reference_range(sign: VitalSign, age: PatientAge) -> ReferenceRange {
    match (sign, age.band()) {
        (VitalSign::HeartRate, AgeBand::Neonate) => ReferenceRange::new(100.0, 205.0),
        (VitalSign::HeartRate, AgeBand::Infant) => ReferenceRange::new(100.0, 180.0),
        (VitalSign::HeartRate, AgeBand::Toddler) => ReferenceRange::new(98.0, 140.0),
        (VitalSign::HeartRate, AgeBand::Preschool) => ReferenceRange::new(80.0, 120.0),
        (VitalSign::HeartRate, AgeBand::SchoolAge) => ReferenceRange::new(75.0, 118.0),
        (VitalSign::HeartRate, AgeBand::Adolescent) => ReferenceRange::new(60.0, 100.0),

        (VitalSign::RespiratoryRate, AgeBand::Neonate) => ReferenceRange::new(30.0, 60.0),
        (VitalSign::RespiratoryRate, AgeBand::Infant) => ReferenceRange::new(30.0, 53.0),
        (VitalSign::RespiratoryRate, AgeBand::Toddler) => ReferenceRange::new(22.0, 37.0),
        (VitalSign::RespiratoryRate, AgeBand::Preschool) => ReferenceRange::new(20.0, 28.0),
        (VitalSign::RespiratoryRate, AgeBand::SchoolAge) => ReferenceRange::new(18.0, 25.0),
        (VitalSign::RespiratoryRate, AgeBand::Adolescent) => ReferenceRange::new(12.0, 20.0),

        (VitalSign::SystolicBp, AgeBand::Neonate) => ReferenceRange::new(60.0, 84.0),
        (VitalSign::SystolicBp, AgeBand::Infant) => ReferenceRange::new(72.0, 104.0),
        (VitalSign::SystolicBp, AgeBand::Toddler) => ReferenceRange::new(86.0, 106.0),
        (VitalSign::SystolicBp, AgeBand::Preschool) => ReferenceRange::new(89.0, 112.0),
        (VitalSign::SystolicBp, AgeBand::SchoolAge) => ReferenceRange::new(97.0, 115.0),
        (VitalSign::SystolicBp, AgeBand::Adolescent) => ReferenceRange::new(110.0, 131.0),
    }
}

/// Systolic pressure below which a child is hypotensive (PALS).
///
/// Under one month: 60 mmHg. One to eleven months: 70 mmHg. One to ten
/// years: `70 + 2 x age in years`. Older: 90 mmHg.
#[must_use]
pub fn hypotension_threshold(age: PatientAge) -> f64 {
    let months = age.total_months();
    match months {
        0 => 60.0,
        1..=11 => 70.0,
        12..=131 => 70.0 + 2.0 * f64::from(age.whole_years()),
        _ => 90.0,
    }
}

/// True when the recorded `sign` is above the normal range for `age`.
#[must_use]
pub fn is_high_for_age(findings: &FindingSnapshot, sign: VitalSign, age: PatientAge) -> bool {
    findings
        .number(sign.finding_key())
        .is_some_and(|v| v > reference_range(sign, age).high)
}

/// True when the recorded `sign` is below the normal range for `age`.
#[must_use]
pub fn is_low_for_age(findings: &FindingSnapshot, sign: VitalSign, age: PatientAge) -> bool {
    findings
        .number(sign.finding_key())
        .is_some_and(|v| v < reference_range(sign, age).low)
}

/// True when a systolic pressure was recorded and is below the hypotension
/// threshold for `age`.
#[must_use]
pub fn is_hypotensive(findings: &FindingSnapshot, age: PatientAge) -> bool {
    findings
        .number(keys::SYSTOLIC_BP)
        .is_some_and(|v| v < hypotension_threshold(age))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(key: &str, value: f64) -> FindingSnapshot {
        FindingSnapshot::builder().finding(key, value).build()
    }

    #[test]
    fn test_toddler_tachycardia() {
        let age = PatientAge::from_years(2);
        assert!(is_high_for_age(&snapshot(keys::HEART_RATE, 170.0), VitalSign::HeartRate, age));
        assert!(!is_high_for_age(&snapshot(keys::HEART_RATE, 130.0), VitalSign::HeartRate, age));
    }

    #[test]
    fn test_same_rate_normal_for_infant_high_for_adolescent() {
        let findings = snapshot(keys::HEART_RATE, 150.0);
        assert!(!is_high_for_age(&findings, VitalSign::HeartRate, PatientAge::from_months(4)));
        assert!(is_high_for_age(&findings, VitalSign::HeartRate, PatientAge::from_years(14)));
    }

    #[test]
    fn test_missing_vital_is_neither_high_nor_low() {
        let findings = FindingSnapshot::new();
        let age = PatientAge::from_years(5);
        assert!(!is_high_for_age(&findings, VitalSign::RespiratoryRate, age));
        assert!(!is_low_for_age(&findings, VitalSign::RespiratoryRate, age));
        assert!(!is_hypotensive(&findings, age));
    }

    #[test]
    fn test_hypotension_threshold_by_age() {
        assert!((hypotension_threshold(PatientAge::new(0, 0)) - 60.0).abs() < f64::EPSILON);
        assert!((hypotension_threshold(PatientAge::from_months(6)) - 70.0).abs() < f64::EPSILON);
        assert!((hypotension_threshold(PatientAge::from_years(4)) - 78.0).abs() < f64::EPSILON);
        assert!((hypotension_threshold(PatientAge::from_years(15)) - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hypotensive() {
        let age = PatientAge::from_years(4);
        assert!(is_hypotensive(&snapshot(keys::SYSTOLIC_BP, 70.0), age));
        assert!(!is_hypotensive(&snapshot(keys::SYSTOLIC_BP, 78.0), age));
    }

    #[test]
    fn test_reference_range_contains() {
        let range = reference_range(VitalSign::RespiratoryRate, PatientAge::from_years(2));
        assert!(range.contains(22.0));
        assert!(range.contains(37.0));
        assert!(!range.contains(45.0));
    }
}
