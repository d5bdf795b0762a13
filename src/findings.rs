//! Finding snapshots: point-in-time sets of clinical observations.
//!
//! A snapshot is sparse. A missing key means the finding was not observed,
//! never that it was normal, so every accessor returns `Option` or treats
//! absence as "does not satisfy".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::FindingValue;

/// Well-known finding keys used by the built-in catalog.
///
/// Keys are the camelCase names the assessment forms emit, so a snapshot
/// decoded from a form payload needs no renaming. Keys without a note are
/// boolean flags.
#[allow(missing_docs)]
pub mod keys {
    pub const FEVER: &str = "fever";
    /// Core temperature, degrees Celsius.
    pub const TEMPERATURE: &str = "temperature";
    /// Beats per minute.
    pub const HEART_RATE: &str = "heartRate";
    /// Breaths per minute.
    pub const RESPIRATORY_RATE: &str = "respiratoryRate";
    /// Seconds.
    pub const CAPILLARY_REFILL: &str = "capillaryRefill";
    /// Free text, e.g. `mottled`.
    pub const SKIN_COLOR: &str = "skinColor";
    /// mmol/L.
    pub const LACTATE: &str = "lactate";
    /// Percent.
    pub const SPO2: &str = "spo2";
    /// mmHg.
    pub const SYSTOLIC_BP: &str = "systolicBP";
    /// Glasgow Coma Scale, 3 to 15.
    pub const GCS: &str = "gcs";
    /// One of `A`, `V`, `P`, `U`.
    pub const AVPU: &str = "avpu";
    pub const PULSELESS: &str = "pulseless";
    pub const APNEA: &str = "apnea";
    pub const GASPING: &str = "gasping";
    pub const SEIZURES: &str = "seizures";
    /// Minutes.
    pub const SEIZURE_DURATION: &str = "seizureDuration";
    pub const ALLERGEN_EXPOSURE: &str = "allergenExposure";
    pub const URTICARIA: &str = "urticaria";
    pub const ANGIOEDEMA: &str = "angioedema";
    pub const STRIDOR: &str = "stridor";
    pub const WHEEZE: &str = "wheeze";
    pub const RETRACTIONS: &str = "retractions";
    pub const BARKING_COUGH: &str = "barkingCough";
    pub const DROOLING: &str = "drooling";
    pub const VOMITING: &str = "vomiting";
    pub const BILIOUS_VOMITING: &str = "biliousVomiting";
    pub const DIARRHEA: &str = "diarrhea";
    /// One of `none`, `mild`, `moderate`, `severe`.
    pub const DEHYDRATION: &str = "dehydration";
    /// mmol/L.
    pub const GLUCOSE: &str = "glucose";
    pub const KETONES: &str = "ketones";
    /// Venous or arterial pH.
    pub const PH: &str = "ph";
    /// mmol/L.
    pub const POTASSIUM: &str = "potassium";
    /// Free text, e.g. `petechial`.
    pub const RASH_TYPE: &str = "rashType";
    pub const NECK_STIFFNESS: &str = "neckStiffness";
    pub const BULGING_FONTANELLE: &str = "bulgingFontanelle";
    pub const HEAD_INJURY: &str = "headInjury";
    pub const PUPILS_UNEQUAL: &str = "pupilsUnequal";
    pub const TRAUMA: &str = "trauma";
    pub const ACTIVE_BLEEDING: &str = "activeBleeding";
    pub const TOXIC_INGESTION: &str = "toxicIngestion";
    /// Total ingested paracetamol, milligrams.
    pub const PARACETAMOL_DOSE_MG: &str = "paracetamolDoseMg";
    /// Estimated blood loss, millilitres.
    pub const BLOOD_LOSS_ML: &str = "bloodLossMl";
    /// Percent of total body surface area.
    pub const BURN_TBSA: &str = "burnTbsa";
    pub const CURRANT_JELLY_STOOL: &str = "currantJellyStool";
    pub const ABDOMINAL_PAIN: &str = "abdominalPain";
    /// Days of fever.
    pub const FEVER_DAYS: &str = "feverDays";
    pub const CONJUNCTIVITIS: &str = "conjunctivitis";
    pub const STRAWBERRY_TONGUE: &str = "strawberryTongue";
    pub const EXTREMITY_CHANGES: &str = "extremityChanges";
    pub const DYSURIA: &str = "dysuria";
    pub const LIMP: &str = "limp";
    pub const NARROW_COMPLEX_TACHYCARDIA: &str = "narrowComplexTachycardia";
}

/// A sparse, immutable set of clinical observations.
///
/// Keys are kept in sorted order so two snapshots with the same findings
/// serialize identically.
///
/// # Examples
///
/// ```
/// use resus_core::FindingSnapshot;
/// use resus_core::findings::keys;
///
/// let snapshot = FindingSnapshot::builder()
///     .finding(keys::SEIZURES, true)
///     .finding(keys::HEART_RATE, 150)
///     .build();
///
/// assert!(snapshot.flag(keys::SEIZURES));
/// assert_eq!(snapshot.number(keys::HEART_RATE), Some(150.0));
/// assert_eq!(snapshot.number(keys::LACTATE), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FindingSnapshot {
    findings: BTreeMap<String, FindingValue>,
}

impl FindingSnapshot {
    /// Creates an empty snapshot (nothing observed).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> FindingSnapshotBuilder {
        FindingSnapshotBuilder::default()
    }

    /// Raw value for `key`, if observed.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FindingValue> {
        self.findings.get(key)
    }

    /// Returns true if `key` was observed, whatever its value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.findings.contains_key(key)
    }

    /// True only when the finding was observed and recorded as `true`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(FindingValue::as_bool).unwrap_or(false)
    }

    /// Numeric value for `key`. Integers widen to `f64`.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FindingValue::as_number)
    }

    /// Text value for `key`.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FindingValue::as_text)
    }

    /// Number of observed findings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Returns true if nothing was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Iterates findings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FindingValue)> {
        self.findings.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for FindingSnapshot
where
    K: Into<String>,
    V: Into<FindingValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            findings: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Builder for [`FindingSnapshot`]. A later value for the same key replaces
/// the earlier one.
#[derive(Debug, Default)]
pub struct FindingSnapshotBuilder {
    findings: BTreeMap<String, FindingValue>,
}

impl FindingSnapshotBuilder {
    /// Records a finding.
    #[must_use]
    pub fn finding(mut self, key: impl Into<String>, value: impl Into<FindingValue>) -> Self {
        self.findings.insert(key.into(), value.into());
        self
    }

    /// Records the finding only when a value is present.
    #[must_use]
    pub fn maybe_finding(
        self,
        key: impl Into<String>,
        value: Option<impl Into<FindingValue>>,
    ) -> Self {
        match value {
            Some(v) => self.finding(key, v),
            None => self,
        }
    }

    /// Finishes the snapshot.
    #[must_use]
    pub fn build(self) -> FindingSnapshot {
        FindingSnapshot {
            findings: self.findings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_flag_is_false() {
        let snapshot = FindingSnapshot::new();
        assert!(!snapshot.flag(keys::SEIZURES));
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_flag_requires_bool_true() {
        let snapshot = FindingSnapshot::builder()
            .finding(keys::SEIZURES, false)
            .finding(keys::FEVER, "yes")
            .build();
        assert!(!snapshot.flag(keys::SEIZURES));
        assert!(!snapshot.flag(keys::FEVER));
        assert!(snapshot.contains(keys::SEIZURES));
    }

    #[test]
    fn test_later_value_replaces_earlier() {
        let snapshot = FindingSnapshot::builder()
            .finding(keys::HEART_RATE, 120)
            .finding(keys::HEART_RATE, 180)
            .build();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.number(keys::HEART_RATE), Some(180.0));
    }

    #[test]
    fn test_maybe_finding_skips_none() {
        let snapshot = FindingSnapshot::builder()
            .maybe_finding(keys::LACTATE, None::<f64>)
            .maybe_finding(keys::SPO2, Some(88))
            .build();
        assert!(!snapshot.contains(keys::LACTATE));
        assert_eq!(snapshot.number(keys::SPO2), Some(88.0));
    }

    #[test]
    fn test_from_iterator() {
        let snapshot: FindingSnapshot =
            [(keys::SKIN_COLOR, "mottled"), (keys::RASH_TYPE, "purpuric")]
                .into_iter()
                .collect();
        assert_eq!(snapshot.text(keys::SKIN_COLOR), Some("mottled"));
        assert_eq!(snapshot.iter().count(), 2);
    }

    #[test]
    fn test_snapshot_serializes_as_flat_map() {
        let snapshot = FindingSnapshot::builder()
            .finding(keys::SEIZURES, true)
            .finding(keys::HEART_RATE, 170)
            .build();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"heartRate":170,"seizures":true}"#);

        let decoded: FindingSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
