//! Declarative trigger criteria.
//!
//! A protocol's trigger is a tree of [`Criterion`] values evaluated against a
//! [`TriggerContext`]. Evaluation is total: a missing or wrongly typed
//! finding never satisfies a leaf, and nothing panics on odd inputs
//! (negative weight, NaN readings, absurd ages).

use std::fmt;

use regex::Regex;

use crate::error::CatalogError;
use crate::findings::{keys, FindingSnapshot};
use crate::patient::PatientAge;
use crate::vitals::{self, VitalSign};

/// Everything a trigger may look at.
#[derive(Debug, Clone, Copy)]
pub struct TriggerContext<'a> {
    /// Findings of the assessment being evaluated.
    pub findings: &'a FindingSnapshot,
    /// Body weight in kilograms.
    pub weight_kg: f64,
    /// Patient age.
    pub age: PatientAge,
}

impl<'a> TriggerContext<'a> {
    /// Bundles one assessment for trigger evaluation.
    #[must_use]
    pub const fn new(findings: &'a FindingSnapshot, weight_kg: f64, age: PatientAge) -> Self {
        Self {
            findings,
            weight_kg,
            age,
        }
    }

    /// Weight usable for per-kilogram calculations.
    fn usable_weight(&self) -> Option<f64> {
        (self.weight_kg.is_finite() && self.weight_kg > 0.0).then_some(self.weight_kg)
    }
}

/// Direction of a vital-sign deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deviation {
    /// Above the normal range.
    High,
    /// Below the normal range.
    Low,
}

/// A case-insensitive text pattern compiled once at catalog build time.
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    regex: Regex,
}

impl TextPattern {
    /// Compiles `pattern` case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidPattern` if the regex does not compile.
    pub fn new(pattern: &str) -> Result<Self, CatalogError> {
        let regex = Regex::new(&format!("(?i){pattern}")).map_err(|e| {
            CatalogError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Matches a whole value against any of `options`, ignoring case and
    /// surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidPattern` if `options` is empty.
    pub fn one_of(options: &[&str]) -> Result<Self, CatalogError> {
        if options.is_empty() {
            return Err(CatalogError::InvalidPattern {
                pattern: String::new(),
                reason: "no options given".to_string(),
            });
        }
        let alternatives = options
            .iter()
            .map(|o| regex::escape(o))
            .collect::<Vec<_>>()
            .join("|");
        Self::new(&format!(r"^\s*(?:{alternatives})\s*$"))
    }

    /// The pattern source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if `text` matches.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A node in a trigger tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Finding recorded as `true`.
    Flag(String),

    /// Numeric finding strictly greater than the threshold.
    Above {
        /// Finding key.
        key: String,
        /// Threshold compared against the finding.
        threshold: f64,
    },

    /// Numeric finding greater than or equal to the threshold.
    AtLeast {
        /// Finding key.
        key: String,
        /// Threshold compared against the finding.
        threshold: f64,
    },

    /// Numeric finding strictly less than the threshold.
    Below {
        /// Finding key.
        key: String,
        /// Threshold compared against the finding.
        threshold: f64,
    },

    /// Numeric finding less than or equal to the threshold.
    AtMost {
        /// Finding key.
        key: String,
        /// Threshold compared against the finding.
        threshold: f64,
    },

    /// Numeric finding divided by body weight is at least the threshold.
    /// Never satisfied when the weight is zero, negative or not finite.
    PerKgAtLeast {
        /// Finding key.
        key: String,
        /// Threshold compared against the finding.
        threshold: f64,
    },

    /// Text finding matches the pattern.
    Text {
        /// Finding key.
        key: String,
        /// Pattern the text must match.
        pattern: TextPattern,
    },

    /// Vital sign outside the normal range for the patient's age.
    Vital {
        /// Vital sign to check.
        sign: VitalSign,
        /// Which side of the range counts.
        deviation: Deviation,
    },

    /// Systolic pressure below the age threshold.
    Hypotensive,

    /// Age strictly below the given number of months.
    AgeUnderMonths(u32),

    /// Age at or above the given number of months.
    AgeAtLeastMonths(u32),

    /// Every child holds. Empty is true.
    All(Vec<Criterion>),
    /// Some child holds. Empty is false.
    Any(Vec<Criterion>),

    /// At least `n` of the listed criteria hold.
    AtLeastN {
        /// Minimum number of children that must hold.
        n: usize,
        /// Candidate criteria.
        of: Vec<Criterion>,
    },

    /// Child does not hold.
    Not(Box<Criterion>),
}

impl Criterion {
    /// Boolean finding set to `true`.
    #[must_use]
    pub fn flag(key: impl Into<String>) -> Self {
        Self::Flag(key.into())
    }

    /// Numeric finding `> threshold`.
    #[must_use]
    pub fn above(key: impl Into<String>, threshold: f64) -> Self {
        Self::Above {
            key: key.into(),
            threshold,
        }
    }

    /// Numeric finding `>= threshold`.
    #[must_use]
    pub fn at_least(key: impl Into<String>, threshold: f64) -> Self {
        Self::AtLeast {
            key: key.into(),
            threshold,
        }
    }

    /// Numeric finding `< threshold`.
    #[must_use]
    pub fn below(key: impl Into<String>, threshold: f64) -> Self {
        Self::Below {
            key: key.into(),
            threshold,
        }
    }

    /// Numeric finding `<= threshold`.
    #[must_use]
    pub fn at_most(key: impl Into<String>, threshold: f64) -> Self {
        Self::AtMost {
            key: key.into(),
            threshold,
        }
    }

    /// Numeric finding per kilogram `>= threshold`.
    #[must_use]
    pub fn per_kg_at_least(key: impl Into<String>, threshold: f64) -> Self {
        Self::PerKgAtLeast {
            key: key.into(),
            threshold,
        }
    }

    /// Text finding equal (case-insensitively) to one of `options`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidPattern` if `options` is empty.
    pub fn text_is(key: impl Into<String>, options: &[&str]) -> Result<Self, CatalogError> {
        Ok(Self::Text {
            key: key.into(),
            pattern: TextPattern::one_of(options)?,
        })
    }

    /// Text finding matching a regular expression.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidPattern` if the regex does not compile.
    pub fn text_matches(key: impl Into<String>, pattern: &str) -> Result<Self, CatalogError> {
        Ok(Self::Text {
            key: key.into(),
            pattern: TextPattern::new(pattern)?,
        })
    }

    /// Vital sign above the age range.
    #[must_use]
    pub const fn high_for_age(sign: VitalSign) -> Self {
        Self::Vital {
            sign,
            deviation: Deviation::High,
        }
    }

    /// Vital sign below the age range.
    #[must_use]
    pub const fn low_for_age(sign: VitalSign) -> Self {
        Self::Vital {
            sign,
            deviation: Deviation::Low,
        }
    }

    /// Conjunction.
    #[must_use]
    pub fn all(criteria: impl IntoIterator<Item = Criterion>) -> Self {
        Self::All(criteria.into_iter().collect())
    }

    /// Disjunction.
    #[must_use]
    pub fn any(criteria: impl IntoIterator<Item = Criterion>) -> Self {
        Self::Any(criteria.into_iter().collect())
    }

    /// At least `n` of `criteria`.
    #[must_use]
    pub fn at_least_n(n: usize, criteria: impl IntoIterator<Item = Criterion>) -> Self {
        Self::AtLeastN {
            n,
            of: criteria.into_iter().collect(),
        }
    }

    /// Negation. Note that `not(flag(k))` holds when `k` was never observed.
    #[must_use]
    pub fn not(criterion: Criterion) -> Self {
        Self::Not(Box::new(criterion))
    }

    /// Evaluates the criterion. Total and side-effect free.
    ///
    /// An empty `All` holds, an empty `Any` does not, and `AtLeastN` with
    /// `n == 0` always holds.
    #[must_use]
    pub fn matches(&self, ctx: &TriggerContext<'_>) -> bool {
        let findings = ctx.findings;
        match self {
            Self::Flag(key) => findings.flag(key),
            Self::Above { key, threshold } => findings.number(key).is_some_and(|v| v > *threshold),
            Self::AtLeast { key, threshold } => {
                findings.number(key).is_some_and(|v| v >= *threshold)
            }
            Self::Below { key, threshold } => findings.number(key).is_some_and(|v| v < *threshold),
            Self::AtMost { key, threshold } => {
                findings.number(key).is_some_and(|v| v <= *threshold)
            }
            Self::PerKgAtLeast { key, threshold } => {
                match (findings.number(key), ctx.usable_weight()) {
                    (Some(v), Some(kg)) => v / kg >= *threshold,
                    _ => false,
                }
            }
            Self::Text { key, pattern } => findings.text(key).is_some_and(|t| pattern.is_match(t)),
            Self::Vital {
                sign,
                deviation: Deviation::High,
            } => vitals::is_high_for_age(findings, *sign, ctx.age),
            Self::Vital {
                sign,
                deviation: Deviation::Low,
            } => vitals::is_low_for_age(findings, *sign, ctx.age),
            Self::Hypotensive => vitals::is_hypotensive(findings, ctx.age),
            Self::AgeUnderMonths(months) => ctx.age.total_months() < *months,
            Self::AgeAtLeastMonths(months) => ctx.age.total_months() >= *months,
            Self::All(criteria) => criteria.iter().all(|c| c.matches(ctx)),
            Self::Any(criteria) => criteria.iter().any(|c| c.matches(ctx)),
            Self::AtLeastN { n, of } => of.iter().filter(|c| c.matches(ctx)).take(*n).count() >= *n,
            Self::Not(inner) => !inner.matches(ctx),
        }
    }

    /// Finding keys this criterion reads, in tree order, without duplicates.
    #[must_use]
    pub fn referenced_keys(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_keys(&mut out);
        out
    }

    fn collect_keys<'s>(&'s self, out: &mut Vec<&'s str>) {
        let key = match self {
            Self::Flag(key)
            | Self::Above { key, .. }
            | Self::AtLeast { key, .. }
            | Self::Below { key, .. }
            | Self::AtMost { key, .. }
            | Self::PerKgAtLeast { key, .. }
            | Self::Text { key, .. } => key.as_str(),
            Self::Vital { sign, .. } => sign.finding_key(),
            Self::Hypotensive => keys::SYSTOLIC_BP,
            Self::AgeUnderMonths(_) | Self::AgeAtLeastMonths(_) => return,
            Self::All(criteria) | Self::Any(criteria) | Self::AtLeastN { of: criteria, .. } => {
                for c in criteria {
                    c.collect_keys(out);
                }
                return;
            }
            Self::Not(inner) => {
                inner.collect_keys(out);
                return;
            }
        };
        if !out.contains(&key) {
            out.push(key);
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, name: &str, criteria: &[Criterion]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, c) in criteria.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{c}")?;
    }
    write!(f, ")")
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(key) => write!(f, "{key}"),
            Self::Above { key, threshold } => write!(f, "{key} > {threshold}"),
            Self::AtLeast { key, threshold } => write!(f, "{key} >= {threshold}"),
            Self::Below { key, threshold } => write!(f, "{key} < {threshold}"),
            Self::AtMost { key, threshold } => write!(f, "{key} <= {threshold}"),
            Self::PerKgAtLeast { key, threshold } => write!(f, "{key}/kg >= {threshold}"),
            Self::Text { key, pattern } => write!(f, "{key} ~ /{}/", pattern.as_str()),
            Self::Vital {
                sign,
                deviation: Deviation::High,
            } => write!(f, "{sign} high for age"),
            Self::Vital {
                sign,
                deviation: Deviation::Low,
            } => write!(f, "{sign} low for age"),
            Self::Hypotensive => write!(f, "hypotensive for age"),
            Self::AgeUnderMonths(m) => write!(f, "age < {m}mo"),
            Self::AgeAtLeastMonths(m) => write!(f, "age >= {m}mo"),
            Self::All(criteria) => write_list(f, "all", criteria),
            Self::Any(criteria) => write_list(f, "any", criteria),
            Self::AtLeastN { n, of } => write_list(f, &format!("at_least_{n}"), of),
            Self::Not(inner) => write!(f, "not({inner})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(findings: &FindingSnapshot) -> TriggerContext<'_> {
        TriggerContext::new(findings, 15.0, PatientAge::from_years(2))
    }

    #[test]
    fn test_flag_and_thresholds() {
        let f = FindingSnapshot::builder()
            .finding(keys::SEIZURES, true)
            .finding(keys::LACTATE, 2.0)
            .build();
        assert!(Criterion::flag(keys::SEIZURES).matches(&ctx(&f)));
        assert!(Criterion::at_least(keys::LACTATE, 2.0).matches(&ctx(&f)));
        assert!(!Criterion::above(keys::LACTATE, 2.0).matches(&ctx(&f)));
        assert!(Criterion::at_most(keys::LACTATE, 2.0).matches(&ctx(&f)));
        assert!(!Criterion::below(keys::LACTATE, 2.0).matches(&ctx(&f)));
    }

    #[test]
    fn test_missing_finding_never_matches() {
        let f = FindingSnapshot::new();
        assert!(!Criterion::below(keys::SPO2, 90.0).matches(&ctx(&f)));
        assert!(!Criterion::above(keys::SPO2, 90.0).matches(&ctx(&f)));
        assert!(!Criterion::flag(keys::APNEA).matches(&ctx(&f)));
    }

    #[test]
    fn test_wrong_type_never_matches() {
        let f = FindingSnapshot::builder()
            .finding(keys::HEART_RATE, "fast")
            .finding(keys::SKIN_COLOR, 3)
            .build();
        assert!(!Criterion::above(keys::HEART_RATE, 100.0).matches(&ctx(&f)));
        let mottled = Criterion::text_is(keys::SKIN_COLOR, &["mottled"]).unwrap();
        assert!(!mottled.matches(&ctx(&f)));
    }

    #[test]
    fn test_text_is_case_and_whitespace_insensitive() {
        let c = Criterion::text_is(keys::SKIN_COLOR, &["mottled", "cyanotic"]).unwrap();
        let f = FindingSnapshot::builder().finding(keys::SKIN_COLOR, " Mottled ").build();
        assert!(c.matches(&ctx(&f)));
        let f = FindingSnapshot::builder().finding(keys::SKIN_COLOR, "mottled-ish").build();
        assert!(!c.matches(&ctx(&f)));
    }

    #[test]
    fn test_text_is_escapes_options() {
        let c = Criterion::text_is(keys::AVPU, &["V", "P", "U"]).unwrap();
        let f = FindingSnapshot::builder().finding(keys::AVPU, "p").build();
        assert!(c.matches(&ctx(&f)));
        assert!(TextPattern::one_of(&[]).is_err());
    }

    #[test]
    fn test_invalid_regex_is_catalog_error() {
        let err = Criterion::text_matches(keys::RASH_TYPE, "(unclosed").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPattern { .. }));
    }

    #[test]
    fn test_per_kg_requires_positive_weight() {
        let f = FindingSnapshot::builder()
            .finding(keys::PARACETAMOL_DOSE_MG, 3000)
            .build();
        let c = Criterion::per_kg_at_least(keys::PARACETAMOL_DOSE_MG, 150.0);
        assert!(c.matches(&TriggerContext::new(&f, 15.0, PatientAge::from_years(3))));
        assert!(!c.matches(&TriggerContext::new(&f, 25.0, PatientAge::from_years(3))));
        assert!(!c.matches(&TriggerContext::new(&f, 0.0, PatientAge::from_years(3))));
        assert!(!c.matches(&TriggerContext::new(&f, -4.0, PatientAge::from_years(3))));
        assert!(!c.matches(&TriggerContext::new(&f, f64::NAN, PatientAge::from_years(3))));
    }

    #[test]
    fn test_vital_for_age() {
        let f = FindingSnapshot::builder().finding(keys::RESPIRATORY_RATE, 45).build();
        assert!(Criterion::high_for_age(VitalSign::RespiratoryRate).matches(&ctx(&f)));
        assert!(!Criterion::low_for_age(VitalSign::RespiratoryRate).matches(&ctx(&f)));
    }

    #[test]
    fn test_age_bounds() {
        let f = FindingSnapshot::new();
        let infant = TriggerContext::new(&f, 5.0, PatientAge::from_months(2));
        assert!(Criterion::AgeUnderMonths(3).matches(&infant));
        assert!(!Criterion::AgeAtLeastMonths(3).matches(&infant));
    }

    #[test]
    fn test_combinators() {
        let f = FindingSnapshot::builder()
            .finding(keys::FEVER, true)
            .finding(keys::STRIDOR, true)
            .build();
        let fever = Criterion::flag(keys::FEVER);
        let stridor = Criterion::flag(keys::STRIDOR);
        let wheeze = Criterion::flag(keys::WHEEZE);

        assert!(Criterion::all([fever.clone(), stridor.clone()]).matches(&ctx(&f)));
        assert!(!Criterion::all([fever.clone(), wheeze.clone()]).matches(&ctx(&f)));
        assert!(Criterion::any([wheeze.clone(), stridor.clone()]).matches(&ctx(&f)));
        assert!(Criterion::at_least_n(2, [fever.clone(), stridor.clone(), wheeze.clone()])
            .matches(&ctx(&f)));
        assert!(!Criterion::at_least_n(3, [fever, stridor, wheeze]).matches(&ctx(&f)));

        assert!(Criterion::all(Vec::<Criterion>::new()).matches(&ctx(&f)));
        assert!(!Criterion::any(Vec::<Criterion>::new()).matches(&ctx(&f)));
        assert!(Criterion::at_least_n(0, Vec::<Criterion>::new()).matches(&ctx(&f)));
    }

    #[test]
    fn test_referenced_keys_dedup() {
        let c = Criterion::all([
            Criterion::flag(keys::FEVER),
            Criterion::any([
                Criterion::at_least(keys::TEMPERATURE, 38.0),
                Criterion::flag(keys::FEVER),
                Criterion::Hypotensive,
            ]),
        ]);
        assert_eq!(
            c.referenced_keys(),
            vec![keys::FEVER, keys::TEMPERATURE, keys::SYSTOLIC_BP]
        );
    }

    #[test]
    fn test_display() {
        let c = Criterion::all([
            Criterion::flag(keys::SEIZURES),
            Criterion::at_least(keys::SEIZURE_DURATION, 5.0),
        ]);
        assert_eq!(format!("{c}"), "all(seizures, seizureDuration >= 5)");
        assert_eq!(
            format!("{}", Criterion::high_for_age(VitalSign::HeartRate)),
            "heart_rate high for age"
        );
    }

    #[test]
    fn test_not_treats_absent_as_unobserved() {
        let c = Criterion::not(Criterion::flag(keys::DROOLING));
        let empty = FindingSnapshot::new();
        assert!(c.matches(&ctx(&empty)));

        let drooling = FindingSnapshot::builder().finding(keys::DROOLING, true).build();
        assert!(!c.matches(&ctx(&drooling)));
        assert_eq!(c.referenced_keys(), vec![keys::DROOLING]);
        assert_eq!(format!("{c}"), "not(drooling)");
    }
}
