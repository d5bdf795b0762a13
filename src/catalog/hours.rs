//! Hours tier: the long tail of protocols where harm develops over hours.
//!
//! Stored as flat records with short checklists numbered in listed order.

use crate::catalog::criterion::Criterion;
use crate::catalog::definition::{Category, EngineDefinition, Severity, Tier, Urgency};
use crate::catalog::febrile;
use crate::error::CatalogError;
use crate::findings::keys;
use crate::vitals::VitalSign;

use Urgency::{Immediate, Routine, Urgent};

type Step = (&'static str, &'static str, Urgency);

fn flat(
    id: &str,
    name: &str,
    category: Category,
    severity: Severity,
    trigger: Criterion,
    steps: &[Step],
) -> Result<EngineDefinition, CatalogError> {
    EngineDefinition::builder(id, name)
        .category(category)
        .severity(severity)
        .tier(Tier::Hours)
        .trigger(trigger)
        .steps(steps)
        .build()
}

pub(super) fn engines() -> Result<Vec<EngineDefinition>, CatalogError> {
    use Category::{Gastrointestinal, Infectious, Metabolic, Respiratory, Toxicology, Trauma};
    use Severity::{Info, Urgent as UrgentSeverity};

    Ok(vec![
        flat(
            "bacterial-meningitis",
            "Suspected Bacterial Meningitis",
            Infectious,
            UrgentSeverity,
            Criterion::all([
                febrile(),
                Criterion::any([
                    Criterion::flag(keys::NECK_STIFFNESS),
                    Criterion::flag(keys::BULGING_FONTANELLE),
                    Criterion::text_is(keys::RASH_TYPE, &["petechial", "purpuric"])?,
                ]),
            ]),
            &[
                ("blood-culture", "Blood culture before antibiotics", Immediate),
                ("ceftriaxone", "IV ceftriaxone within 1 hour", Immediate),
                ("dexamethasone", "Consider dexamethasone", Urgent),
                ("lumbar-puncture", "Lumbar puncture when stable", Routine),
            ],
        )?,
        flat(
            "febrile-infant",
            "Febrile Young Infant",
            Infectious,
            UrgentSeverity,
            Criterion::all([febrile(), Criterion::AgeUnderMonths(3)]),
            &[
                ("septic-workup", "Blood, urine and CSF cultures", Urgent),
                ("empiric-antibiotics", "Empiric IV antibiotics", Urgent),
                ("admit", "Admit for observation", Routine),
            ],
        )?,
        flat(
            "croup",
            "Croup",
            Respiratory,
            UrgentSeverity,
            Criterion::all([
                Criterion::flag(keys::BARKING_COUGH),
                Criterion::flag(keys::STRIDOR),
                Criterion::not(Criterion::flag(keys::DROOLING)),
            ]),
            &[
                ("dexamethasone", "Oral dexamethasone 0.15-0.6 mg/kg", Urgent),
                ("nebulised-epinephrine", "Nebulised epinephrine if stridor at rest", Urgent),
                ("observe", "Observe 2-4 hours after epinephrine", Routine),
            ],
        )?,
        flat(
            "bronchiolitis",
            "Bronchiolitis",
            Respiratory,
            Info,
            Criterion::all([
                Criterion::AgeUnderMonths(24),
                Criterion::any([
                    Criterion::flag(keys::WHEEZE),
                    Criterion::flag(keys::RETRACTIONS),
                ]),
                Criterion::high_for_age(VitalSign::RespiratoryRate),
            ]),
            &[
                ("suction", "Nasal suction", Routine),
                ("oxygen-if-low", "Oxygen if SpO2 below 90%", Urgent),
                ("feeding", "Assess feeding and hydration", Routine),
            ],
        )?,
        flat(
            "dehydration",
            "Moderate to Severe Dehydration",
            Gastrointestinal,
            UrgentSeverity,
            Criterion::all([
                Criterion::any([
                    Criterion::flag(keys::VOMITING),
                    Criterion::flag(keys::DIARRHEA),
                ]),
                Criterion::text_is(keys::DEHYDRATION, &["moderate", "severe"])?,
            ]),
            &[
                ("estimate-deficit", "Estimate fluid deficit", Urgent),
                ("rehydrate", "Oral, nasogastric or IV rehydration", Urgent),
                ("electrolytes", "Check electrolytes and glucose", Routine),
            ],
        )?,
        flat(
            "intussusception",
            "Suspected Intussusception",
            Gastrointestinal,
            UrgentSeverity,
            Criterion::all([
                Criterion::flag(keys::ABDOMINAL_PAIN),
                Criterion::flag(keys::CURRANT_JELLY_STOOL),
            ]),
            &[
                ("ultrasound", "Abdominal ultrasound", Urgent),
                ("surgical-review", "Paediatric surgical review", Urgent),
                ("enema-reduction", "Air enema reduction if confirmed", Routine),
            ],
        )?,
        flat(
            "malrotation-volvulus",
            "Bilious Vomiting",
            Gastrointestinal,
            UrgentSeverity,
            Criterion::flag(keys::BILIOUS_VOMITING),
            &[
                ("nil-by-mouth", "Nil by mouth and nasogastric tube", Urgent),
                ("surgical-review", "Urgent surgical review", Urgent),
                ("contrast-study", "Upper GI contrast study", Routine),
            ],
        )?,
        flat(
            "kawasaki-disease",
            "Kawasaki Disease",
            Infectious,
            Info,
            Criterion::all([
                Criterion::at_least(keys::FEVER_DAYS, 5.0),
                Criterion::at_least_n(
                    2,
                    [
                        Criterion::flag(keys::CONJUNCTIVITIS),
                        Criterion::flag(keys::STRAWBERRY_TONGUE),
                        Criterion::flag(keys::EXTREMITY_CHANGES),
                        Criterion::text_is(keys::RASH_TYPE, &["maculopapular", "polymorphous"])?,
                    ],
                ),
            ]),
            &[
                ("echocardiogram", "Echocardiogram", Routine),
                ("ivig", "IV immunoglobulin 2 g/kg", Urgent),
                ("aspirin", "Aspirin", Routine),
            ],
        )?,
        flat(
            "urinary-tract-infection",
            "Febrile Urinary Tract Infection",
            Infectious,
            Info,
            Criterion::all([febrile(), Criterion::flag(keys::DYSURIA)]),
            &[
                ("urinalysis", "Urinalysis and culture", Routine),
                ("antibiotics", "Start antibiotics", Routine),
            ],
        )?,
        flat(
            "septic-arthritis",
            "Suspected Septic Arthritis",
            Infectious,
            UrgentSeverity,
            Criterion::all([febrile(), Criterion::flag(keys::LIMP)]),
            &[
                ("bloods", "FBC, CRP and blood culture", Urgent),
                ("imaging", "Joint ultrasound", Urgent),
                ("orthopaedics", "Orthopaedic review", Urgent),
            ],
        )?,
        flat(
            "major-burns",
            "Major Burns",
            Trauma,
            UrgentSeverity,
            Criterion::at_least(keys::BURN_TBSA, 10.0),
            &[
                ("analgesia", "Analgesia", Immediate),
                ("fluid-resuscitation", "Burns fluid resuscitation", Urgent),
                ("burns-unit", "Refer to burns unit", Routine),
            ],
        )?,
        flat(
            "paracetamol-overdose",
            "Paracetamol Overdose",
            Toxicology,
            UrgentSeverity,
            Criterion::per_kg_at_least(keys::PARACETAMOL_DOSE_MG, 150.0),
            &[
                ("level", "Paracetamol level at 4 hours post-ingestion", Urgent),
                ("acetylcysteine", "Acetylcysteine if above treatment line", Urgent),
                ("liver-function", "Liver function and INR", Routine),
            ],
        )?,
        flat(
            "toxic-ingestion",
            "Toxic Ingestion",
            Toxicology,
            Info,
            Criterion::flag(keys::TOXIC_INGESTION),
            &[
                ("poisons-centre", "Contact poisons information centre", Urgent),
                ("ecg", "12-lead ECG", Routine),
                ("decontamination", "Consider decontamination", Routine),
            ],
        )?,
        flat(
            "hypothermia",
            "Hypothermia",
            Metabolic,
            UrgentSeverity,
            Criterion::below(keys::TEMPERATURE, 35.0),
            &[
                ("rewarm", "Active external rewarming", Urgent),
                ("glucose", "Check glucose", Urgent),
            ],
        )?,
        flat(
            "fever-management",
            "Fever",
            Infectious,
            Info,
            febrile(),
            &[
                ("antipyretic", "Antipyretic", Routine),
                ("source", "Look for a source", Routine),
            ],
        )?,
    ])
}
