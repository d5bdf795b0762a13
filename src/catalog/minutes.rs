//! Minutes tier: protocols where untreated harm occurs within minutes.
//!
//! These carry full, ordered checklists. Doses are weight-based and shown as
//! detail notes; the core never computes or schedules them.

use crate::catalog::criterion::Criterion;
use crate::catalog::definition::{Category, EngineDefinition, Severity, Tier, Urgency};
use crate::catalog::{altered_mental_status, febrile};
use crate::error::CatalogError;
use crate::findings::keys;
use crate::vitals::VitalSign;

use Urgency::{Immediate, Routine, Urgent};

pub(super) fn engines() -> Result<Vec<EngineDefinition>, CatalogError> {
    Ok(vec![
        cardiac_arrest()?,
        respiratory_failure()?,
        upper_airway_obstruction()?,
        septic_shock()?,
        hemorrhagic_shock()?,
        anaphylaxis()?,
        status_epilepticus()?,
        raised_icp()?,
        severe_asthma()?,
        supraventricular_tachycardia()?,
        hypoglycemia()?,
        hyperkalemia()?,
        diabetic_ketoacidosis()?,
    ])
}

fn cardiac_arrest() -> Result<EngineDefinition, CatalogError> {
    EngineDefinition::builder("cardiac-arrest", "Cardiac Arrest")
        .category(Category::Resuscitation)
        .severity(Severity::Critical)
        .tier(Tier::Minutes)
        .trigger(Criterion::any([
            Criterion::flag(keys::PULSELESS),
            Criterion::all([
                Criterion::flag(keys::APNEA),
                Criterion::text_is(keys::AVPU, &["U"])?,
            ]),
        ]))
        .action(1, "start-cpr", "Start high-quality CPR", Immediate)
        .detail("15:2 with two rescuers, rate 100-120/min, depth one third of chest")
        .action(2, "call-for-help", "Call resuscitation team", Immediate)
        .action(3, "attach-defibrillator", "Attach monitor/defibrillator", Immediate)
        .action(4, "assess-rhythm", "Assess rhythm: shockable or non-shockable", Immediate)
        .detail("Shockable: defibrillate 4 J/kg")
        .action(5, "vascular-access", "Obtain IV/IO access", Immediate)
        .action(6, "epinephrine", "Give epinephrine", Immediate)
        .detail("0.01 mg/kg (0.1 mL/kg of 0.1 mg/mL) IV/IO, repeat every 3-5 min")
        .action(7, "advanced-airway", "Consider advanced airway and capnography", Urgent)
        .action(8, "reversible-causes", "Treat reversible causes (Hs and Ts)", Urgent)
        .build()
}

fn respiratory_failure() -> Result<EngineDefinition, CatalogError> {
    EngineDefinition::builder("respiratory-failure", "Respiratory Failure")
        .category(Category::Respiratory)
        .severity(Severity::Critical)
        .tier(Tier::Minutes)
        .trigger(Criterion::any([
            Criterion::flag(keys::APNEA),
            Criterion::flag(keys::GASPING),
            Criterion::below(keys::SPO2, 90.0),
            Criterion::all([
                Criterion::high_for_age(VitalSign::RespiratoryRate),
                Criterion::flag(keys::RETRACTIONS),
                altered_mental_status()?,
            ]),
        ]))
        .action(1, "open-airway", "Open and position airway", Immediate)
        .action(2, "high-flow-oxygen", "Give high-flow oxygen", Immediate)
        .detail("15 L/min via non-rebreather")
        .action(3, "bag-mask", "Bag-mask ventilation if inadequate effort", Immediate)
        .action(4, "monitoring", "Continuous SpO2 and end-tidal CO2", Urgent)
        .action(5, "prepare-intubation", "Prepare for intubation", Urgent)
        .action(6, "blood-gas", "Blood gas", Routine)
        .build()
}

fn upper_airway_obstruction() -> Result<EngineDefinition, CatalogError> {
    EngineDefinition::builder("upper-airway-obstruction", "Upper Airway Obstruction")
        .category(Category::Respiratory)
        .severity(Severity::Critical)
        .tier(Tier::Minutes)
        .trigger(Criterion::all([
            Criterion::flag(keys::STRIDOR),
            Criterion::any([
                Criterion::flag(keys::DROOLING),
                Criterion::below(keys::SPO2, 92.0),
            ]),
        ]))
        .action(1, "keep-calm", "Keep child calm in position of comfort", Immediate)
        .detail("Do not examine the throat or lie the child flat")
        .action(2, "oxygen", "Blow-by oxygen", Immediate)
        .action(3, "senior-airway", "Call senior anaesthetist and ENT", Immediate)
        .action(4, "surgical-airway-kit", "Prepare difficult/surgical airway kit", Urgent)
        .build()
}

fn septic_shock() -> Result<EngineDefinition, CatalogError> {
    EngineDefinition::builder("septic-shock", "Septic Shock")
        .category(Category::Infectious)
        .severity(Severity::Critical)
        .tier(Tier::Minutes)
        .trigger(Criterion::all([
            Criterion::any([febrile(), Criterion::below(keys::TEMPERATURE, 36.0)]),
            Criterion::at_least_n(
                2,
                [
                    Criterion::above(keys::CAPILLARY_REFILL, 2.0),
                    Criterion::text_is(keys::SKIN_COLOR, &["mottled", "cyanotic", "ashen"])?,
                    Criterion::at_least(keys::LACTATE, 2.0),
                    Criterion::Hypotensive,
                    Criterion::high_for_age(VitalSign::HeartRate),
                    altered_mental_status()?,
                ],
            ),
        ]))
        .action(1, "oxygen", "Give high-flow oxygen", Immediate)
        .action(2, "vascular-access", "Obtain IV/IO access", Immediate)
        .action(3, "cultures-lactate", "Blood culture, lactate and glucose", Immediate)
        .action(4, "fluid-bolus", "Fluid bolus", Immediate)
        .detail("10-20 mL/kg balanced crystalloid over 5-10 min, reassess after each")
        .action(5, "antibiotics", "Broad-spectrum antibiotics within 1 hour", Immediate)
        .action(6, "reassess-perfusion", "Reassess perfusion after bolus", Urgent)
        .detail("Stop fluids if hepatomegaly or crackles develop")
        .action(7, "vasoactive", "Start vasoactive infusion if fluid-refractory", Urgent)
        .detail("Epinephrine 0.05-0.3 mcg/kg/min via peripheral or central line")
        .build()
}

fn hemorrhagic_shock() -> Result<EngineDefinition, CatalogError> {
    EngineDefinition::builder("hemorrhagic-shock", "Hemorrhagic Shock")
        .category(Category::Trauma)
        .severity(Severity::Critical)
        .tier(Tier::Minutes)
        .trigger(Criterion::all([
            Criterion::any([
                Criterion::flag(keys::TRAUMA),
                Criterion::flag(keys::ACTIVE_BLEEDING),
            ]),
            Criterion::any([
                Criterion::Hypotensive,
                Criterion::per_kg_at_least(keys::BLOOD_LOSS_ML, 20.0),
                Criterion::all([
                    Criterion::high_for_age(VitalSign::HeartRate),
                    Criterion::above(keys::CAPILLARY_REFILL, 2.0),
                ]),
            ]),
        ]))
        .action(1, "control-bleeding", "Control external hemorrhage", Immediate)
        .detail("Direct pressure, tourniquet for limb bleeding")
        .action(2, "vascular-access", "Two large-bore IV/IO lines", Immediate)
        .action(3, "blood-products", "Transfuse blood products", Immediate)
        .detail("10 mL/kg red cells; activate major haemorrhage protocol if ongoing")
        .action(4, "tranexamic-acid", "Tranexamic acid within 3 hours of injury", Urgent)
        .detail("15 mg/kg (max 1 g) over 10 min")
        .action(5, "trauma-team", "Activate trauma team and surgical review", Urgent)
        .build()
}

fn anaphylaxis() -> Result<EngineDefinition, CatalogError> {
    let airway_or_circulation = || {
        Criterion::any([
            Criterion::flag(keys::STRIDOR),
            Criterion::flag(keys::WHEEZE),
            Criterion::Hypotensive,
        ])
    };
    EngineDefinition::builder("anaphylaxis", "Anaphylaxis")
        .category(Category::Allergic)
        .severity(Severity::Critical)
        .tier(Tier::Minutes)
        .trigger(Criterion::any([
            Criterion::all([
                Criterion::flag(keys::ALLERGEN_EXPOSURE),
                Criterion::any([airway_or_circulation(), Criterion::flag(keys::ANGIOEDEMA)]),
            ]),
            Criterion::all([Criterion::flag(keys::URTICARIA), airway_or_circulation()]),
            Criterion::all([
                Criterion::flag(keys::ANGIOEDEMA),
                Criterion::flag(keys::STRIDOR),
            ]),
        ]))
        .action(1, "remove-trigger", "Remove the trigger if possible", Immediate)
        .action(2, "im-epinephrine", "Give IM epinephrine", Immediate)
        .detail("0.01 mg/kg of 1 mg/mL into anterolateral thigh, max 0.5 mg")
        .action(
            3,
            "position",
            "Lie flat with legs raised, or sit if breathing is difficult",
            Immediate,
        )
        .action(4, "oxygen", "High-flow oxygen", Immediate)
        .action(5, "fluid-bolus", "Fluid bolus if hypotensive", Urgent)
        .detail("20 mL/kg crystalloid")
        .action(
            6,
            "repeat-epinephrine",
            "Repeat IM epinephrine after 5 minutes if no improvement",
            Urgent,
        )
        .action(7, "observe", "Observe for biphasic reaction", Routine)
        .build()
}

fn status_epilepticus() -> Result<EngineDefinition, CatalogError> {
    EngineDefinition::builder("status-epilepticus", "Status Epilepticus")
        .category(Category::Neurological)
        .severity(Severity::Critical)
        .tier(Tier::Minutes)
        .trigger(Criterion::flag(keys::SEIZURES))
        .action(1, "airway-oxygen", "Protect airway and give oxygen", Immediate)
        .action(2, "check-glucose", "Check bedside glucose", Immediate)
        .action(3, "first-benzodiazepine", "First-line benzodiazepine", Immediate)
        .detail("Midazolam 0.3 mg/kg buccal or lorazepam 0.1 mg/kg IV")
        .action(
            4,
            "second-benzodiazepine",
            "Second benzodiazepine dose if seizing after 5 minutes",
            Immediate,
        )
        .action(5, "second-line-agent", "Second-line agent", Urgent)
        .detail("Levetiracetam 40 mg/kg, phenytoin 20 mg/kg or valproate 40 mg/kg IV")
        .action(6, "prepare-rsi", "Prepare rapid sequence induction if refractory", Urgent)
        .build()
}

fn raised_icp() -> Result<EngineDefinition, CatalogError> {
    EngineDefinition::builder("raised-icp", "Raised Intracranial Pressure")
        .category(Category::Neurological)
        .severity(Severity::Critical)
        .tier(Tier::Minutes)
        .trigger(Criterion::any([
            Criterion::all([
                Criterion::flag(keys::HEAD_INJURY),
                Criterion::at_most(keys::GCS, 8.0),
            ]),
            Criterion::all([
                Criterion::flag(keys::PUPILS_UNEQUAL),
                Criterion::any([
                    Criterion::at_most(keys::GCS, 12.0),
                    Criterion::text_is(keys::AVPU, &["P", "U"])?,
                ]),
            ]),
        ]))
        .action(1, "protect-airway", "Secure airway, avoid hypoxia and hypercapnia", Immediate)
        .action(2, "head-up", "Head midline, bed at 30 degrees", Immediate)
        .action(3, "hyperosmolar", "Hyperosmolar therapy", Immediate)
        .detail("3% saline 3-5 mL/kg or mannitol 0.5-1 g/kg")
        .action(4, "maintain-bp", "Maintain normal blood pressure for age", Urgent)
        .action(5, "ct-neurosurgery", "Urgent CT and neurosurgical referral", Urgent)
        .build()
}

fn severe_asthma() -> Result<EngineDefinition, CatalogError> {
    EngineDefinition::builder("severe-asthma", "Severe Acute Asthma")
        .category(Category::Respiratory)
        .severity(Severity::Urgent)
        .tier(Tier::Minutes)
        .trigger(Criterion::all([
            Criterion::flag(keys::WHEEZE),
            Criterion::any([
                Criterion::below(keys::SPO2, 92.0),
                Criterion::all([
                    Criterion::high_for_age(VitalSign::RespiratoryRate),
                    Criterion::flag(keys::RETRACTIONS),
                ]),
                altered_mental_status()?,
            ]),
        ]))
        .action(1, "oxygen", "Oxygen to SpO2 94-98%", Immediate)
        .action(2, "salbutamol", "Back-to-back salbutamol", Immediate)
        .detail("2.5-5 mg nebulised every 20 min")
        .action(3, "ipratropium", "Add ipratropium bromide", Immediate)
        .action(4, "steroids", "Systemic corticosteroid", Urgent)
        .detail("Prednisolone 1-2 mg/kg or dexamethasone 0.3-0.6 mg/kg")
        .action(5, "magnesium", "IV magnesium sulfate if poor response", Urgent)
        .detail("40 mg/kg over 20 min, max 2 g")
        .action(6, "reassess", "Reassess work of breathing", Routine)
        .build()
}

fn supraventricular_tachycardia() -> Result<EngineDefinition, CatalogError> {
    EngineDefinition::builder("svt", "Supraventricular Tachycardia")
        .category(Category::Cardiovascular)
        .severity(Severity::Urgent)
        .tier(Tier::Minutes)
        .trigger(Criterion::any([
            Criterion::flag(keys::NARROW_COMPLEX_TACHYCARDIA),
            Criterion::all([
                Criterion::AgeUnderMonths(12),
                Criterion::at_least(keys::HEART_RATE, 220.0),
            ]),
            Criterion::all([
                Criterion::AgeAtLeastMonths(12),
                Criterion::at_least(keys::HEART_RATE, 180.0),
            ]),
        ]))
        .action(1, "ecg", "12-lead ECG", Immediate)
        .action(2, "vagal", "Vagal manoeuvres", Immediate)
        .detail("Ice to face in infants, Valsalva in older children")
        .action(3, "adenosine", "Adenosine rapid IV push", Immediate)
        .detail("0.1 mg/kg (max 6 mg), then 0.2 mg/kg (max 12 mg)")
        .action(4, "cardioversion", "Synchronized cardioversion if unstable", Urgent)
        .detail("0.5-1 J/kg, then 2 J/kg")
        .build()
}

fn hypoglycemia() -> Result<EngineDefinition, CatalogError> {
    EngineDefinition::builder("hypoglycemia", "Hypoglycemia")
        .category(Category::Metabolic)
        .severity(Severity::Urgent)
        .tier(Tier::Minutes)
        .trigger(Criterion::below(keys::GLUCOSE, 3.0))
        .action(1, "dextrose-bolus", "Dextrose bolus", Immediate)
        .detail("2 mL/kg of 10% dextrose IV")
        .action(2, "recheck-glucose", "Recheck glucose after 15 minutes", Urgent)
        .action(3, "maintenance-dextrose", "Start dextrose-containing maintenance fluids", Urgent)
        .action(
            4,
            "hypoglycemia-screen",
            "Send hypoglycemia screen before correction if possible",
            Routine,
        )
        .build()
}

fn hyperkalemia() -> Result<EngineDefinition, CatalogError> {
    EngineDefinition::builder("hyperkalemia", "Hyperkalemia")
        .category(Category::Metabolic)
        .severity(Severity::Urgent)
        .tier(Tier::Minutes)
        .trigger(Criterion::at_least(keys::POTASSIUM, 6.5))
        .action(1, "ecg", "12-lead ECG and continuous monitoring", Immediate)
        .action(2, "calcium", "IV calcium gluconate if ECG changes", Immediate)
        .detail("10% calcium gluconate 0.5 mL/kg over 5-10 min")
        .action(3, "insulin-dextrose", "Insulin with dextrose", Urgent)
        .action(4, "salbutamol", "Nebulised salbutamol", Urgent)
        .action(5, "stop-potassium", "Stop all potassium intake", Routine)
        .build()
}

fn diabetic_ketoacidosis() -> Result<EngineDefinition, CatalogError> {
    EngineDefinition::builder("dka", "Diabetic Ketoacidosis")
        .category(Category::Metabolic)
        .severity(Severity::Urgent)
        .tier(Tier::Minutes)
        .trigger(Criterion::all([
            Criterion::at_least(keys::GLUCOSE, 11.0),
            Criterion::any([
                Criterion::flag(keys::KETONES),
                Criterion::below(keys::PH, 7.3),
            ]),
        ]))
        .action(1, "confirm-labs", "Blood gas, ketones, electrolytes", Immediate)
        .action(2, "fluid-bolus", "Cautious fluid bolus only if shocked", Urgent)
        .detail("10 mL/kg 0.9% saline")
        .action(3, "insulin", "Start insulin infusion one hour after fluids", Urgent)
        .detail("0.05-0.1 units/kg/hour, no bolus")
        .action(4, "potassium", "Add potassium to fluids once urine output confirmed", Urgent)
        .action(5, "neuro-obs", "Hourly neurological observations for cerebral edema", Routine)
        .action(6, "hourly-glucose", "Hourly capillary glucose", Routine)
        .build()
}
