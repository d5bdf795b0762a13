use resus_core::{
    complete_action, create_engine_manager, evaluate_and_trigger_engines, get_current_action,
    get_engine_priority_queue, get_engine_status, has_critical_engines, is_engine_active, keys,
    FindingSnapshot, PatientAge, Severity,
};

fn septic_findings() -> FindingSnapshot {
    FindingSnapshot::builder()
        .finding(keys::FEVER, true)
        .finding(keys::TEMPERATURE, 39.5)
        .finding(keys::RESPIRATORY_RATE, 45)
        .finding(keys::HEART_RATE, 170)
        .finding(keys::CAPILLARY_REFILL, 3)
        .finding(keys::SKIN_COLOR, "mottled")
        .finding(keys::LACTATE, 3)
        .build()
}

fn seizing() -> FindingSnapshot {
    FindingSnapshot::builder().finding(keys::SEIZURES, true).build()
}

#[test]
fn septic_shock_triggers_critical_engine() {
    let state = evaluate_and_trigger_engines(
        &septic_findings(),
        15.0,
        PatientAge::new(2, 0),
        &create_engine_manager(),
    );

    assert!(is_engine_active(&state, "septic-shock"));
    assert!(has_critical_engines(&state));
    assert_eq!(state.assessment_history.len(), 1);

    let queue = get_engine_priority_queue(&state);
    assert_eq!(queue[0].engine_id, "septic-shock");
    assert!(!queue.iter().any(|a| a.engine_id == "status-epilepticus"));
}

#[test]
fn septic_shock_from_json_snapshot() {
    let findings: FindingSnapshot = serde_json::from_str(
        r#"{"fever":true,"temperature":39.5,"respiratoryRate":45,"heartRate":170,
            "capillaryRefill":3,"skinColor":"mottled","lactate":3}"#,
    )
    .unwrap();
    assert_eq!(findings, septic_findings());

    let state = evaluate_and_trigger_engines(
        &findings,
        15.0,
        PatientAge::new(2, 0),
        &create_engine_manager(),
    );
    assert!(is_engine_active(&state, "septic-shock"));
}

#[test]
fn status_epilepticus_action_completion() {
    let state = evaluate_and_trigger_engines(
        &seizing(),
        14.0,
        PatientAge::new(3, 0),
        &create_engine_manager(),
    );

    let activations: Vec<_> = state
        .active_engines
        .iter()
        .filter(|a| a.engine_id == "status-epilepticus")
        .collect();
    assert_eq!(activations.len(), 1);

    let status = get_engine_status(activations[0]).unwrap();
    assert_eq!(status.severity, Severity::Critical);
    assert_eq!(status.completed_count, 0);
    assert_eq!(status.progress_percent, 0);

    let first = get_current_action(activations[0]).unwrap();
    let state = complete_action(&state, "status-epilepticus", &first.id);

    let status = get_engine_status(state.find_active("status-epilepticus").unwrap()).unwrap();
    assert_eq!(status.completed_count, 1);
    assert!(status.progress_percent > 0);
    assert_ne!(status.current_action.unwrap().id, first.id);
}

#[test]
fn idempotent_retrigger() {
    let age = PatientAge::new(3, 0);
    let state = evaluate_and_trigger_engines(&seizing(), 14.0, age, &create_engine_manager());
    let before = state.active_engines.len();

    let again = evaluate_and_trigger_engines(&seizing(), 14.0, age, &state);
    assert_eq!(again.active_engines.len(), before);
    assert_eq!(again.assessment_history.len(), 2);
    assert_eq!(
        again
            .active_engines
            .iter()
            .filter(|a| a.engine_id == "status-epilepticus")
            .count(),
        1
    );
}

#[test]
fn concurrent_protocols_from_one_snapshot() {
    let findings = FindingSnapshot::builder()
        .finding(keys::FEVER, true)
        .finding(keys::TEMPERATURE, 39.5)
        .finding(keys::HEART_RATE, 170)
        .finding(keys::CAPILLARY_REFILL, 4)
        .finding(keys::LACTATE, 4)
        .finding(keys::SPO2, 85)
        .build();
    let state = evaluate_and_trigger_engines(
        &findings,
        15.0,
        PatientAge::new(2, 0),
        &create_engine_manager(),
    );

    assert!(is_engine_active(&state, "septic-shock"));
    assert!(is_engine_active(&state, "respiratory-failure"));
    assert!(is_engine_active(&state, "fever-management"));

    let queue = get_engine_priority_queue(&state);
    let last = queue.last().unwrap();
    assert_eq!(last.engine_id, "fever-management");
}

#[test]
fn weight_and_age_shape_triggers() {
    let findings = FindingSnapshot::builder()
        .finding(keys::FEVER, true)
        .finding(keys::TEMPERATURE, 38.4)
        .build();

    let infant = evaluate_and_trigger_engines(
        &findings,
        5.0,
        PatientAge::from_months(2),
        &create_engine_manager(),
    );
    assert!(is_engine_active(&infant, "febrile-infant"));

    let toddler = evaluate_and_trigger_engines(
        &findings,
        12.0,
        PatientAge::new(2, 0),
        &create_engine_manager(),
    );
    assert!(!is_engine_active(&toddler, "febrile-infant"));
    assert!(is_engine_active(&toddler, "fever-management"));
}

#[test]
fn nonsense_inputs_trigger_nothing() {
    let findings = FindingSnapshot::builder()
        .finding(keys::HEART_RATE, -40)
        .finding(keys::SEIZURES, "yes")
        .finding(keys::PARACETAMOL_DOSE_MG, 5000)
        .build();
    let state = evaluate_and_trigger_engines(
        &findings,
        -3.0,
        PatientAge::new(4, 0),
        &create_engine_manager(),
    );
    assert!(state.active_engines.is_empty());
    assert_eq!(state.assessment_history.len(), 1);
}
