//! End-to-end review workflows against a file-backed database.

mod common;

use chrono::NaiveDate;

use claimdesk::db::review_repo::{
    AWARD_COMMISSIONER_REVIEW, AWARD_REGISTRAR_REVIEW, CPM_REVIEW, CPO_REVIEW, FORM18, FORM6,
};
use claimdesk::history;
use claimdesk::workflow::CertificateOutcome;
use claimdesk::{
    ClaimdeskError, Decision, DecisionOutcome, DecisionSubmission, ReviewStage, WorkerService,
    WorkflowError,
};

use common::harness::{CHIEF_COMMISSIONER, CLAIMS_MANAGER, COMMISSIONER, REGISTRAR};
use common::{ClaimBuilder, TestHarness, WorkerFormBuilder};

fn decided(decision: Decision, reason: Option<&str>) -> DecisionSubmission {
    DecisionSubmission::new(decision, reason, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap())
}

fn register_worker(harness: &TestHarness) -> i64 {
    WorkerService::new(harness.db.clone())
        .register(&WorkerFormBuilder::new("Kevin", "Tamba").build())
        .unwrap()
        .worker_id
}

#[test]
fn test_chief_commissioner_approval_queues_registrar_review() {
    let harness = TestHarness::new();
    let irn = harness.add_claim(
        ClaimBuilder::new(100, 1, "Injury").at_stage(AWARD_COMMISSIONER_REVIEW, None),
    );
    let workflow = harness.workflow();
    let chief = harness.session(CHIEF_COMMISSIONER);

    workflow.open_review(ReviewStage::CommissionerAward, irn, &chief).unwrap();
    let outcome = workflow
        .submit(
            ReviewStage::CommissionerAward,
            irn,
            &chief,
            &decided(Decision::Approved, None),
        )
        .unwrap();

    assert_eq!(outcome.status(), Some("ChiefCommissionerAccepted"));
    assert_eq!(
        harness.status(AWARD_COMMISSIONER_REVIEW, irn).as_deref(),
        Some("ChiefCommissionerAccepted")
    );
    assert_eq!(
        harness.status(AWARD_REGISTRAR_REVIEW, irn).as_deref(),
        Some("RegistrarReviewPending")
    );
    let registrar_table = AWARD_REGISTRAR_REVIEW.table;
    assert_eq!(
        harness.text_column(registrar_table, "IncidentType", irn).as_deref(),
        Some("Injury")
    );
    assert_eq!(
        harness.text_column(registrar_table, "ClaimType", irn).as_deref(),
        Some("Form11")
    );
}

#[test]
fn test_commissioner_rejection_stays_at_stage() {
    let harness = TestHarness::new();
    let irn = harness.add_claim(
        ClaimBuilder::new(101, 1, "Injury").at_stage(AWARD_COMMISSIONER_REVIEW, None),
    );
    let workflow = harness.workflow();
    let commissioner = harness.session(COMMISSIONER);

    workflow.open_review(ReviewStage::CommissionerAward, irn, &commissioner).unwrap();
    workflow
        .submit(
            ReviewStage::CommissionerAward,
            irn,
            &commissioner,
            &decided(Decision::Reject, Some("Medical evidence incomplete")),
        )
        .unwrap();

    assert_eq!(
        harness.status(AWARD_COMMISSIONER_REVIEW, irn).as_deref(),
        Some("CommissionerRejected")
    );
    assert_eq!(
        harness
            .text_column(AWARD_COMMISSIONER_REVIEW.table, "CACRDecisionReason", irn)
            .as_deref(),
        Some("Medical evidence incomplete")
    );
    assert_eq!(harness.row_count(AWARD_REGISTRAR_REVIEW.table, irn), 0);
}

#[test]
fn test_registrar_acceptance_issues_certificate() {
    let harness = TestHarness::new();
    let worker_id = register_worker(&harness);
    let irn = harness.add_claim(
        ClaimBuilder::new(102, worker_id, "Injury")
            .component(1000.0)
            .component(200.0)
            .component(50.0)
            .component(-25.0)
            .at_stage(AWARD_COMMISSIONER_REVIEW, Some("ChiefCommissionerAccepted"))
            .at_stage(AWARD_REGISTRAR_REVIEW, Some("RegistrarReviewPending")),
    );
    let workflow = harness.workflow();
    let registrar = harness.session(REGISTRAR);

    let context = workflow.open_review(ReviewStage::RegistrarAward, irn, &registrar).unwrap();
    assert_eq!(context.compensation_total, 1225.0);
    assert_eq!(context.worker_name, "Kevin Tamba");

    let outcome = workflow
        .submit(
            ReviewStage::RegistrarAward,
            irn,
            &registrar,
            &decided(Decision::Approved, None),
        )
        .unwrap();

    match outcome {
        DecisionOutcome::Awarded {
            status,
            certificate: CertificateOutcome::Written(path),
        } => {
            assert_eq!(status, "RegistrarAccepted");
            assert_eq!(path, harness.output_dir.join("ConsentOfAward-Injury-CRN-0102.pdf"));
            assert!(path.exists());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_certificate_failure_keeps_decision() {
    let mut harness = TestHarness::new();
    harness.config.assets.crest = Some("/nonexistent/crest.png".to_string());
    let irn = harness.add_claim(
        ClaimBuilder::new(103, 1, "Injury").at_stage(AWARD_REGISTRAR_REVIEW, None),
    );
    let workflow = harness.workflow();
    let registrar = harness.session(REGISTRAR);

    workflow.open_review(ReviewStage::RegistrarAward, irn, &registrar).unwrap();
    let outcome = workflow
        .submit(
            ReviewStage::RegistrarAward,
            irn,
            &registrar,
            &decided(Decision::Approved, None),
        )
        .unwrap();

    assert!(matches!(
        outcome,
        DecisionOutcome::Awarded {
            certificate: CertificateOutcome::Failed(_),
            ..
        }
    ));
    assert_eq!(
        harness.status(AWARD_REGISTRAR_REVIEW, irn).as_deref(),
        Some("RegistrarAccepted")
    );
}

#[test]
fn test_cpm_death_approval_opens_form6() {
    let harness = TestHarness::new();
    let worker_id = register_worker(&harness);
    let irn = harness.add_claim(ClaimBuilder::new(104, worker_id, "Death").at_stage(CPM_REVIEW, None));
    let workflow = harness.workflow();
    let cpm = harness.session(CLAIMS_MANAGER);

    workflow.open_review(ReviewStage::Cpm, irn, &cpm).unwrap();
    workflow
        .submit(ReviewStage::Cpm, irn, &cpm, &decided(Decision::Approved, None))
        .unwrap();

    assert_eq!(harness.status(CPM_REVIEW, irn).as_deref(), Some("Approved"));
    assert_eq!(harness.status(FORM6, irn).as_deref(), Some("Pending"));
    assert_eq!(
        harness.text_column(FORM6.table, "EmployerCPPSID", irn).as_deref(),
        Some("CPPS-100")
    );
    assert_eq!(
        harness.text_column(FORM6.table, "IncidentType", irn).as_deref(),
        Some("Death")
    );
    assert_eq!(harness.row_count(FORM18.table, irn), 0);
}

#[test]
fn test_cpm_injury_approval_opens_form18() {
    let harness = TestHarness::new();
    let worker_id = register_worker(&harness);
    let irn = harness.add_claim(ClaimBuilder::new(105, worker_id, "Injury").at_stage(CPM_REVIEW, None));
    let workflow = harness.workflow();
    let cpm = harness.session(CLAIMS_MANAGER);

    workflow.open_review(ReviewStage::Cpm, irn, &cpm).unwrap();
    workflow
        .submit(ReviewStage::Cpm, irn, &cpm, &decided(Decision::Approved, None))
        .unwrap();

    assert_eq!(harness.status(FORM18, irn).as_deref(), Some("Pending"));
    assert_eq!(harness.row_count(FORM6.table, irn), 0);
}

#[test]
fn test_cpm_recheck_returns_claim_to_cpo() {
    let harness = TestHarness::new();
    let irn = harness.add_claim(
        ClaimBuilder::new(106, 1, "Injury")
            .at_stage(CPO_REVIEW, Some("Submitted"))
            .at_stage(CPM_REVIEW, None),
    );
    let workflow = harness.workflow();
    let cpm = harness.session(CLAIMS_MANAGER);

    workflow.open_review(ReviewStage::Cpm, irn, &cpm).unwrap();
    workflow
        .submit(
            ReviewStage::Cpm,
            irn,
            &cpm,
            &decided(Decision::ReCheck, Some("Weekly wage is wrong")),
        )
        .unwrap();

    assert_eq!(harness.status(CPM_REVIEW, irn).as_deref(), Some("Recheck"));
    assert_eq!(
        harness.status(CPO_REVIEW, irn).as_deref(),
        Some("CompensationReCalculate")
    );
}

#[test]
fn test_cpm_reject_only_touches_cpm_row() {
    let harness = TestHarness::new();
    let irn = harness.add_claim(
        ClaimBuilder::new(107, 1, "Injury")
            .at_stage(CPO_REVIEW, Some("Submitted"))
            .at_stage(CPM_REVIEW, None),
    );
    let workflow = harness.workflow();
    let cpm = harness.session(CLAIMS_MANAGER);

    workflow.open_review(ReviewStage::Cpm, irn, &cpm).unwrap();
    workflow
        .submit(ReviewStage::Cpm, irn, &cpm, &decided(Decision::Reject, Some("Duplicate")))
        .unwrap();

    assert_eq!(harness.status(CPM_REVIEW, irn).as_deref(), Some("Rejected"));
    assert_eq!(harness.status(CPO_REVIEW, irn).as_deref(), Some("Submitted"));
}

#[test]
fn test_missing_employer_rolls_back_cpm_decision() {
    let harness = TestHarness::new();
    // No worker row, so no current employment either.
    let irn = harness.add_claim(ClaimBuilder::new(108, 999, "Death").at_stage(CPM_REVIEW, None));
    let workflow = harness.workflow();
    let cpm = harness.session(CLAIMS_MANAGER);

    workflow.open_review(ReviewStage::Cpm, irn, &cpm).unwrap();
    let err = workflow
        .submit(ReviewStage::Cpm, irn, &cpm, &decided(Decision::Approved, None))
        .unwrap_err();

    assert!(matches!(
        err,
        ClaimdeskError::Workflow(WorkflowError::MissingEmployer { worker_id: 999 })
    ));
    assert_eq!(harness.status(CPM_REVIEW, irn), None);
    assert_eq!(harness.row_count(FORM6.table, irn), 0);
}

#[test]
fn test_history_attributes_cpm_decision() {
    let harness = TestHarness::new();
    let irn = harness.add_claim(
        ClaimBuilder::new(109, 1, "Injury")
            .at_stage(CPO_REVIEW, Some("Submitted"))
            .at_stage(CPM_REVIEW, None),
    );
    let workflow = harness.workflow();
    let reviewer = harness.session(COMMISSIONER);

    workflow.open_review(ReviewStage::Cpm, irn, &reviewer).unwrap();
    workflow
        .submit(ReviewStage::Cpm, irn, &reviewer, &decided(Decision::Reject, Some("Late")))
        .unwrap();

    let taken_by = |harness: &TestHarness| {
        harness
            .db
            .with_conn(|conn| history::claim_decisions(conn, irn))
            .unwrap()
            .into_iter()
            .find(|row| row.submission_type == "CPM Review")
            .map(|row| (row.taken_by, row.decision_date))
            .unwrap()
    };
    assert_eq!(
        taken_by(&harness),
        ("Tom Kaupa".to_string(), "03/06/2024".to_string())
    );

    // Once unlocked, the region's claims manager is credited.
    assert!(workflow.release_review(ReviewStage::Cpm, irn, &reviewer).unwrap());
    assert_eq!(taken_by(&harness).0, "Paul Mek");
}
