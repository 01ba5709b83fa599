use doctrine_core::model::audit::{AuditAction, AuditEntry, AuditLog};
use doctrine_core::{
    generate_report, neon_compliance, report_for, Category, ChangeSet, DoctrineCandidate,
    DoctrineRecord, DoctrineRegistry, DoctrineStatus, ManualClock, Phase, RegistryConfig,
    StructuredIdentifier,
};
use std::sync::Arc;

fn audited_log() -> AuditLog {
    AuditLog::from_entries(vec![AuditEntry::new(
        1,
        AuditAction::Create,
        "system",
        ChangeSet::new(),
        true,
    )])
    .unwrap()
}

fn record(
    identifier: StructuredIdentifier,
    category: Category,
    owner: &str,
    audit: AuditLog,
) -> DoctrineRecord {
    DoctrineRecord {
        identifier,
        title: "Imported".to_string(),
        description: String::new(),
        category,
        phase: Phase::Process,
        status: DoctrineStatus::Active,
        owner: owner.to_string(),
        created_at_ms: 1,
        updated_at_ms: 1,
        audit,
    }
}

#[test]
fn empty_registry_reports_zero_counts() {
    let registry = DoctrineRegistry::default();
    let report = generate_report(&registry, 0);

    assert_eq!(report.total_doctrines, 0);
    assert_eq!(report.neon_compliant, 0);
    assert_eq!(report.barton_compliant, 0);
    assert!(report.issues.is_empty());
    assert_eq!(doctrine_core::percent(report.neon_compliant, report.total_doctrines), 0.0);
}

#[test]
fn seeded_registry_is_fully_compliant() {
    let registry =
        DoctrineRegistry::new(RegistryConfig::seeded(), Arc::new(ManualClock::new(5))).unwrap();
    let report = generate_report(&registry, 3);

    assert_eq!(report.total_doctrines, 5);
    assert_eq!(report.neon_compliant, 5);
    assert_eq!(report.barton_compliant, 5);
    assert_eq!(report.stamped_compliant, 3);
    assert!(report.issues.is_empty());
}

#[test]
fn stamped_count_is_reported_as_given() {
    let mut registry = DoctrineRegistry::default();
    registry
        .create(DoctrineCandidate::new(
            "1.1.1.20.1",
            "Process",
            Category::Process,
            Phase::Frame,
            "system",
        ))
        .unwrap();

    assert_eq!(generate_report(&registry, 0).stamped_compliant, 0);
    assert_eq!(generate_report(&registry, 42).stamped_compliant, 42);
}

#[test]
fn noncompliant_records_produce_issue_strings() {
    let orphan = record(
        StructuredIdentifier::new(1, 1, 1, 20, 1),
        Category::Process,
        "system",
        AuditLog::new(),
    );
    let unowned = record(
        StructuredIdentifier::new(1, 1, 1, 21, 1),
        Category::Process,
        "",
        audited_log(),
    );
    let out_of_band = record(
        StructuredIdentifier::new(1, 1, 1, 60, 1),
        Category::Messaging,
        "system",
        audited_log(),
    );
    let healthy = record(
        StructuredIdentifier::new(2, 1, 1, 41, 1),
        Category::Messaging,
        "system",
        audited_log(),
    );

    let records = [orphan, unowned, out_of_band, healthy];
    let report = report_for(records.iter(), 0);

    assert_eq!(report.total_doctrines, 4);
    assert_eq!(report.neon_compliant, 1);
    assert_eq!(report.barton_compliant, 3);
    assert_eq!(
        report.issues,
        vec![
            "1.1.1.20.1: failed NEON compliance (no_orphan_data)".to_string(),
            "1.1.1.21.1: failed NEON compliance (explicit_ownership)".to_string(),
            "1.1.1.60.1: failed NEON compliance (nuclear_enforcement, operational_normalization)"
                .to_string(),
            "1.1.1.60.1: invalid Barton number".to_string(),
        ]
    );
}

#[test]
fn neon_counts_always_sum_to_total() {
    let records: Vec<DoctrineRecord> = (0..20_u64)
        .map(|n| {
            let owner = if n % 3 == 0 { "" } else { "owner" };
            let audit = if n % 4 == 0 { AuditLog::new() } else { audited_log() };
            let nested = n * 3;
            let category = doctrine_core::try_category_of(nested).unwrap_or(Category::Tone);
            record(StructuredIdentifier::new(1, n, 0, nested, n), category, owner, audit)
        })
        .collect();

    let report = report_for(&records, 0);
    let noncompliant = records
        .iter()
        .filter(|record| !neon_compliance(record).is_compliant())
        .count();
    assert_eq!(report.neon_compliant + noncompliant, report.total_doctrines);
}

#[test]
fn mismatched_category_fails_normalization_only() {
    let mismatched = record(
        StructuredIdentifier::new(1, 1, 1, 5, 1),
        Category::Process,
        "system",
        audited_log(),
    );
    let neon = neon_compliance(&mismatched);

    assert!(neon.nuclear_enforcement);
    assert!(neon.explicit_ownership);
    assert!(!neon.operational_normalization);
    assert!(neon.no_orphan_data);
    assert_eq!(neon.failed_checks(), vec!["operational_normalization"]);
}
