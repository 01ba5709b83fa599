use doctrine_core::{
    Category, DoctrineCandidate, DoctrinePatch, DoctrineRegistry, DoctrineStatus, ManualClock,
    Phase, RegistryConfig, RegistryService,
};
use std::sync::Arc;
use std::thread;

#[test]
fn parallel_creates_with_distinct_identifiers_all_land() {
    let service = Arc::new(RegistryService::default());
    let handles: Vec<_> = (0..10_u64)
        .map(|worker| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for index in 0..20_u64 {
                    service
                        .create(DoctrineCandidate::new(
                            format!("1.{worker}.0.30.{index}"),
                            "Rule",
                            Category::Compliance,
                            Phase::Process,
                            "owner",
                        ))
                        .expect("distinct identifiers should never collide");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker should not panic");
    }

    assert_eq!(service.len(), 200);
    let report = service.generate_report(0);
    assert_eq!(report.total_doctrines, 200);
    assert_eq!(report.neon_compliant, 200);
}

#[test]
fn reads_return_copies_detached_from_later_mutation() {
    let registry =
        DoctrineRegistry::new(RegistryConfig::seeded(), Arc::new(ManualClock::new(10))).unwrap();
    let service = RegistryService::new(registry);

    let before = service.get("1.1.1.10.1").expect("seeded record");
    service
        .update(
            "1.1.1.10.1",
            DoctrinePatch {
                status: Some(DoctrineStatus::Deprecated),
                ..DoctrinePatch::default()
            },
            None,
        )
        .unwrap();

    assert_eq!(before.status, DoctrineStatus::Active);
    assert_eq!(
        service.get("1.1.1.10.1").unwrap().status,
        DoctrineStatus::Deprecated
    );
    assert_eq!(service.list_by_category(Category::Structure).len(), 1);
    assert_eq!(service.list_by_phase(Phase::Process).len(), 2);
    assert_eq!(service.snapshot().len(), 5);
    assert!(service.validate("1.1.1.10.1", None).unwrap().is_compliant());
}
