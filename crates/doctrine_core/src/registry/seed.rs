//! Starter doctrines inserted by `DoctrineRegistry::seed_defaults`.

use crate::model::doctrine::{DoctrineCandidate, DoctrineStatus, Phase};
use crate::model::identifier::Category;

/// One starter doctrine per category band.
pub fn starter_doctrines() -> Vec<DoctrineCandidate> {
    vec![
        DoctrineCandidate::new(
            "1.1.1.0.1",
            "Voice and tone baseline",
            Category::Tone,
            Phase::Frame,
            "system",
        )
        .with_description("Plain, direct language in every outward-facing artifact.")
        .with_status(DoctrineStatus::Active),
        DoctrineCandidate::new(
            "1.1.1.10.1",
            "Blueprint section layout",
            Category::Structure,
            Phase::Blueprint,
            "system",
        )
        .with_description("Every blueprint carries frame, blueprint, and process sections.")
        .with_status(DoctrineStatus::Active),
        DoctrineCandidate::new(
            "1.1.1.20.1",
            "Process hand-off checkpoints",
            Category::Process,
            Phase::Process,
            "system",
        )
        .with_description("Each process step names its owner and exit criteria.")
        .with_status(DoctrineStatus::Active),
        DoctrineCandidate::new(
            "2.1.1.30.1",
            "Identifier governance",
            Category::Compliance,
            Phase::Frame,
            "system",
        )
        .with_description("Every governed rule carries a valid five-part identifier.")
        .with_status(DoctrineStatus::Active),
        DoctrineCandidate::new(
            "2.1.1.40.1",
            "Release messaging",
            Category::Messaging,
            Phase::Process,
            "system",
        )
        .with_description("Status changes are announced with the doctrine identifier.")
        .with_status(DoctrineStatus::Draft),
    ]
}
