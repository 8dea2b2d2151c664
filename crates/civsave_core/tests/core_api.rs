mod common;

use civsave_core::core_api::{CapabilityIssue, CoreErrorCode, Engine};
use civsave_core::{ParseOptions, PlayerStatus, SaveError, Variant};

use common::SaveBuilder;

#[test]
fn engine_opens_without_hint() {
    let bytes = SaveBuilder::new(Variant::BeyondEarth).build();
    let session = Engine::new()
        .open_bytes(&bytes, None)
        .expect("failed to open save");

    assert_eq!(session.variant(), Variant::BeyondEarth);
    assert_eq!(session.snapshot().turn, common::TURN);
    assert_eq!(session.snapshot().players.len(), 3);
    assert!(session.snapshot().players[1].is_active);
    assert!(!session.snapshot().players[0].is_active);

    let caps = session.capabilities();
    assert!(caps.can_query);
    assert!(caps.can_apply_edits);
    assert!(caps.issues.is_empty());
}

#[test]
fn engine_rejects_wrong_variant_hint() {
    let bytes = SaveBuilder::new(Variant::Civ5).build();
    let err = Engine::new()
        .open_bytes(&bytes, Some(Variant::BeyondEarth))
        .expect_err("hint should not match");

    assert_eq!(err.code, CoreErrorCode::VariantMismatch);
    assert!(err.message.contains("BeyondEarth"), "{}", err.message);
}

#[test]
fn engine_accepts_matching_hint() {
    let bytes = SaveBuilder::new(Variant::Civ5).build();
    let session = Engine::new()
        .open_bytes(&bytes, Some(Variant::Civ5))
        .expect("matching hint should open");
    assert_eq!(session.variant(), Variant::Civ5);
}

#[test]
fn engine_reports_parse_errors() {
    let err = Engine::new()
        .open_bytes(b"CIV5 not a save", None)
        .expect_err("should fail");
    assert_eq!(err.code, CoreErrorCode::Parse);
    assert_eq!(err.source, Some(SaveError::TruncatedFile));
    assert!(err.to_string().starts_with("Parse: "));
}

#[test]
fn drifted_layout_is_flagged() {
    let bytes = SaveBuilder::new(Variant::Civ5).drifted(true).build();
    let session = Engine::new().open_bytes(&bytes, None).unwrap();
    assert_eq!(
        session.capabilities().issues,
        vec![CapabilityIssue::LowConfidenceLayout]
    );
}

#[test]
fn filtered_active_player_is_flagged() {
    let bytes = SaveBuilder::new(Variant::Civ5)
        .with_active_player(4)
        .build();
    let session = Engine::new().open_bytes(&bytes, None).unwrap();
    assert_eq!(
        session.capabilities().issues,
        vec![CapabilityIssue::ActivePlayerNotListed]
    );
}

#[test]
fn engine_options_control_status_validation() {
    let bytes = SaveBuilder::new(Variant::Civ5)
        .with_mirror_statuses(vec![1, 1, 1, 1, 1, 1])
        .build();

    let err = Engine::new().open_bytes(&bytes, None).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::Parse);

    let session = Engine::with_options(ParseOptions::unvalidated())
        .open_bytes(&bytes, None)
        .expect("unvalidated engine should open");
    assert_eq!(session.record().players.len(), 3);
}

#[test]
fn session_edits_are_reparsed() {
    let bytes = SaveBuilder::new(Variant::Civ5).drifted(true).build();
    let mut session = Engine::new().open_bytes(&bytes, None).unwrap();
    assert!(!session.is_modified());

    session.set_player_display_name(1, "Zoë").unwrap();
    session.set_player_password(1, "letmein").unwrap();
    session.set_player_status(2, PlayerStatus::Human).unwrap();
    session.set_active_player(0).unwrap();

    assert!(session.is_modified());
    let bob = session.record().player_by_slot(1).unwrap();
    assert_eq!(bob.display_name, "Zoe");
    assert_eq!(bob.password.as_deref(), Some("letmein"));
    assert_eq!(session.snapshot().players[2].status, Some(PlayerStatus::Human));
    assert!(session.snapshot().players[0].is_active);

    assert_eq!(session.to_bytes_unmodified(), bytes);
    let modified = session.to_bytes_modified();
    assert_ne!(modified, bytes);
    assert_eq!(civsave_core::parse(&modified).unwrap(), *session.record());
}

#[test]
fn failed_session_edit_leaves_state_unchanged() {
    let bytes = SaveBuilder::new(Variant::Civ5).build();
    let mut session = Engine::new().open_bytes(&bytes, None).unwrap();

    let err = session.set_active_player(42).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidEdit);
    assert_eq!(
        err.source,
        Some(SaveError::PositionNotFound {
            ordinal: 7,
            position: 42
        })
    );
    assert!(!session.is_modified());
    assert_eq!(session.record().active_player_index, Some(1));
}
