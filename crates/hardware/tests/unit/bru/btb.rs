//! Branch Target Buffer tests.

use a64sim_core::core::units::bru::btb::Btb;
use a64sim_core::core::units::bru::mispredicted;

#[test]
fn empty_btb_misses() {
    let btb = Btb::new(64);
    assert_eq!(btb.lookup(0x1000), None);
}

#[test]
fn update_then_lookup_hits() {
    let mut btb = Btb::new(64);
    btb.update(0x1000, 0x2000);
    assert_eq!(btb.lookup(0x1000), Some(0x2000));
}

#[test]
fn tag_mismatch_misses() {
    let mut btb = Btb::new(64);
    btb.update(0x1000, 0x2000);
    // Same index (64 entries x 4 bytes = 0x100 stride), different tag.
    assert_eq!(btb.lookup(0x1000 + 0x100), None);
}

#[test]
fn colliding_update_overwrites() {
    let mut btb = Btb::new(64);
    btb.update(0x1000, 0x2000);
    btb.update(0x1000 + 0x100, 0x3000);
    assert_eq!(btb.lookup(0x1000), None, "old entry evicted");
    assert_eq!(btb.lookup(0x1000 + 0x100), Some(0x3000));
}

#[test]
fn retargeting_a_branch_updates_in_place() {
    let mut btb = Btb::new(64);
    btb.update(0x1000, 0x2000);
    btb.update(0x1000, 0x4000);
    assert_eq!(btb.lookup(0x1000), Some(0x4000));
}

// ──────────────────────────────────────────────────────────
// Misprediction check
// ──────────────────────────────────────────────────────────

#[test]
fn direction_mismatch_is_a_misprediction() {
    assert!(mispredicted(false, 0, true, 0x2000));
    assert!(mispredicted(true, 0x2000, false, 0x1004));
}

#[test]
fn target_mismatch_on_taken_is_a_misprediction() {
    assert!(mispredicted(true, 0x2000, true, 0x3000));
}

#[test]
fn agreeing_prediction_is_correct() {
    assert!(!mispredicted(true, 0x2000, true, 0x2000));
    // Both not-taken: the predicted target is irrelevant.
    assert!(!mispredicted(false, 0xDEAD, false, 0x1004));
}
