//! Superscalar width tests.
//!
//! Wide configurations must stay architecturally identical to single-issue
//! and only change the timing: independent work speeds up, dependent chains
//! are serialized by the issue stage.

use a64sim_core::common::SimError;
use a64sim_core::config::Config;
use a64sim_core::Simulator;
use rstest::rstest;

use crate::common::builder::*;
use crate::common::harness::TestContext;

/// Eight independent adds followed by an exit.
fn independent_adds() -> Vec<u32> {
    let mut program: Vec<u32> = (0..8).map(|i| mov_imm(i, 10 * (i + 1))).collect();
    program.push(mov_imm(8, 93));
    program.push(svc(0));
    program
}

#[test]
fn eight_wide_executes_independent_adds_faster() {
    let mut wide = TestContext::with_width(8).load_program(&independent_adds());
    let wide_result = wide.run();

    let mut narrow = TestContext::with_width(1).load_program(&independent_adds());
    let narrow_result = narrow.run();

    // Same architecture...
    for i in 0..8 {
        assert_eq!(wide.get_reg(i), narrow.get_reg(i));
    }
    assert_eq!(wide_result.exit_code, narrow_result.exit_code);
    // ...less time.
    assert!(
        wide_result.stats.cycles < narrow_result.stats.cycles,
        "8-wide ({}) should beat single-issue ({})",
        wide_result.stats.cycles,
        narrow_result.stats.cycles
    );
}

#[test]
fn wide_issue_serializes_dependent_chain() {
    // x0 = 10; x0 += 1 three times; exit(x0) = 13.
    let mut ctx = TestContext::with_width(8).load_program(&[
        mov_imm(0, 10),
        add_imm(0, 0, 1, false, false),
        add_imm(0, 0, 1, false, false),
        add_imm(0, 0, 1, false, false),
        mov_imm(8, 93),
        svc(0),
    ]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 13);
    assert!(
        result.stats.data_hazards > 0,
        "intra-bundle dependencies must stall, not forward nothing"
    );
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(4)]
#[case(6)]
#[case(8)]
fn every_width_reaches_the_same_exit(#[case] width: usize) {
    let mut ctx = TestContext::with_width(width).load_program(&[
        mov_imm(0, 10),
        mov_imm(1, 5),
        add_reg(0, 0, 1, false),
        mov_imm(8, 93),
        svc(0),
    ]);
    let result = ctx.run();
    assert_eq!(result.exit_code, 15, "width {width}");
    assert_eq!(result.stats.instructions_retired, 5);
}

#[rstest]
#[case(0)]
#[case(5)]
#[case(7)]
#[case(16)]
fn unsupported_widths_are_rejected(#[case] width: usize) {
    let mut config = Config::default();
    config.pipeline.width = width;
    let err = Simulator::new(&config).unwrap_err();
    assert_eq!(err, SimError::InvalidIssueWidth(width));
}

#[test]
fn retirement_never_exceeds_width_per_cycle() {
    let mut ctx = TestContext::with_width(4).load_program(&independent_adds());
    let result = ctx.run();
    assert!(result.stats.instructions_retired <= result.stats.cycles * 4);
}

#[test]
fn memory_port_is_shared_across_slots() {
    // Two independent loads in one bundle contend for the single port.
    let mut ctx = TestContext::with_width(4);
    ctx.sim.cpu.mem.write_u64(0x2000, 1);
    ctx.sim.cpu.mem.write_u64(0x2008, 2);
    ctx.load_program_at(
        0x1000,
        &[
            movz(1, 0x2000, 0),
            ldr64(2, 1, 0),
            ldr64(3, 1, 8),
            add_reg(0, 2, 3, false),
            mov_imm(8, 93),
            svc(0),
        ],
    );
    let result = ctx.run();

    assert_eq!(result.exit_code, 3);
    assert!(result.stats.mem_stalls > 0, "second load must wait for the port");
}
