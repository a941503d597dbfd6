//! End-to-end pipeline scenarios.
//!
//! Small hand-assembled programs run to completion on the detailed
//! pipeline; exit codes, retirement counts, and flush behaviour are checked
//! against the architectural expectations.

use a64sim_core::isa::Cond;
use pretty_assertions::assert_eq;

use crate::common::builder::*;
use crate::common::harness::TestContext;

// ══════════════════════════════════════════════════════════
// 1. Straight-line programs
// ══════════════════════════════════════════════════════════

#[test]
fn simple_exit() {
    // mov x8, #93 ; mov x0, #42 ; svc #0
    let mut ctx = TestContext::new().load_program(&[mov_imm(8, 93), mov_imm(0, 42), svc(0)]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 42);
    assert_eq!(result.stats.instructions_retired, 3);
    assert!(result.stats.cycles >= result.stats.instructions_retired);
    assert!(result.stats.cpi() > 0.0);
}

#[test]
fn arithmetic_through_forwarding() {
    // mov x0, #10 ; mov x1, #5 ; add x0, x0, x1 ; mov x8, #93 ; svc #0
    let mut ctx = TestContext::new().load_program(&[
        mov_imm(0, 10),
        mov_imm(1, 5),
        add_reg(0, 0, 1, false),
        mov_imm(8, 93),
        svc(0),
    ]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 15);
    assert_eq!(result.stats.instructions_retired, 5);
}

#[test]
fn logical_ops_mask_exit_code() {
    // mov x0, #0xFF ; mov x1, #0x0F ; and x0, x0, x1 ; mov x8, #93 ; svc #0
    let mut ctx = TestContext::new().load_program(&[
        mov_imm(0, 0xFF),
        mov_imm(1, 0x0F),
        and_reg(0, 0, 1),
        mov_imm(8, 93),
        svc(0),
    ]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 0x0F);
    assert_eq!(result.stats.instructions_retired, 5);
}

#[test]
fn shifted_immediate_builds_large_values() {
    // mov x0, #3, lsl #12 -> 0x3000 ; exit(x0 != 0x3000 ? ... ) keep simple:
    // move into x0 and compare via exit code truncation is lossy, so park
    // the value in x1 and exit with a flag-derived code instead.
    let mut ctx = TestContext::new().load_program(&[
        add_imm(1, 31, 3, false, true), // x1 = 0x3000
        mov_imm(8, 93),
        add_imm(0, 1, 0, false, false), // x0 = x1
        svc(0),
    ]);
    let result = ctx.run();
    // exit codes are architecturally 64-bit here; the full value survives.
    assert_eq!(result.exit_code, 0x3000);
}

// ══════════════════════════════════════════════════════════
// 2. Branches and flushes
// ══════════════════════════════════════════════════════════

#[test]
fn countdown_loop_flushes_on_mispredictions() {
    // mov x0, #3
    // loop: subs x0, x0, #1 ; b.ne loop
    // mov x8, #93 ; svc #0
    let mut ctx = TestContext::new().load_program(&[
        mov_imm(0, 3),
        sub_imm(0, 0, 1, true),
        b_cond(-4, Cond::Ne),
        mov_imm(8, 93),
        svc(0),
    ]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 0);
    // mov + 3*(subs + b.ne) + mov + svc
    assert_eq!(result.stats.instructions_retired, 9);
    assert!(result.stats.flushes >= 1, "taken-branch training costs at least one flush");
    assert!(result.stats.cpi() > 1.0);
    assert!(result.stats.branch_predictions >= 3);
}

#[test]
fn function_call_and_return() {
    // mov x0, #5 ; bl func ; mov x8, #93 ; svc #0
    // func: add x0, x0, #10 ; ret
    let mut ctx = TestContext::new().load_program(&[
        mov_imm(0, 5),
        bl(12), // 0x1004 -> 0x1010
        mov_imm(8, 93),
        svc(0),
        add_imm(0, 0, 10, false, false),
        ret(),
    ]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 15);
    assert_eq!(result.stats.instructions_retired, 6);
    assert!(
        result.stats.flushes >= 2,
        "first-sight BL and RET both redirect at execute"
    );
}

#[test]
fn unconditional_branch_skips_code() {
    // b +12 ; (skipped: mov x0, #99) ; (skipped: pad) ; mov x8, #93 ; svc
    let mut ctx = TestContext::new().load_program(&[
        mov_imm(0, 7),
        b(12), // 0x1004 -> 0x1010
        mov_imm(0, 99),
        mov_imm(0, 98),
        mov_imm(8, 93),
        svc(0),
    ]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 7, "skipped writes must not retire");
    assert_eq!(result.stats.instructions_retired, 4);
}

#[test]
fn indirect_branch_through_register() {
    // movz x9, #0x1010 ; br x9 ; (skipped) ; target: mov x0,#13 ; exit
    let mut ctx = TestContext::new().load_program(&[
        movz(9, 0x1010, 0),
        br(9), // 0x1004 -> 0x1010
        mov_imm(0, 99),
        mov_imm(0, 98),
        mov_imm(0, 13),
        mov_imm(8, 93),
        svc(0),
    ]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 13);
    assert!(result.stats.flushes >= 1, "BTB-cold indirect branch flushes");
}

#[test]
fn conditional_branch_not_taken_falls_through() {
    // mov x0, #1 ; subs x0, x0, #1 ; b.ne +8 (not taken) ; mov x0, #5 ; exit
    let mut ctx = TestContext::new().load_program(&[
        mov_imm(0, 1),
        sub_imm(0, 0, 1, true),
        b_cond(8, Cond::Ne),
        mov_imm(0, 5),
        mov_imm(8, 93),
        svc(0),
    ]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 5);
    assert_eq!(result.stats.instructions_retired, 6);
    assert_eq!(result.stats.flushes, 0, "correctly predicted fall-through");
}

// ══════════════════════════════════════════════════════════
// 3. Memory traffic
// ══════════════════════════════════════════════════════════

#[test]
fn load_latency_shows_up_in_cpi() {
    // x1 = 0x2000 ; ldr x0, [x1] ; mov x8, #93 ; svc #0
    let mut ctx = TestContext::new();
    ctx.sim.cpu.mem.write_u64(0x2000, 99);
    ctx.load_program_at(0x1000, &[movz(1, 0x2000, 0), ldr64(0, 1, 0), mov_imm(8, 93), svc(0)]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 99);
    assert_eq!(result.stats.instructions_retired, 4);
    assert!(result.stats.cpi() > 1.0, "load latency must cost cycles");
}

#[test]
fn store_then_load_roundtrip() {
    // x1 = 0x3000 ; x0 = 77 ; str x0, [x1] ; ldr x2, [x1] ; exit(x2)
    let mut ctx = TestContext::new().load_program(&[
        movz(1, 0x3000, 0),
        mov_imm(0, 77),
        str64(0, 1, 0),
        ldr64(2, 1, 0),
        add_imm(0, 2, 0, false, false),
        mov_imm(8, 93),
        svc(0),
    ]);
    let result = ctx.run();
    assert_eq!(result.exit_code, 77);
}

#[test]
fn pair_store_and_load() {
    // x1 = 0x4000 ; x2 = 11 ; x3 = 22 ; stp x2, x3, [x1] ;
    // ldp x4, x5, [x1] ; exit(x4 + x5)
    let mut ctx = TestContext::new().load_program(&[
        movz(1, 0x4000, 0),
        mov_imm(2, 11),
        mov_imm(3, 22),
        stp64(2, 3, 1, 0),
        ldp64(4, 5, 1, 0),
        add_reg(0, 4, 5, false),
        mov_imm(8, 93),
        svc(0),
    ]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 33);
    assert_eq!(ctx.sim.cpu.mem.read_u64(0x4000), 11);
    assert_eq!(ctx.sim.cpu.mem.read_u64(0x4008), 22);
}

#[test]
fn pre_index_store_updates_base() {
    // sp starts at 0x7FFF_0000 ; stp x2, x3, [sp, #-16]! ; copy sp out via
    // a post-index load and exit with the loaded value.
    let mut ctx = TestContext::new().load_program(&[
        mov_imm(2, 41),
        mov_imm(3, 43),
        stp64_pre(2, 3, 31, -16),
        ldr64_post(0, 31, 16),
        mov_imm(8, 93),
        svc(0),
    ]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 41, "load sees the pushed value");
    assert_eq!(ctx.sim.cpu.regs.sp, 0x7FFF_0000, "push then pop restores SP");
    assert_eq!(ctx.sim.cpu.mem.read_u64(0x7FFE_FFF0), 41);
    assert_eq!(ctx.sim.cpu.mem.read_u64(0x7FFE_FFF8), 43);
}

// ══════════════════════════════════════════════════════════
// 4. Syscall-driven I/O
// ══════════════════════════════════════════════════════════

#[test]
fn write_syscall_reaches_stdout() {
    // "Hello\n" pre-stored at 0x3000; write(1, 0x3000, 6); exit(0)
    let mut ctx = TestContext::new();
    ctx.sim.cpu.mem.write_bytes(0x3000, b"Hello\n");
    ctx.load_program_at(
        0x1000,
        &[
            mov_imm(0, 1),
            movz(1, 0x3000, 0),
            mov_imm(2, 6),
            mov_imm(8, 64),
            svc(0),
            mov_imm(0, 0),
            mov_imm(8, 93),
            svc(0),
        ],
    );
    let result = ctx.run();

    assert_eq!(result.exit_code, 0);
    assert_eq!(ctx.stdout.as_string(), "Hello\n");
}

#[test]
fn read_syscall_fills_memory() {
    use std::io::Cursor;
    // read(0, 0x5000, 5) then exit(bytes_read)
    let mut ctx = TestContext::new()
        .with_stdin(Cursor::new(b"abcde".to_vec()))
        .load_program(&[
            mov_imm(0, 0),
            movz(1, 0x5000, 0),
            mov_imm(2, 5),
            mov_imm(8, 63),
            svc(0),
            mov_imm(8, 93),
            svc(0),
        ]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 5, "read count becomes the exit code");
    assert_eq!(ctx.sim.cpu.mem.read_bytes(0x5000, 5), b"abcde");
}

#[test]
fn adrp_forms_page_addresses() {
    // adrp x0, #+1 page from 0x1000 -> 0x2000 ; exit(x0)
    let mut ctx = TestContext::new().load_program(&[adrp(0, 1), mov_imm(8, 93), svc(0)]);
    let result = ctx.run();
    assert_eq!(result.exit_code, 0x2000);
}

#[test]
fn program_image_seeds_pc_sp_and_segments() {
    use a64sim_core::sim::{ProgramImage, Segment};

    let text: Vec<u8> = [ldr64(0, 31, 0), mov_imm(8, 93), svc(0)]
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .collect();
    let mut data = vec![0u8; 8];
    data.copy_from_slice(&21u64.to_le_bytes());

    let image = ProgramImage {
        entry: 0x1000,
        initial_sp: 0x9000,
        segments: vec![
            Segment {
                base: 0x1000,
                data: text,
                mem_size: 0x100,
            },
            Segment {
                base: 0x9000,
                data,
                mem_size: 0x40, // tail is BSS and reads zero
            },
        ],
    };

    let mut ctx = TestContext::new();
    ctx.sim.load_image(&image);
    let result = ctx.run();

    assert_eq!(result.exit_code, 21, "ldr from [sp] sees the data segment");
    assert_eq!(ctx.sim.cpu.mem.read_u64(0x9008), 0, "BSS tail is zero");
}

// ══════════════════════════════════════════════════════════
// 5. Abnormal termination
// ══════════════════════════════════════════════════════════

#[test]
fn illegal_instruction_halts_with_minus_one() {
    let mut ctx = TestContext::new().load_program(&[mov_imm(0, 1), 0xFFFF_FFFF]);
    let result = ctx.run();
    assert_eq!(result.exit_code, -1);
}

#[test]
fn instruction_limit_halts_cleanly() {
    use a64sim_core::config::Config;
    let mut config = Config::default();
    config.general.max_instructions = 5;

    // Infinite countdown never reaches the exit path.
    let mut ctx = TestContext::with_config(&config).load_program(&[
        mov_imm(0, 1),
        add_imm(0, 0, 1, false, false),
        b(-4),
    ]);
    let result = ctx.run();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stats.instructions_retired, 5);
}
