//! Fetch stage: instruction fetch, predecode, and branch prediction.
//!
//! Fetch reads up to `width` sequential words starting at the current PC.
//! Every word is predecoded (the decoder is pure and cheap) so the stage can
//! classify control flow; prediction itself uses only the predictor state at
//! this PC:
//! - unconditional direct branches are always taken, but their target is
//!   only known once the BTB has seen them — a BTB miss falls through and
//!   pays one flush at resolution;
//! - conditional branches take their direction from the BHT and their
//!   target from the BTB;
//! - indirect branches use the BTB alone, falling back to not-taken on a
//!   miss.
//!
//! Fetch stops at the first predicted-taken slot; its would-be shadow slots
//! are not fetched.

use crate::common::INSTRUCTION_SIZE;
use crate::core::Cpu;
use crate::core::pipeline::latches::{FetchDecode, FetchDecodeEntry};
use crate::core::units::bru::BranchUnit;
use crate::isa::{self, Format};

/// Runs fetch for one cycle, filling the IF/ID latch and advancing the
/// fetch PC (either sequentially or along the predicted path).
pub fn fetch_stage(cpu: &mut Cpu, bru: &BranchUnit, width: usize, output: &mut FetchDecode) {
    let mut pc = cpu.regs.pc;

    for _ in 0..width {
        let raw = cpu.mem.read_u32(pc);
        let inst = isa::decode(raw);

        let (pred_taken, pred_target) = match inst.format {
            Format::Branch | Format::BranchReg => match bru.predict_target(pc) {
                Some(target) => (true, target),
                None => (false, 0),
            },
            Format::BranchCond if bru.predict_conditional(pc) => match bru.predict_target(pc) {
                Some(target) => (true, target),
                None => (false, 0),
            },
            _ => (false, 0),
        };

        if cpu.trace {
            eprintln!(
                "IF  pc={pc:#x} raw={raw:#010x} pred_taken={pred_taken} pred_target={pred_target:#x}"
            );
        }

        output.entries.push(FetchDecodeEntry {
            pc,
            raw,
            pred_taken,
            pred_target,
        });

        if pred_taken {
            pc = pred_target;
            break;
        }
        pc = pc.wrapping_add(INSTRUCTION_SIZE);
    }

    cpu.regs.pc = pc;
}
