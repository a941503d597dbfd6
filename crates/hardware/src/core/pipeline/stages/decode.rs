//! Decode stage.
//!
//! Decode is a thin stage: the pure decoder turns each fetched word into an
//! [`Instruction`](crate::isa::Instruction) record and derives the control
//! signals the rest of the pipeline acts on.

use crate::core::Cpu;
use crate::core::pipeline::latches::{DecodeIssue, DecodeIssueEntry, FetchDecode};
use crate::core::pipeline::signals::ControlSignals;
use crate::isa;

/// Decodes every slot of the IF/ID latch into the ID/IX latch.
pub fn decode_stage(cpu: &Cpu, input: &mut FetchDecode, output: &mut DecodeIssue) {
    for fetched in input.entries.drain(..) {
        let inst = isa::decode(fetched.raw);
        let ctrl = ControlSignals::derive(&inst);

        if cpu.trace {
            eprintln!("ID  pc={:#x} op={:?} fmt={:?}", fetched.pc, inst.op, inst.format);
        }

        output.entries.push(DecodeIssueEntry {
            pc: fetched.pc,
            raw: fetched.raw,
            inst,
            ctrl,
            pred_taken: fetched.pred_taken,
            pred_target: fetched.pred_target,
        });
    }
}
