//! Issue stage: operand resolution, hazard stalls, and structural checks.
//!
//! Issue reads source operands through the forwarding network and moves
//! ready slots into the IX/EX latch. A slot that cannot proceed blocks
//! itself and every younger slot (issue is strictly in-order):
//! 1. **RAW hazard:** a needed operand is still in flight — bubble, counted
//!    in `data_hazards` and `exec_stalls`.
//! 2. **Memory port:** the core models a single load/store port per cycle —
//!    a second memory operation waits, counted in `mem_stalls`.
//! 3. **Syscall serialization:** `SVC` reads the architectural registers
//!    directly at execute, so it issues only once every older instruction
//!    has retired.

use crate::core::Cpu;
use crate::core::latency::LatencyTable;
use crate::core::pipeline::hazards::{
    ForwardView, Operand, pending_writes_base, pending_writes_reg,
};
use crate::core::pipeline::latches::{
    DecodeIssue, DecodeIssueEntry, ExecuteMem, IssueExecute, IssueExecuteEntry, MemWb,
};
use crate::isa::{Format, Opcode};

/// Runs issue for one cycle.
///
/// Consumes a prefix of the ID/IX latch; slots that could not issue stay in
/// place for the next cycle.
#[allow(clippy::too_many_arguments)]
pub fn issue_stage(
    cpu: &mut Cpu,
    input: &mut DecodeIssue,
    output: &mut IssueExecute,
    ex_busy: &[IssueExecuteEntry],
    ex_mem: &ExecuteMem,
    mem_wb: &MemWb,
    table: &LatencyTable,
) {
    let mut issued: Vec<IssueExecuteEntry> = Vec::new();
    let mut mem_ops = 0usize;

    for entry in &input.entries {
        // SVC consumes the architectural register state at execute, so the
        // whole backend must drain first.
        if entry.ctrl.syscall {
            let backend_empty = ex_busy.is_empty()
                && ex_mem.entries.is_empty()
                && mem_wb.entries.is_empty()
                && issued.is_empty();
            if !backend_empty {
                cpu.stats.exec_stalls += 1;
                break;
            }
            issued.push(build_entry(entry, 0, 0, 0, 0, table));
            break;
        }

        if entry.inst.is_mem() && mem_ops >= 1 {
            cpu.stats.mem_stalls += 1;
            break;
        }

        let view = ForwardView {
            ex_busy,
            ex_mem: &ex_mem.entries,
            mem_wb: &mem_wb.entries,
            regs: &cpu.regs,
        };
        let Some((a, b, store_val, store_val2)) = read_operands(entry, &view, &issued) else {
            cpu.stats.data_hazards += 1;
            cpu.stats.exec_stalls += 1;
            break;
        };

        if cpu.trace {
            eprintln!(
                "IX  pc={:#x} op={:?} a={a:#x} b={b:#x}",
                entry.pc, entry.inst.op
            );
        }

        if entry.inst.is_mem() {
            mem_ops += 1;
        }
        issued.push(build_entry(entry, a, b, store_val, store_val2, table));
    }

    let count = issued.len();
    drop(input.entries.drain(..count));
    output.entries = issued;
}

/// Builds the IX/EX entry for one issued slot.
fn build_entry(
    entry: &DecodeIssueEntry,
    a: u64,
    b: u64,
    store_val: u64,
    store_val2: u64,
    table: &LatencyTable,
) -> IssueExecuteEntry {
    let latency = table.lookup(&entry.inst);
    IssueExecuteEntry {
        pc: entry.pc,
        inst: entry.inst,
        ctrl: entry.ctrl,
        a,
        b,
        store_val,
        store_val2,
        pred_taken: entry.pred_taken,
        pred_target: entry.pred_target,
        exec_cycles: latency.exec,
        mem_cycles: latency.mem,
    }
}

/// Reads every source operand a slot needs, or `None` if any is stalled.
fn read_operands(
    entry: &DecodeIssueEntry,
    view: &ForwardView<'_>,
    same_cycle: &[IssueExecuteEntry],
) -> Option<(u64, u64, u64, u64)> {
    let inst = &entry.inst;

    // Same-cycle older slots cannot forward: their results do not exist yet.
    let resolve = |reg: usize| -> Operand {
        if same_cycle.iter().any(|e| pending_writes_reg(e, reg)) {
            return Operand::Stall;
        }
        view.resolve_operand(reg)
    };
    let resolve_base = |reg: usize| -> Operand {
        if same_cycle.iter().any(|e| pending_writes_base(e, reg)) {
            return Operand::Stall;
        }
        view.resolve_base(reg)
    };

    let mut a = 0u64;
    let mut b = 0u64;
    let mut store_val = 0u64;
    let mut store_val2 = 0u64;

    match inst.format {
        Format::DpImm | Format::LogicalImm => {
            if matches!(inst.op, Opcode::Add | Opcode::Sub | Opcode::And | Opcode::Orr | Opcode::Eor)
            {
                a = resolve(inst.rn).value()?;
            }
        }
        Format::DpReg => {
            a = resolve(inst.rn).value()?;
            b = resolve(inst.rm).value()?;
        }
        Format::LoadStore => {
            a = resolve_base(inst.rn).value()?;
            if inst.is_store() {
                store_val = resolve(inst.rd).value()?;
                if inst.is_pair() {
                    store_val2 = resolve(inst.rt2).value()?;
                }
            }
        }
        Format::BranchReg => {
            a = resolve(inst.rn).value()?;
        }
        Format::Branch | Format::BranchCond | Format::System => {}
    }

    Some((a, b, store_val, store_val2))
}
