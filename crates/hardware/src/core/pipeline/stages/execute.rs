//! Execute stage: ALU evaluation, branch resolution, and syscalls.
//!
//! Execute consumes one issued bundle in slot order. It:
//! 1. Computes ALU results and effective addresses via the shared units.
//! 2. Commits PSTATE updates in slot order; because only younger, unexecuted
//!    slots are ever flushed, flags never need rollback.
//! 3. Resolves branches against their fetch-time prediction, trains the
//!    predictor, and reports mispredictions; slots younger than a
//!    mispredicted branch in the same bundle are squashed here.
//! 4. Writes the link register for BL/BLR and invokes the syscall handler
//!    for SVC, capturing any exit decision in the latch.

use crate::common::{INSTRUCTION_SIZE, REG_LR};
use crate::core::Cpu;
use crate::core::pipeline::latches::{BaseWriteback, ExecuteMem, ExecuteMemEntry, IssueExecuteEntry};
use crate::core::units::bru::{BranchUnit, mispredicted};
use crate::core::units::{alu, lsu};
use crate::isa::{Format, Opcode};
use crate::syscall::SyscallHandler;

/// What the controller must do after this bundle executed.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExecOutcome {
    /// Redirect the fetch PC here and flush the front of the pipeline.
    pub redirect: Option<u64>,
    /// Same-bundle slots squashed behind a mispredicted branch.
    pub squashed_slots: usize,
}

/// Executes one bundle into the EX/MEM latch.
pub fn execute_bundle(
    cpu: &mut Cpu,
    bru: &mut BranchUnit,
    syscalls: &mut dyn SyscallHandler,
    bundle: Vec<IssueExecuteEntry>,
    output: &mut ExecuteMem,
) -> ExecOutcome {
    let mut outcome = ExecOutcome::default();
    let total = bundle.len();

    for (slot, entry) in bundle.into_iter().enumerate() {
        let mut out = ExecuteMemEntry {
            pc: entry.pc,
            inst: entry.inst,
            ctrl: entry.ctrl,
            mem_cycles: entry.mem_cycles,
            store_val: entry.store_val,
            store_val2: entry.store_val2,
            ..ExecuteMemEntry::default()
        };
        let inst = &entry.inst;

        match inst.op {
            Opcode::Add | Opcode::Sub => {
                let op2 = second_operand(&entry);
                let result = match (inst.op, inst.is_64bit) {
                    (Opcode::Add, true) => alu::add64(entry.a, op2),
                    (Opcode::Add, false) => alu::add32(entry.a as u32, op2 as u32),
                    (_, true) => alu::sub64(entry.a, op2),
                    (_, false) => alu::sub32(entry.a as u32, op2 as u32),
                };
                if inst.set_flags {
                    cpu.regs.pstate = result.flags;
                }
                out.alu = result.value;
            }

            Opcode::And | Opcode::Orr | Opcode::Eor => {
                let op2 = second_operand(&entry);
                let kind = match inst.op {
                    Opcode::And => alu::LogicOp::And,
                    Opcode::Orr => alu::LogicOp::Orr,
                    _ => alu::LogicOp::Eor,
                };
                let result = alu::logic(kind, entry.a, op2, inst.is_64bit);
                if inst.set_flags {
                    cpu.regs.pstate = result.flags;
                }
                out.alu = result.value;
            }

            Opcode::Movz => {
                out.alu = inst.imm << inst.shift;
            }

            Opcode::Adrp => {
                out.alu = (entry.pc & !0xFFF).wrapping_add_signed(inst.signed_imm);
            }

            Opcode::Ldr | Opcode::Str | Opcode::Ldp | Opcode::Stp => {
                let ea = lsu::effective_address(inst, entry.a);
                out.alu = ea.addr;
                out.base_wb = ea
                    .base_writeback
                    .map(|value| BaseWriteback { reg: inst.rn, value });
            }

            Opcode::B | Opcode::Bl | Opcode::BCond | Opcode::Br | Opcode::Blr | Opcode::Ret => {
                let fall_through = entry.pc.wrapping_add(INSTRUCTION_SIZE);
                let (taken, target) = match inst.op {
                    Opcode::B => (true, entry.pc.wrapping_add_signed(inst.branch_offset)),
                    Opcode::Bl => {
                        cpu.regs.write(REG_LR, fall_through);
                        (true, entry.pc.wrapping_add_signed(inst.branch_offset))
                    }
                    Opcode::BCond => {
                        let taken = cpu.regs.pstate.condition_holds(inst.cond);
                        let target = if taken {
                            entry.pc.wrapping_add_signed(inst.branch_offset)
                        } else {
                            fall_through
                        };
                        (taken, target)
                    }
                    Opcode::Blr => {
                        cpu.regs.write(REG_LR, fall_through);
                        (true, entry.a)
                    }
                    // BR and RET both jump to the register value.
                    _ => (true, entry.a),
                };

                cpu.stats.branch_predictions += 1;
                let mis = mispredicted(entry.pred_taken, entry.pred_target, taken, target);

                if inst.format == Format::BranchCond {
                    bru.update_conditional(entry.pc, taken, target);
                } else {
                    bru.update_unconditional(entry.pc, target);
                }

                if cpu.trace {
                    eprintln!(
                        "EX  pc={:#x} {:?} taken={taken} target={target:#x} mispredict={mis}",
                        entry.pc, inst.op
                    );
                }

                if mis {
                    outcome.redirect = Some(target);
                    outcome.squashed_slots = total - slot - 1;
                    output.entries.push(out);
                    return outcome;
                }
                cpu.stats.branch_correct += 1;
            }

            Opcode::Svc => {
                let result = syscalls.handle(&mut cpu.regs, &mut cpu.mem);
                if result.exited {
                    out.exit = Some(result.exit_code);
                }
            }

            Opcode::Unknown => {
                // Illegal instruction: fatal, surfaces as exit code -1.
                out.exit = Some(-1);
            }
        }

        if cpu.trace && !inst.is_branch() {
            eprintln!("EX  pc={:#x} {:?} alu={:#x}", entry.pc, inst.op, out.alu);
        }
        output.entries.push(out);
    }

    outcome
}

/// Materialises the second ALU operand for data-processing forms.
fn second_operand(entry: &IssueExecuteEntry) -> u64 {
    let inst = &entry.inst;
    match inst.format {
        Format::DpImm => inst.imm << inst.shift,
        Format::LogicalImm => inst.imm,
        // Register form with an optional LSL amount.
        _ => entry.b << inst.shift,
    }
}
