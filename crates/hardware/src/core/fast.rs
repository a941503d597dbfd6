//! Fast-timing engine.
//!
//! A simplified in-order timing model for runs where observable throughput
//! matters more than a detailed stall breakdown. Each cycle it completes any
//! delayed register writes that are due, then fetches, decodes, and executes
//! exactly one instruction semantically; multi-cycle results are enqueued as
//! delayed operations instead of flowing through latches.
//!
//! The engine exposes the same statistics surface as the pipeline, with
//! `flushes` and `data_hazards` pinned at zero; condition codes use the same
//! full table as the detailed path.

use crate::common::{INSTRUCTION_SIZE, REG_LR};
use crate::config::Config;
use crate::core::Cpu;
use crate::core::latency::LatencyTable;
use crate::core::units::{alu, lsu};
use crate::isa::{self, Format, Opcode};
use crate::syscall::{LinuxAbi, SyscallHandler};

/// A register write that completes in a future cycle.
#[derive(Clone, Copy, Debug)]
struct DelayedOp {
    complete_cycle: u64,
    reg: usize,
    value: u64,
}

/// The fast-timing engine.
pub struct FastTiming {
    latency: LatencyTable,
    syscalls: Box<dyn SyscallHandler>,
    pending: Vec<DelayedOp>,
}

impl std::fmt::Debug for FastTiming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastTiming")
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl FastTiming {
    /// Creates a fast-timing engine with the default Linux syscall handler.
    pub fn new(config: &Config) -> Self {
        Self {
            latency: LatencyTable::from_config(&config.latency),
            syscalls: Box::new(LinuxAbi::new()),
            pending: Vec::with_capacity(8),
        }
    }

    /// Replaces the syscall handler.
    pub fn set_syscall_handler(&mut self, handler: Box<dyn SyscallHandler>) {
        self.syscalls = handler;
    }

    /// Executes one fast-timing cycle.
    pub fn tick(&mut self, cpu: &mut Cpu) {
        if cpu.halted {
            return;
        }
        if cpu.max_instructions > 0 && cpu.stats.instructions_retired >= cpu.max_instructions {
            cpu.halt(0);
            return;
        }

        cpu.stats.cycles += 1;
        self.complete_pending(cpu);

        let pc = cpu.regs.pc;
        let word = cpu.mem.read_u32(pc);
        let inst = isa::decode(word);

        if inst.op == Opcode::Unknown {
            cpu.halt(-1);
            return;
        }

        self.execute(cpu, &inst, pc);
        if !cpu.halted {
            cpu.stats.instructions_retired += 1;
        }
    }

    /// Applies delayed register writes whose completion cycle has arrived.
    fn complete_pending(&mut self, cpu: &mut Cpu) {
        let now = cpu.stats.cycles;
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].complete_cycle <= now {
                let op = self.pending.swap_remove(i);
                cpu.regs.write(op.reg, op.value);
            } else {
                i += 1;
            }
        }
    }

    /// Schedules or applies a register write depending on latency.
    fn write_result(&mut self, cpu: &mut Cpu, reg: usize, value: u64, latency: u32) {
        if latency > 1 {
            self.pending.push(DelayedOp {
                complete_cycle: cpu.stats.cycles + u64::from(latency),
                reg,
                value,
            });
        } else {
            cpu.regs.write(reg, value);
        }
    }

    fn execute(&mut self, cpu: &mut Cpu, inst: &isa::Instruction, pc: u64) {
        let fall_through = pc.wrapping_add(INSTRUCTION_SIZE);
        let a = cpu.regs.read(inst.rn);
        let b = cpu.regs.read(inst.rm);
        let latency = self.latency.exec_cycles(inst);

        match inst.op {
            Opcode::Add | Opcode::Sub => {
                let op2 = match inst.format {
                    Format::DpImm => inst.imm << inst.shift,
                    _ => b << inst.shift,
                };
                let out = match (inst.op, inst.is_64bit) {
                    (Opcode::Add, true) => alu::add64(a, op2),
                    (Opcode::Add, false) => alu::add32(a as u32, op2 as u32),
                    (_, true) => alu::sub64(a, op2),
                    (_, false) => alu::sub32(a as u32, op2 as u32),
                };
                if inst.set_flags {
                    cpu.regs.pstate = out.flags;
                }
                self.write_result(cpu, inst.rd, out.value, latency);
            }

            Opcode::And | Opcode::Orr | Opcode::Eor => {
                let op2 = match inst.format {
                    Format::DpReg => b << inst.shift,
                    _ => inst.imm,
                };
                let kind = match inst.op {
                    Opcode::And => alu::LogicOp::And,
                    Opcode::Orr => alu::LogicOp::Orr,
                    _ => alu::LogicOp::Eor,
                };
                let out = alu::logic(kind, a, op2, inst.is_64bit);
                if inst.set_flags {
                    cpu.regs.pstate = out.flags;
                }
                self.write_result(cpu, inst.rd, out.value, latency);
            }

            Opcode::Movz => {
                cpu.regs.write(inst.rd, inst.imm << inst.shift);
            }

            Opcode::Adrp => {
                cpu.regs
                    .write(inst.rd, (pc & !0xFFF).wrapping_add_signed(inst.signed_imm));
            }

            Opcode::Ldr => {
                let base = cpu.regs.read_base(inst.rn);
                let ea = lsu::effective_address(inst, base);
                let value = if inst.is_64bit {
                    cpu.mem.read_u64(ea.addr)
                } else {
                    u64::from(cpu.mem.read_u32(ea.addr))
                };
                if let Some(new_base) = ea.base_writeback {
                    cpu.regs.write_base(inst.rn, new_base);
                }
                // Loads always complete late.
                self.pending.push(DelayedOp {
                    complete_cycle: cpu.stats.cycles + u64::from(latency),
                    reg: inst.rd,
                    value,
                });
            }

            Opcode::Str => {
                let base = cpu.regs.read_base(inst.rn);
                let ea = lsu::effective_address(inst, base);
                let value = cpu.regs.read(inst.rd);
                if inst.is_64bit {
                    cpu.mem.write_u64(ea.addr, value);
                } else {
                    cpu.mem.write_u32(ea.addr, value as u32);
                }
                if let Some(new_base) = ea.base_writeback {
                    cpu.regs.write_base(inst.rn, new_base);
                }
            }

            Opcode::Ldp => {
                let base = cpu.regs.read_base(inst.rn);
                let ea = lsu::effective_address(inst, base);
                let second = lsu::pair_second_addr(inst, ea.addr);
                let (v1, v2) = if inst.is_64bit {
                    (cpu.mem.read_u64(ea.addr), cpu.mem.read_u64(second))
                } else {
                    (
                        u64::from(cpu.mem.read_u32(ea.addr)),
                        u64::from(cpu.mem.read_u32(second)),
                    )
                };
                cpu.regs.write(inst.rd, v1);
                cpu.regs.write(inst.rt2, v2);
                if let Some(new_base) = ea.base_writeback {
                    cpu.regs.write_base(inst.rn, new_base);
                }
            }

            Opcode::Stp => {
                let base = cpu.regs.read_base(inst.rn);
                let ea = lsu::effective_address(inst, base);
                let second = lsu::pair_second_addr(inst, ea.addr);
                let (v1, v2) = (cpu.regs.read(inst.rd), cpu.regs.read(inst.rt2));
                if inst.is_64bit {
                    cpu.mem.write_u64(ea.addr, v1);
                    cpu.mem.write_u64(second, v2);
                } else {
                    cpu.mem.write_u32(ea.addr, v1 as u32);
                    cpu.mem.write_u32(second, v2 as u32);
                }
                if let Some(new_base) = ea.base_writeback {
                    cpu.regs.write_base(inst.rn, new_base);
                }
            }

            Opcode::B => {
                cpu.regs.pc = pc.wrapping_add_signed(inst.branch_offset);
                return;
            }

            Opcode::Bl => {
                cpu.regs.write(REG_LR, fall_through);
                cpu.regs.pc = pc.wrapping_add_signed(inst.branch_offset);
                return;
            }

            Opcode::BCond => {
                cpu.regs.pc = if cpu.regs.pstate.condition_holds(inst.cond) {
                    pc.wrapping_add_signed(inst.branch_offset)
                } else {
                    fall_through
                };
                return;
            }

            Opcode::Br => {
                cpu.regs.pc = a;
                return;
            }

            Opcode::Blr => {
                cpu.regs.write(REG_LR, fall_through);
                cpu.regs.pc = a;
                return;
            }

            Opcode::Ret => {
                cpu.regs.pc = a;
                return;
            }

            Opcode::Svc => {
                let result = self.syscalls.handle(&mut cpu.regs, &mut cpu.mem);
                if result.exited {
                    cpu.stats.instructions_retired += 1;
                    cpu.halt(result.exit_code);
                    // Retirement was counted here; tick() skips its own.
                    return;
                }
            }

            Opcode::Unknown => {}
        }

        cpu.regs.pc = fall_through;
    }
}
