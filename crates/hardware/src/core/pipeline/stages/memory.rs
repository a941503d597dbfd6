//! Memory stage: data memory access.
//!
//! Loads capture their data into the latch; stores write memory here (the
//! single architectural write point for stores). Pair instructions touch the
//! effective address and the adjacent slot (`+8`, or `+4` in 32-bit mode).

use crate::core::Cpu;
use crate::core::pipeline::latches::{ExecuteMemEntry, MemWbEntry};
use crate::core::units::lsu;
use crate::isa::Opcode;

/// Runs the memory stage over one executed bundle.
pub fn memory_stage(cpu: &mut Cpu, bundle: Vec<ExecuteMemEntry>) -> Vec<MemWbEntry> {
    bundle
        .into_iter()
        .map(|entry| {
            let mut out = MemWbEntry {
                pc: entry.pc,
                inst: entry.inst,
                ctrl: entry.ctrl,
                alu: entry.alu,
                base_wb: entry.base_wb,
                exit: entry.exit,
                ..MemWbEntry::default()
            };
            let inst = &entry.inst;
            let addr = entry.alu;

            match inst.op {
                Opcode::Ldr => {
                    out.mem_data = read_scaled(cpu, addr, inst.is_64bit);
                }
                Opcode::Ldp => {
                    out.mem_data = read_scaled(cpu, addr, inst.is_64bit);
                    out.mem_data2 =
                        read_scaled(cpu, lsu::pair_second_addr(inst, addr), inst.is_64bit);
                }
                Opcode::Str => {
                    write_scaled(cpu, addr, entry.store_val, inst.is_64bit);
                }
                Opcode::Stp => {
                    write_scaled(cpu, addr, entry.store_val, inst.is_64bit);
                    write_scaled(
                        cpu,
                        lsu::pair_second_addr(inst, addr),
                        entry.store_val2,
                        inst.is_64bit,
                    );
                }
                _ => {}
            }

            if cpu.trace && inst.is_mem() {
                eprintln!(
                    "MEM pc={:#x} {:?} addr={addr:#x} data={:#x}",
                    entry.pc, inst.op, out.mem_data
                );
            }
            out
        })
        .collect()
}

fn read_scaled(cpu: &Cpu, addr: u64, is_64bit: bool) -> u64 {
    if is_64bit {
        cpu.mem.read_u64(addr)
    } else {
        u64::from(cpu.mem.read_u32(addr))
    }
}

fn write_scaled(cpu: &mut Cpu, addr: u64, value: u64, is_64bit: bool) {
    if is_64bit {
        cpu.mem.write_u64(addr, value);
    } else {
        cpu.mem.write_u32(addr, value as u32);
    }
}
