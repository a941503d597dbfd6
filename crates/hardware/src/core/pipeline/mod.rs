//! The in-order superscalar pipeline controller.
//!
//! This module is the heart of the timing core. It owns the stage latches,
//! the branch unit, the latency table, and the syscall bridge, and advances
//! them one cycle per [`Pipeline::tick`]:
//! 1. **Back-to-Front Evaluation:** Writeback, Memory, Execute, Issue,
//!    Decode, Fetch — so a value never moves more than one stage per cycle.
//! 2. **Variable Latency:** An execute bundle holds for `max(latency) - 1`
//!    extra cycles; issue stalls behind it and consumers wait through the
//!    forwarding network.
//! 3. **Control Flow:** Mispredictions flush the IF/ID, ID/IX, and IX/EX
//!    latches, redirect the fetch PC, and train the predictor.
//! 4. **Termination:** Exit decisions (SVC exit, illegal instruction,
//!    instruction limit) halt the core at retirement.

/// Data hazard detection and operand forwarding.
pub mod hazards;
/// Inter-stage pipeline latches.
pub mod latches;
/// Control signals generated during instruction decode.
pub mod signals;
/// Pipeline stage implementations.
pub mod stages;

use crate::common::SimError;
use crate::config::{Config, SUPPORTED_WIDTHS};
use crate::core::Cpu;
use crate::core::latency::LatencyTable;
use crate::core::pipeline::latches::{
    DecodeIssue, ExecuteMem, FetchDecode, IssueExecute, IssueExecuteEntry, MemWb,
};
use crate::core::pipeline::stages::execute::ExecOutcome;
use crate::core::pipeline::stages::{decode, execute, fetch, issue, memory, writeback};
use crate::core::units::bru::BranchUnit;
use crate::syscall::{LinuxAbi, SyscallHandler};

/// The detailed cycle-accurate pipeline.
pub struct Pipeline {
    width: usize,
    latency: LatencyTable,
    /// Branch prediction unit, shared by every slot.
    pub bru: BranchUnit,
    syscalls: Box<dyn SyscallHandler>,

    if_id: FetchDecode,
    id_ix: DecodeIssue,
    ix_ex: IssueExecute,
    ex_mem: ExecuteMem,
    mem_wb: MemWb,

    /// Bundle occupying the execute stage across multiple cycles.
    ex_busy: Vec<IssueExecuteEntry>,
    /// Remaining execute-stage hold cycles for `ex_busy`.
    ex_hold: u32,
    /// Remaining memory-stage hold cycles for the EX/MEM bundle.
    mem_hold: u32,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("width", &self.width)
            .field("ex_hold", &self.ex_hold)
            .field("mem_hold", &self.mem_hold)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline from configuration with the default Linux syscall
    /// handler.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidIssueWidth`] for widths outside
    /// [`SUPPORTED_WIDTHS`], and propagates branch-unit geometry errors.
    pub fn new(config: &Config) -> Result<Self, SimError> {
        if !SUPPORTED_WIDTHS.contains(&config.pipeline.width) {
            return Err(SimError::InvalidIssueWidth(config.pipeline.width));
        }
        Ok(Self {
            width: config.pipeline.width,
            latency: LatencyTable::from_config(&config.latency),
            bru: BranchUnit::new(&config.pipeline)?,
            syscalls: Box::new(LinuxAbi::new()),
            if_id: FetchDecode::default(),
            id_ix: DecodeIssue::default(),
            ix_ex: IssueExecute::default(),
            ex_mem: ExecuteMem::default(),
            mem_wb: MemWb::default(),
            ex_busy: Vec::new(),
            ex_hold: 0,
            mem_hold: 0,
        })
    }

    /// Replaces the syscall handler (used by embedders and tests).
    pub fn set_syscall_handler(&mut self, handler: Box<dyn SyscallHandler>) {
        self.syscalls = handler;
    }

    /// Configured issue width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Advances the pipeline by one clock cycle.
    pub fn tick(&mut self, cpu: &mut Cpu) {
        if cpu.halted {
            return;
        }
        cpu.stats.cycles += 1;

        // 1. Writeback: retire in slot order. A retiring exit stops the
        // whole cycle; nothing younger may advance.
        let retiring = std::mem::take(&mut self.mem_wb.entries);
        writeback::writeback_stage(cpu, retiring);
        if cpu.halted {
            return;
        }

        // 2. Memory: the bundle occupies the stage for its memory latency,
        // then loads read and stores write.
        if !self.ex_mem.entries.is_empty() {
            if self.mem_hold == 0 {
                self.mem_hold = self
                    .ex_mem
                    .entries
                    .iter()
                    .map(|e| e.mem_cycles.max(1))
                    .max()
                    .unwrap_or(1);
            }
            if self.mem_hold > 1 {
                self.mem_hold -= 1;
                cpu.stats.mem_stalls += 1;
            } else {
                self.mem_hold = 0;
                let bundle = std::mem::take(&mut self.ex_mem.entries);
                self.mem_wb.entries = memory::memory_stage(cpu, bundle);
            }
        }

        // 3. Execute: either finish the bundle cooking in the EX self-loop
        // or accept a fresh one from issue.
        let mut outcome = ExecOutcome::default();
        if self.ex_busy.is_empty() {
            if !self.ix_ex.entries.is_empty() {
                let bundle = std::mem::take(&mut self.ix_ex.entries);
                let hold = bundle
                    .iter()
                    .map(|e| e.exec_cycles.max(1))
                    .max()
                    .unwrap_or(1)
                    - 1;
                if hold == 0 && self.ex_mem.entries.is_empty() {
                    outcome = execute::execute_bundle(
                        cpu,
                        &mut self.bru,
                        self.syscalls.as_mut(),
                        bundle,
                        &mut self.ex_mem,
                    );
                } else {
                    self.ex_busy = bundle;
                    self.ex_hold = hold;
                }
            }
        } else {
            if self.ex_hold > 0 {
                self.ex_hold -= 1;
            }
            if self.ex_hold == 0 && self.ex_mem.entries.is_empty() {
                let bundle = std::mem::take(&mut self.ex_busy);
                outcome = execute::execute_bundle(
                    cpu,
                    &mut self.bru,
                    self.syscalls.as_mut(),
                    bundle,
                    &mut self.ex_mem,
                );
            }
        }

        // 3b. Misprediction: invalidate every younger in-flight slot and
        // steer fetch to the resolved target.
        if let Some(target) = outcome.redirect {
            let flushed = outcome.squashed_slots
                + self.if_id.entries.len()
                + self.id_ix.entries.len()
                + self.ix_ex.entries.len();
            self.if_id.entries.clear();
            self.id_ix.entries.clear();
            self.ix_ex.entries.clear();
            cpu.stats.flushes += 1;
            cpu.stats.flush_cycles += flushed as u64;
            cpu.regs.pc = target;
            if cpu.trace {
                eprintln!("FL  redirect={target:#x} flushed={flushed}");
            }
        }

        // 4. Issue: operand read with forwarding; blocked while the IX/EX
        // latch is still occupied by a bundle the execute stage holds out.
        if !self.id_ix.entries.is_empty() {
            if self.ix_ex.entries.is_empty() {
                issue::issue_stage(
                    cpu,
                    &mut self.id_ix,
                    &mut self.ix_ex,
                    &self.ex_busy,
                    &self.ex_mem,
                    &self.mem_wb,
                    &self.latency,
                );
            } else {
                cpu.stats.exec_stalls += 1;
            }
        }

        // 5. Decode.
        if !self.if_id.entries.is_empty() {
            if self.id_ix.entries.is_empty() {
                decode::decode_stage(cpu, &mut self.if_id, &mut self.id_ix);
            } else {
                cpu.stats.decode_stalls += 1;
            }
        }

        // 6. Fetch.
        if self.if_id.entries.is_empty() {
            fetch::fetch_stage(cpu, &self.bru, self.width, &mut self.if_id);
        } else {
            cpu.stats.fetch_stalls += 1;
        }
    }
}
