//! Pipeline latch structures for inter-stage communication.
//!
//! This module defines the buffers that connect the six stages of the
//! pipeline. It implements:
//! 1. **Instruction Flow:** Structures for carrying state between Fetch,
//!    Decode, Issue, Execute, Memory, and Writeback.
//! 2. **Superscalar Support:** Multi-entry latches for wide-issue
//!    configurations; entry order is slot order (oldest first).
//! 3. **Termination Propagation:** Carrying the exit decision produced at
//!    execute through to retirement.
//!
//! Latch entries are value types; concurrent in-flight copies of the same
//! instruction never alias.

use crate::core::pipeline::signals::ControlSignals;
use crate::isa::Instruction;

/// A pending base-register update from a pre/post-index addressing mode.
///
/// `reg` is interpreted in the load/store base context, so index 31 names
/// the stack pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaseWriteback {
    /// Base register index.
    pub reg: usize,
    /// New base value.
    pub value: u64,
}

/// Entry in the IF/ID latch (Fetch to Decode).
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchDecodeEntry {
    /// Program counter of the instruction.
    pub pc: u64,
    /// Raw 32-bit instruction encoding.
    pub raw: u32,
    /// Whether the branch predictor predicted this slot as taken.
    pub pred_taken: bool,
    /// Predicted target address when `pred_taken` is set.
    pub pred_target: u64,
}

/// Entry in the ID/IX latch (Decode to Issue).
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeIssueEntry {
    /// Program counter of the instruction.
    pub pc: u64,
    /// Raw 32-bit instruction encoding.
    pub raw: u32,
    /// Decoded instruction record.
    pub inst: Instruction,
    /// Control signals for downstream stages.
    pub ctrl: ControlSignals,
    /// Prediction carried from fetch.
    pub pred_taken: bool,
    /// Predicted target carried from fetch.
    pub pred_target: u64,
}

/// Entry in the IX/EX latch (Issue to Execute).
#[derive(Clone, Copy, Debug, Default)]
pub struct IssueExecuteEntry {
    /// Program counter of the instruction.
    pub pc: u64,
    /// Decoded instruction record.
    pub inst: Instruction,
    /// Control signals for downstream stages.
    pub ctrl: ControlSignals,
    /// Operand A: Rn (base register value for loads/stores, target register
    /// value for indirect branches).
    pub a: u64,
    /// Operand B: Rm for register forms.
    pub b: u64,
    /// Store data (Rt) for stores.
    pub store_val: u64,
    /// Second store data (Rt2) for STP.
    pub store_val2: u64,
    /// Prediction carried from fetch.
    pub pred_taken: bool,
    /// Predicted target carried from fetch.
    pub pred_target: u64,
    /// Execute-stage occupancy from the latency table.
    pub exec_cycles: u32,
    /// Memory-stage occupancy from the latency table.
    pub mem_cycles: u32,
}

/// Entry in the EX/MEM latch (Execute to Memory).
#[derive(Clone, Copy, Debug, Default)]
pub struct ExecuteMemEntry {
    /// Program counter of the instruction.
    pub pc: u64,
    /// Decoded instruction record.
    pub inst: Instruction,
    /// Control signals for downstream stages.
    pub ctrl: ControlSignals,
    /// ALU result, or the effective address for memory operations.
    pub alu: u64,
    /// Store data for stores.
    pub store_val: u64,
    /// Second store data for STP.
    pub store_val2: u64,
    /// Pending base-register update for pre/post-index forms.
    pub base_wb: Option<BaseWriteback>,
    /// Exit decision produced at execute (SVC exit or illegal instruction).
    pub exit: Option<i64>,
    /// Memory-stage occupancy.
    pub mem_cycles: u32,
}

/// Entry in the MEM/WB latch (Memory to Writeback).
#[derive(Clone, Copy, Debug, Default)]
pub struct MemWbEntry {
    /// Program counter of the instruction.
    pub pc: u64,
    /// Decoded instruction record.
    pub inst: Instruction,
    /// Control signals for the writeback stage.
    pub ctrl: ControlSignals,
    /// ALU result for non-load writebacks.
    pub alu: u64,
    /// Data loaded from memory.
    pub mem_data: u64,
    /// Second loaded value for LDP.
    pub mem_data2: u64,
    /// Pending base-register update for pre/post-index forms.
    pub base_wb: Option<BaseWriteback>,
    /// Exit decision carried from execute.
    pub exit: Option<i64>,
}

/// IF/ID pipeline latch. Empty entries vector means a bubble.
#[derive(Clone, Debug, Default)]
pub struct FetchDecode {
    /// Fetched slots, oldest first.
    pub entries: Vec<FetchDecodeEntry>,
}

/// ID/IX pipeline latch.
#[derive(Clone, Debug, Default)]
pub struct DecodeIssue {
    /// Decoded slots, oldest first.
    pub entries: Vec<DecodeIssueEntry>,
}

/// IX/EX pipeline latch.
#[derive(Clone, Debug, Default)]
pub struct IssueExecute {
    /// Issued slots with operands read, oldest first.
    pub entries: Vec<IssueExecuteEntry>,
}

/// EX/MEM pipeline latch.
#[derive(Clone, Debug, Default)]
pub struct ExecuteMem {
    /// Executed slots, oldest first.
    pub entries: Vec<ExecuteMemEntry>,
}

/// MEM/WB pipeline latch.
#[derive(Clone, Debug, Default)]
pub struct MemWb {
    /// Slots ready to retire, oldest first.
    pub entries: Vec<MemWbEntry>,
}
