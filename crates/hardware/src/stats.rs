//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the timing core. It provides:
//! 1. **Cycle and CPI:** Total cycles, retired instructions, and the derived
//!    cycles-per-instruction metric.
//! 2. **Stalls:** Per-cause stall cycle counts (fetch, decode, execute,
//!    memory) and data-hazard events.
//! 3. **Control Flow:** Flush counts, flushed-slot totals, and branch
//!    prediction accuracy.

use std::collections::BTreeMap;

/// Simulation statistics structure tracking all performance metrics.
///
/// Every counter is owned and mutated exclusively by the timing engine; the
/// struct itself is plain data so runs can be compared bit-for-bit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions committed (retired).
    pub instructions_retired: u64,

    /// Cycles the fetch stage was blocked by a full downstream latch.
    pub fetch_stalls: u64,
    /// Cycles the decode stage was blocked by a full downstream latch.
    pub decode_stalls: u64,
    /// Cycles issue was blocked (busy execute stage or unresolved operand).
    pub exec_stalls: u64,
    /// Cycles lost to memory-port conflicts and memory-stage occupancy.
    pub mem_stalls: u64,

    /// Pipeline flushes caused by branch mispredictions.
    pub flushes: u64,
    /// Total in-flight slots invalidated across all flushes.
    pub flush_cycles: u64,
    /// Read-after-write hazards that inserted a bubble at issue.
    pub data_hazards: u64,

    /// Branch predictions resolved at execute.
    pub branch_predictions: u64,
    /// Resolved predictions whose direction and target were both right.
    pub branch_correct: u64,
}

impl SimStats {
    /// Cycles per retired instruction.
    ///
    /// Guarded against the empty run: a zero retirement count divides by one.
    pub fn cpi(&self) -> f64 {
        self.cycles as f64 / self.instructions_retired.max(1) as f64
    }

    /// Branch prediction accuracy in the 0.0-1.0 range, or 0.0 before any
    /// branch resolved.
    pub fn branch_accuracy(&self) -> f64 {
        if self.branch_predictions == 0 {
            0.0
        } else {
            self.branch_correct as f64 / self.branch_predictions as f64
        }
    }

    /// Returns all counters as a named map, suitable for serialization or
    /// diffing between runs.
    pub fn counters(&self) -> BTreeMap<&'static str, u64> {
        BTreeMap::from([
            ("cycles", self.cycles),
            ("instructions_retired", self.instructions_retired),
            ("fetch_stalls", self.fetch_stalls),
            ("decode_stalls", self.decode_stalls),
            ("exec_stalls", self.exec_stalls),
            ("mem_stalls", self.mem_stalls),
            ("flushes", self.flushes),
            ("flush_cycles", self.flush_cycles),
            ("data_hazards", self.data_hazards),
            ("branch_predictions", self.branch_predictions),
            ("branch_correct", self.branch_correct),
        ])
    }

    /// Prints the timing report to stdout.
    ///
    /// # Panics
    ///
    /// This function will not panic: all divisions are guarded by `max(1)`
    /// denominators.
    pub fn print(&self) {
        let total = self.cycles.max(1) as f64;
        let pct = |v: u64| (v as f64 / total) * 100.0;

        println!("========================================");
        println!("Total Instructions: {}", self.instructions_retired);
        println!("Total Cycles: {}", self.cycles);
        println!("CPI: {:.2}", self.cpi());
        println!();
        println!("Breakdown:");
        println!(
            "  Fetch stalls:    {} cycles ({:.1}%)",
            self.fetch_stalls,
            pct(self.fetch_stalls)
        );
        println!(
            "  Decode stalls:   {} cycles ({:.1}%)",
            self.decode_stalls,
            pct(self.decode_stalls)
        );
        println!(
            "  Execute stalls:  {} cycles ({:.1}%)",
            self.exec_stalls,
            pct(self.exec_stalls)
        );
        println!(
            "  Memory stalls:   {} cycles ({:.1}%)",
            self.mem_stalls,
            pct(self.mem_stalls)
        );
        println!(
            "  Flush cycles:    {} cycles ({:.1}%)",
            self.flush_cycles,
            pct(self.flush_cycles)
        );
        println!(
            "  Data hazards:    {}",
            self.data_hazards
        );
        if self.branch_predictions > 0 {
            println!(
                "  Branches:        {} predicted, {} correct ({:.1}%)",
                self.branch_predictions,
                self.branch_correct,
                self.branch_accuracy() * 100.0
            );
        }
        println!("========================================");
    }
}
