//! Simulator: owns the CPU and the timing engine side-by-side.
//!
//! Keeping the engine outside `Cpu` avoids the borrow-splitting hack of
//! storing the pipeline as an `Option` inside the state it mutates.

use tracing::debug;

use crate::common::SimError;
use crate::config::{Config, EngineKind};
use crate::core::Cpu;
use crate::core::fast::FastTiming;
use crate::core::pipeline::Pipeline;
use crate::stats::SimStats;
use crate::syscall::SyscallHandler;

/// One loadable program segment.
#[derive(Clone, Debug, Default)]
pub struct Segment {
    /// Virtual base address.
    pub base: u64,
    /// Initialised bytes.
    pub data: Vec<u8>,
    /// Total in-memory size; any tail beyond `data` is zero-filled BSS.
    pub mem_size: u64,
}

/// The `(PC, SP, memory)` triple contract between a loader and the core.
#[derive(Clone, Debug, Default)]
pub struct ProgramImage {
    /// Entry point.
    pub entry: u64,
    /// Initial stack pointer.
    pub initial_sp: u64,
    /// Loadable segments.
    pub segments: Vec<Segment>,
}

/// Result of a completed run.
#[derive(Clone, Debug)]
pub struct RunResult {
    /// Program exit code (negative for an illegal instruction).
    pub exit_code: i64,
    /// Final statistics snapshot.
    pub stats: SimStats,
}

/// Timing engine selected by configuration.
#[derive(Debug)]
enum EngineDispatch {
    /// Detailed cycle-accurate pipeline.
    Pipeline(Box<Pipeline>),
    /// Fast-timing engine.
    Fast(Box<FastTiming>),
}

/// Top-level simulator: CPU architectural state + timing engine.
#[derive(Debug)]
pub struct Simulator {
    /// CPU architectural state (registers, memory, statistics).
    pub cpu: Cpu,
    engine: EngineDispatch,
    loaded: bool,
}

impl Simulator {
    /// Creates a simulator from configuration.
    ///
    /// # Errors
    ///
    /// Propagates configuration validation failures (issue width, predictor
    /// geometry).
    pub fn new(config: &Config) -> Result<Self, SimError> {
        let engine = match config.general.engine {
            EngineKind::Pipeline => EngineDispatch::Pipeline(Box::new(Pipeline::new(config)?)),
            EngineKind::Fast => EngineDispatch::Fast(Box::new(FastTiming::new(config))),
        };
        Ok(Self {
            cpu: Cpu::new(config),
            engine,
            loaded: false,
        })
    }

    /// Replaces the syscall handler on the active engine.
    pub fn set_syscall_handler(&mut self, handler: Box<dyn SyscallHandler>) {
        match &mut self.engine {
            EngineDispatch::Pipeline(p) => p.set_syscall_handler(handler),
            EngineDispatch::Fast(f) => f.set_syscall_handler(handler),
        }
    }

    /// Builder-style variant of [`Self::set_syscall_handler`].
    #[must_use]
    pub fn with_syscall_handler(mut self, handler: Box<dyn SyscallHandler>) -> Self {
        self.set_syscall_handler(handler);
        self
    }

    /// Loads a raw program at `entry` and marks the simulator runnable.
    pub fn load_program(&mut self, entry: u64, bytes: &[u8]) {
        self.cpu.mem.write_bytes(entry, bytes);
        self.cpu.regs.pc = entry;
        self.loaded = true;
    }

    /// Loads a full program image: segments, entry PC, and initial SP.
    pub fn load_image(&mut self, image: &ProgramImage) {
        for segment in &image.segments {
            self.cpu.mem.write_bytes(segment.base, &segment.data);
            // BSS tail needs no explicit fill; unwritten memory reads zero.
        }
        self.cpu.regs.pc = image.entry;
        self.cpu.regs.sp = image.initial_sp;
        self.loaded = true;
    }

    /// Redirects execution to `pc` and marks the simulator runnable; for
    /// programs placed in memory by hand.
    pub fn set_pc(&mut self, pc: u64) {
        self.cpu.regs.pc = pc;
        self.loaded = true;
    }

    /// Advances the simulation by one clock cycle.
    pub fn tick(&mut self) {
        match &mut self.engine {
            EngineDispatch::Pipeline(p) => p.tick(&mut self.cpu),
            EngineDispatch::Fast(f) => f.tick(&mut self.cpu),
        }
    }

    /// Runs until the core halts and returns the exit code and statistics.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ProgramNotLoaded`] if nothing was loaded.
    pub fn run(&mut self) -> Result<RunResult, SimError> {
        if !self.loaded {
            return Err(SimError::ProgramNotLoaded);
        }
        debug!(pc = self.cpu.regs.pc, "run start");
        while !self.cpu.halted {
            self.tick();
        }
        let exit_code = self.cpu.exit_code.unwrap_or(0);
        debug!(exit_code, cycles = self.cpu.stats.cycles, "run complete");
        Ok(RunResult {
            exit_code,
            stats: self.cpu.stats.clone(),
        })
    }

    /// Current statistics.
    pub fn stats(&self) -> &SimStats {
        &self.cpu.stats
    }
}
