//! Configuration system for the ARM64 timing simulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the simulator. It provides:
//! 1. **Defaults:** Baseline hardware constants (issue width, predictor
//!    geometry, latencies).
//! 2. **Structures:** Hierarchical config for general, pipeline, and latency
//!    settings.
//! 3. **Enums:** Timing engine and branch predictor selection.
//!
//! Configuration is supplied as JSON (`serde_json`) by embedding callers or
//! via `Config::default()`.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden in the JSON configuration.
mod defaults {
    /// Default program counter when no image supplies an entry point.
    pub const START_PC: u64 = 0x1000;

    /// Default initial stack pointer.
    ///
    /// Matches the conventional user-stack top handed out by the loader.
    pub const INITIAL_SP: u64 = 0x7FFF_0000;

    /// Default issue width (instructions per cycle).
    pub const ISSUE_WIDTH: usize = 1;

    /// Default Branch History Table size (1024 two-bit counters).
    pub const BHT_SIZE: usize = 1024;

    /// Default Branch Target Buffer size (256 entries).
    pub const BTB_SIZE: usize = 256;

    /// Default global history length in bits.
    pub const GLOBAL_HISTORY_BITS: usize = 8;

    /// Default execute latency for ALU operations, in cycles.
    pub const LATENCY_ALU: u32 = 1;

    /// Default execute latency for loads, in cycles.
    ///
    /// Covers address generation plus L1 access for a hit.
    pub const LATENCY_LOAD: u32 = 3;

    /// Default execute latency for stores, in cycles.
    pub const LATENCY_STORE: u32 = 1;

    /// Default execute latency for branches, in cycles.
    pub const LATENCY_BRANCH: u32 = 1;

    /// Default memory-stage occupancy for loads and stores, in cycles.
    pub const LATENCY_MEMORY: u32 = 1;
}

/// Issue widths the pipeline supports.
pub const SUPPORTED_WIDTHS: &[usize] = &[1, 2, 3, 4, 6, 8];

/// Timing engine selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EngineKind {
    /// The detailed cycle-accurate pipeline.
    #[default]
    Pipeline,
    /// The fast-timing engine: same stats surface, simplified timing.
    Fast,
}

/// Branch prediction algorithm types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PredictorKind {
    /// Always predict not-taken.
    NotTaken,
    /// PC-indexed table of 2-bit saturating counters.
    #[default]
    Bimodal,
    /// Global history XOR PC indexed counters.
    #[serde(alias = "GShare")]
    Gshare,
    /// Global + local components with a chooser; ties prefer local.
    Tournament,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Deserializing from JSON (typical embedding usage):
///
/// ```
/// use a64sim_core::config::{Config, PredictorKind};
///
/// let json = r#"{
///     "general": { "trace": false, "max_instructions": 1000000 },
///     "pipeline": {
///         "width": 4,
///         "branch_predictor": "Gshare",
///         "bht_size": 4096,
///         "btb_size": 512,
///         "global_history_bits": 12
///     },
///     "latency": { "load": 4 }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.pipeline.width, 4);
/// assert_eq!(config.pipeline.branch_predictor, PredictorKind::Gshare);
/// assert_eq!(config.latency.load, 4);
/// assert_eq!(config.latency.alu, 1);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Pipeline and branch predictor configuration.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Instruction latency overrides.
    #[serde(default)]
    pub latency: LatencyConfig,
}

/// General simulation settings and options.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Enable pipeline tracing to stderr.
    #[serde(default)]
    pub trace: bool,

    /// Timing engine to run.
    #[serde(default)]
    pub engine: EngineKind,

    /// Initial PC when no program image supplies an entry point.
    #[serde(default = "GeneralConfig::default_start_pc")]
    pub start_pc: u64,

    /// Initial stack pointer.
    #[serde(default = "GeneralConfig::default_initial_sp")]
    pub initial_sp: u64,

    /// Maximum retired-instruction count; 0 means unbounded. Reaching the
    /// limit halts the simulation with exit code 0.
    #[serde(default)]
    pub max_instructions: u64,
}

impl GeneralConfig {
    /// Returns the default starting program counter.
    fn default_start_pc() -> u64 {
        defaults::START_PC
    }

    /// Returns the default initial stack pointer.
    fn default_initial_sp() -> u64 {
        defaults::INITIAL_SP
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace: false,
            engine: EngineKind::default(),
            start_pc: defaults::START_PC,
            initial_sp: defaults::INITIAL_SP,
            max_instructions: 0,
        }
    }
}

/// Pipeline and branch predictor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Superscalar issue width (instructions per cycle); one of
    /// [`SUPPORTED_WIDTHS`].
    #[serde(default = "PipelineConfig::default_width")]
    pub width: usize,

    /// Branch predictor type.
    #[serde(default)]
    pub branch_predictor: PredictorKind,

    /// Branch History Table size (power of two).
    #[serde(default = "PipelineConfig::default_bht_size")]
    pub bht_size: usize,

    /// Branch Target Buffer size (power of two).
    #[serde(default = "PipelineConfig::default_btb_size")]
    pub btb_size: usize,

    /// Global history length in bits (0-16).
    #[serde(default = "PipelineConfig::default_history_bits")]
    pub global_history_bits: usize,
}

impl PipelineConfig {
    /// Returns the default issue width.
    fn default_width() -> usize {
        defaults::ISSUE_WIDTH
    }

    /// Returns the default BHT size.
    fn default_bht_size() -> usize {
        defaults::BHT_SIZE
    }

    /// Returns the default BTB size.
    fn default_btb_size() -> usize {
        defaults::BTB_SIZE
    }

    /// Returns the default global history length.
    fn default_history_bits() -> usize {
        defaults::GLOBAL_HISTORY_BITS
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            width: defaults::ISSUE_WIDTH,
            branch_predictor: PredictorKind::default(),
            bht_size: defaults::BHT_SIZE,
            btb_size: defaults::BTB_SIZE,
            global_history_bits: defaults::GLOBAL_HISTORY_BITS,
        }
    }
}

/// Instruction latency configuration.
///
/// Each field is the execute-stage occupancy in cycles for one operation
/// class; `memory` is the additional memory-stage occupancy for loads and
/// stores.
#[derive(Debug, Clone, Deserialize)]
pub struct LatencyConfig {
    /// ALU operations (add/sub/logical/moves).
    #[serde(default = "LatencyConfig::default_alu")]
    pub alu: u32,

    /// Loads (LDR, LDP).
    #[serde(default = "LatencyConfig::default_load")]
    pub load: u32,

    /// Stores (STR, STP).
    #[serde(default = "LatencyConfig::default_store")]
    pub store: u32,

    /// Branches (direct, conditional, indirect).
    #[serde(default = "LatencyConfig::default_branch")]
    pub branch: u32,

    /// Memory-stage occupancy for loads and stores.
    #[serde(default = "LatencyConfig::default_memory")]
    pub memory: u32,
}

impl LatencyConfig {
    /// Returns the default ALU latency.
    fn default_alu() -> u32 {
        defaults::LATENCY_ALU
    }

    /// Returns the default load latency.
    fn default_load() -> u32 {
        defaults::LATENCY_LOAD
    }

    /// Returns the default store latency.
    fn default_store() -> u32 {
        defaults::LATENCY_STORE
    }

    /// Returns the default branch latency.
    fn default_branch() -> u32 {
        defaults::LATENCY_BRANCH
    }

    /// Returns the default memory-stage occupancy.
    fn default_memory() -> u32 {
        defaults::LATENCY_MEMORY
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            alu: defaults::LATENCY_ALU,
            load: defaults::LATENCY_LOAD,
            store: defaults::LATENCY_STORE,
            branch: defaults::LATENCY_BRANCH,
            memory: defaults::LATENCY_MEMORY,
        }
    }
}
