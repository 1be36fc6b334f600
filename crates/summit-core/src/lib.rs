pub mod config;
pub mod error;
pub mod export;
pub mod game;
pub mod process;
pub mod signature;
pub mod stats;
pub mod tracker;

pub use config::Config;
pub use error::{Error, Result};
pub use export::{SessionManager, export_csv, format_csv, format_stats_table};
pub use game::{Chapter, Hook, LocationId, Side, Snapshot, read_snapshot};
pub use process::{
    MemoryRegion, PointerChain, ProcessHandle, ProcessInfo, ProcessProvider, QueryRegions,
    ReadMemory, SystemProcessProvider, find_signature,
};
pub use signature::{CompiledSignature, Signature};
pub use stats::{AttemptStat, Field, HookStatus, RunState};
pub use tracker::{ShutdownSignal, Tracker};
