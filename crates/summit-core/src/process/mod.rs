mod handle;
pub mod pointer;
pub mod provider;
mod reader;
pub mod region;
pub mod scanner;

// Mock memory backend for testing (always available for unit and integration tests)
#[doc(hidden)]
pub mod mock;

pub use handle::*;
pub use pointer::{PointerChain, STRING_HEADER, resolve};
pub use provider::{ProcessInfo, ProcessProvider, SystemProcessProvider};
pub use reader::ReadMemory;
pub use region::{MemoryRegion, QueryRegions, RegionIter};
pub use scanner::{find_signature, scannable_regions};

#[doc(hidden)]
pub use mock::{MockMemory, MockMemoryBuilder, MockProcess, MockProcessProvider};
