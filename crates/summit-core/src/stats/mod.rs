mod attempt;
pub mod observer;
mod run_state;
mod status;
mod table;

pub use attempt::AttemptStat;
pub use observer::{Field, SubscriptionId};
pub use run_state::{RunState, TableKey};
pub use status::HookStatus;
pub use table::StatTable;
