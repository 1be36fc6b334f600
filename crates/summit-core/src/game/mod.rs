pub mod chapter;
pub mod hook;
pub mod layout;
pub mod location;
pub mod snapshot;

// Synthetic game memory for tests (always available for unit and integration tests)
#[doc(hidden)]
pub mod testing;

pub use chapter::{Chapter, MENU_ID, Side, UNSET_ID};
pub use hook::{BasePointer, Hook, discover_title_offset, locate_base_pointer};
pub use layout::FieldLayout;
pub use location::LocationId;
pub use snapshot::{Snapshot, read_snapshot};
