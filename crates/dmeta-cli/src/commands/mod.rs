//! Command implementations for the dmeta CLI.

mod add;
mod reload;
mod search;
mod sources;

pub use add::execute as add_source;
pub use reload::execute as reload;
pub use search::{SearchOptions, execute as search};
pub use sources::execute as list_sources;
