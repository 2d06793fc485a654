mod enrich;
mod health;
mod search;
mod tables;

pub use enrich::cmd_enrich;
pub use health::cmd_health;
pub use search::cmd_search;
pub use tables::cmd_tables;
