//! Process-wide state shared across commands.

mod state;

pub use state::{is_shutdown, request_shutdown, setup_shutdown_handler};
