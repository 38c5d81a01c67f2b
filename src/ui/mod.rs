//! User interface layer
//!
//! The viewport core lives in [`viewport`]; everything else here hosts it in
//! a terminal.

pub mod app;
pub mod file_info;
pub mod slot_pool;
pub mod table_view;
pub mod viewport;
