//! Data layer
//!
//! Stores own the parsed data; the viewport only ever sees them through
//! [`data_provider::DataProvider`] and a [`dataset::DatasetHandle`].

pub mod csv_store;
pub mod data_provider;
pub mod dataset;
pub mod memory_store;
