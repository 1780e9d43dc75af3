pub mod error;
pub mod generator;
pub mod memory;
pub mod postgres;
pub mod store;
