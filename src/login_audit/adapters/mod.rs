//! Adapter implementations for the login audit port.

pub mod memory;
pub mod postgres;
