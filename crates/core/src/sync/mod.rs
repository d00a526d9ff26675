//! Sync settings ports

pub mod ports;
