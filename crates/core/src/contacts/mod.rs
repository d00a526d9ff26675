//! Contact store ports

pub mod ports;
