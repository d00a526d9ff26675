//! Pure utility helpers shared across the domain

pub mod phone;
