// src/handlers/mod.rs

pub mod assessment;
pub mod enrollment;
pub mod progress;
