// src/grading/mod.rs

pub mod answer;
pub mod attempt;
pub mod progress;
