// src/models/mod.rs

pub mod assessment;
pub mod course;
pub mod enrollment;
pub mod question;
