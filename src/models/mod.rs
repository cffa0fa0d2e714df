// src/models/mod.rs

pub mod certificate;
pub mod course;
pub mod enrollment;
pub mod forum;
pub mod quiz;
pub mod user;
pub mod video;
