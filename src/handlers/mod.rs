// src/handlers/mod.rs

pub mod auth;
pub mod certificate;
pub mod course;
pub mod dashboard;
pub mod enrollment;
pub mod forum;
pub mod quiz;
pub mod video;
