// src/handlers/mod.rs
pub mod proxy;
pub mod status;
