// src/indicators/providers/mod.rs
pub mod world_bank;
