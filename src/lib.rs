// src/lib.rs — Library root for BOOOMERANGS

pub mod api;
pub mod cli;
pub mod demo;
pub mod infra;
pub mod memory;
pub mod provider;
pub mod sessions;
pub mod util;
