//! End-to-end diffusion tests: pending batches in, broadcast batches and
//! eviction reports out.

pub mod helpers;
mod scenarios;
