//! Multi-year retirement-plan workforce simulation.
//!
//! Year by year, event generators sample workforce events from hazard
//! tables, the accumulator carries plan state forward, and the snapshot
//! builder materialises one immutable row per employee. Everything is
//! keyed by scenario and committed to SQLite one whole year at a time.

pub mod accumulator;
pub mod analytics;
pub mod census;
pub mod clock;
pub mod config;
pub mod contributions;
pub mod date_window;
pub mod engine;
pub mod error;
pub mod event;
pub mod generator;
pub mod hazard;
pub mod rng;
pub mod snapshot;
pub mod snapshot_builder;
pub mod store;
pub mod types;
pub mod validation;

// Event generators
pub mod enrollment_generator;
pub mod escalation_generator;
pub mod hire_generator;
pub mod merit_generator;
pub mod new_hire_termination_generator;
pub mod promotion_generator;
pub mod termination_generator;
