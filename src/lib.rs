//! Conjunction screening and heuristic collision-risk scoring for a catalog
//! of Earth-orbiting objects.
//!
//! The [`screening`] engine is independent of how states are produced; any
//! [`screening::StateProvider`] can be screened. [`predict`] supplies the SGP4
//! provider and TLE catalog loader used by the binary and the HTTP API.

pub mod config;
pub mod predict;
pub mod screening;
pub mod web;
