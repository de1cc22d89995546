//! Nexus Pipeline - client onboarding pipeline engine.
//!
//! Tracks each client's progress through an ordered catalog of onboarding
//! steps, advances pipeline groups one step at a time, and regenerates the
//! client's automation workflows when the survey analysis is completed.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
