//! Antenatal-care hypertension risk assessment for maternal health clinics.
//!
//! The [`clinic`] module holds the scoring engine, alert generator, and the intake
//! orchestrator that turns a raw visit submission into a complete assessment. Storage and
//! notification delivery are collaborators expressed as traits in [`clinic::repository`].

pub mod clinic;
pub mod config;
pub mod error;
pub mod telemetry;
