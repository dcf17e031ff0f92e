//! Use-case services over the statement repositories.
//!
//! # Responsibility
//! - Orchestrate sign-in, statement import and transaction reads.
//! - Apply the error policy: writes log and propagate, reads log and degrade
//!   to an empty result.

pub mod statement_service;
