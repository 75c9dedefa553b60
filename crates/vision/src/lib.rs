//! Object Verification Client.
//!
//! Talks to an OpenAI-compatible vision endpoint and turns its answer into
//! a [`photoproof_core::verification::VerificationOutcome`]. The client is
//! infallible by contract: any transport, parsing, or upstream problem
//! degrades to the canonical negative outcome so the session layer handles
//! every failure through its ordinary retry/override path.

pub mod client;
pub mod judgment;

pub use client::{ObjectVerifier, VisionClient, VisionConfig};
