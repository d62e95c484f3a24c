//! AI Financial Steward
//!
//! Two services built from one crate:
//! - a REST backend serving mock Cymbal Bank data from JSON files
//! - an A2A agent server whose Gemini-driven agents reach that backend
//!   through typed HTTP tools
//!
//! AGENT LOOP:
//! USER → MODEL → TOOLS / TRANSFER → MODEL → REPLY

pub mod a2a;
pub mod agent;
pub mod backend;
pub mod config;
pub mod error;
pub mod finance;
pub mod gemini;
pub mod models;
pub mod tools;

pub use error::Result;
