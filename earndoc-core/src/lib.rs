//! Core pipeline for generating earnings summary documents.
//!
//! The flow is deliberately linear: load (symbol, quarter) targets from a
//! CSV, resolve the destination folder, fetch one summary per target from
//! the earnings proxy with retry, and write one .docx per target. The
//! first fatal error anywhere stops the run.

pub mod client;
pub mod config;
pub mod dest;
pub mod docx;
pub mod error;
pub mod run;
pub mod targets;
