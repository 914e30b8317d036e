// pii-anonymizer/src/lib.rs
//! # PII Anonymizer CLI
//!
//! This crate provides the command-line front end for `pii-anonymizer-core`:
//! argument parsing, logging setup, scoped file and stream I/O, and colored
//! status messages. All detection and redaction lives in the core crate.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
