// pii-anonymizer/src/commands/mod.rs
pub mod anonymize;
