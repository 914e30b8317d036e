// pii-anonymizer/src/ui/mod.rs
pub mod output_format;
