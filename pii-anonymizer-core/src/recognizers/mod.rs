// pii-anonymizer-core/src/recognizers/mod.rs
//! Built-in [`EntityRecognizer`](crate::recognizer::EntityRecognizer) implementations.

pub mod compiler;
pub mod gazetteer;
pub mod pattern;
pub mod person;
