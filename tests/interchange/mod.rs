//! Interchange tests (requires the `interchange` feature)
//!
//! - Reading parser documents from disk
//! - Manifest-driven analysis runs
//! - Writing the resolved model

pub mod tests_documents;
