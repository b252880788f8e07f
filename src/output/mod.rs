//! Output file finalisation and checks

pub mod verifier;
pub mod writer;

pub use verifier::OutputVerifier;
pub use writer::OutputWriter;
