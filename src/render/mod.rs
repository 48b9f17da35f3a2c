//! TypeScript handler rendering.

pub mod ident;
pub mod typescript;

pub use typescript::CodeSynthesizer;
