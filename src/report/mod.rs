//! Report assembly and output rendering.

pub mod generator;

pub use generator::*;
