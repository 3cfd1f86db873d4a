// Library exports for the TUG analysis CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
pub mod output;
