// Core infrastructure modules
pub mod config;
pub mod core;

// Directory modules
pub mod demo;
pub mod directory;
pub mod report;
pub mod validation;

#[cfg(test)]
mod test_utils;
