pub mod check;
pub mod dump;
pub mod loader;
pub mod rules;
pub mod run_common;
pub mod transform;
pub mod types;

#[cfg(test)]
mod loader_tests;
