#![warn(clippy::all, clippy::pedantic)]

// Test modules
pub mod app_tests;
pub mod input_tests;
