pub mod config;
pub mod process;
pub mod registry;
pub mod render;
pub mod runner;
