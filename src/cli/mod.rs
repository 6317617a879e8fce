//! CLI module for flockr - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for running the
//! scheduler, seeding the health store, and inspecting fleet health.

pub mod commands;

pub use commands::Cli;
