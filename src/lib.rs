//! Jobinfo Studio
//!
//! Per-module memory and timing profiling for batch data-processing jobs.
//!
//! A monitored job writes one diagnostic counter line per module per
//! pipeline step, interleaved with its normal log output. This crate parses
//! that output into an in-memory model correlating measurements across
//! steps, modules and runs, and exports CSV metric tables, rankings and
//! compressed archives from it.
//!
//! This crate provides the core implementation for the `jobinfo` CLI tool.

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
