//! Library side of the `gradeimport` command line tool.

#![deny(unsafe_code)]

pub mod config;
pub mod ingest;
pub mod logging;
