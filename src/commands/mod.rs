//! CLI commands

pub mod routes;
