// Library root for the command-line front end: CSV ingestion and the
// commands, exposed so they can be tested without spawning the binary.

pub mod commands;
pub mod projections;
