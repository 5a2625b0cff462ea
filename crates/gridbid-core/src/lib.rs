// Library root: auction valuation engine and bid advisor for fantasy football
// auction drafts. Everything here is synchronous and I/O free apart from
// config loading; callers hand in fully materialized player pools and draft
// snapshots.

pub mod advisor;
pub mod config;
pub mod draft;
pub mod valuation;
