//! Client library for the job-market analytics dashboard: HTTP access to
//! the analytics backend plus the state and presentation helpers the
//! dashboard views share.

pub mod client;
pub mod common;
pub mod utils;
