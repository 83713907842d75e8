//! Integration tests for srtp

mod cli_test;
mod helpers;
mod parse_test;
mod session_test;
