//! Integration tests for the SentinelLink synchronization engine
//!
//! This test suite validates:
//! - The end-to-end status check / response flow between roles
//! - Read-state invariants (first response wins, unread arithmetic)
//! - Reconnection behavior and connect-time refresh
//! - WebSocket signal fan-out to dispatch and officer clients

pub mod test_utils;


#[cfg(test)]
mod reconnect_tests;

#[cfg(test)]
mod signal_server_tests;
