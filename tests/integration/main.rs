//! Integration tests for the session container and sync services.

mod helpers;

mod channel_test;
mod connection_test;
mod notification_test;
mod refresh_test;
mod session_test;
