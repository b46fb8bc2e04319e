//! Networking modules for the long-poll chat protocol.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` sends single actions and decodes `ajax-response` envelopes,
//! and `runner` owns the session's request flow, including the poll loop.

pub mod runner;
pub mod transport;
