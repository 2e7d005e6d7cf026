//! View, edit and re-run test cases against a remote execution service
//!
//! The [`session`] and [`runs`] modules hold the state of the two screens and are usable on
//! their own; the [`frontend`] drives them from a terminal, with remote calls performed by the
//! [`commands`] backend through a [`gateway::Gateway`].
pub mod cli;
pub mod commands;
pub mod config;
pub mod frontend;
pub mod gateway;
pub mod navigation;
pub mod runboard_tracing;
pub mod runs;
pub mod session;
