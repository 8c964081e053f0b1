//! NestEgg gateway: HTTP surface and turn orchestration.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;
