//! Shared domain types for NestEgg: configuration tree, error type, and
//! the provider-agnostic message/tool vocabulary.

pub mod config;
pub mod error;
pub mod tool;
