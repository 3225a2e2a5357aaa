//! Request handlers.

pub mod entries;
