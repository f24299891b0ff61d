//! Access-control and token-lifecycle subsystem.

pub mod guards;
pub mod jwt;
pub mod ownership;
pub mod principal;
pub mod resolver;
