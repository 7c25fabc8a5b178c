//! jobtrail API server library.
//!
//! Exposes the server building blocks (config, state, routes, seeding) so
//! integration tests and the binary entrypoint can both access them.

pub mod config;
pub mod router;
pub mod routes;
pub mod seed;
pub mod state;
