//! Backend adapters for the engine.
//!
//! [`RestBackend`] talks to the hosted API over HTTPS; [`FixtureBackend`]
//! serves seeded in-memory data for development and tests.

mod convert;
mod fixture;
mod rest;

pub use fixture::FixtureBackend;
pub use rest::RestBackend;
