//! Shared end-to-end test infrastructure

mod client;
mod constants;
mod fixtures;
mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use server::TestServer;
