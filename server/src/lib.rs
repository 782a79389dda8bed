//! medrag server library
//!
//! Startup indexing, a blocking-pool backend around the retrieval engine and
//! a JSON-RPC front end that keeps client input errors apart from backend
//! failures.

pub mod backend;
pub mod config;
pub mod error;
pub mod rpc;

pub use backend::RetrievalBackend;
pub use config::{EmbedderKind, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use rpc::RpcServer;
