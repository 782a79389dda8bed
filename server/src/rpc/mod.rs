//! JSON-RPC front end
//!
//! Exposes the retrieval engine over line-delimited JSON-RPC 2.0 on stdio.
//!
//! ## Usage
//!
//! ```bash
//! medrag-server --corpus medical_docs serve
//! {"jsonrpc":"2.0","id":1,"method":"retrieve","params":{"query":"fever and cough"}}
//! ```
//!
//! Methods: `ping`, `retrieve`, `search`, `stats`.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::*;
pub use server::RpcServer;
pub use transport::LineTransport;
