// ABOUTME: Management API client for stack content structure
// ABOUTME: Typed CRUD operations for taxonomies over a pluggable HTTP transport

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod stack;
pub mod taxonomy;
pub mod transport;

// Re-export main types
pub use client::ManagementClient;
pub use config::ClientConfig;
pub use error::{ManagementError, ManagementResult};
pub use stack::{StackAuth, StackInstance};
pub use taxonomy::{Taxonomy, TaxonomyInput};
pub use transport::{ApiRequest, HttpTransport, RawResponse, Transport};
