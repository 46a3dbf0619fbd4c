//! HTTP execution for horizon-gql operations.
//!
//! This crate sends operations built with [`horizon_gql`] to a GraphQL
//! endpoint and wraps the response:
//!
//! - **Client**: [`GraphQLClient`] serializes, POSTs `{"query": ...}` and
//!   decodes the envelope
//! - **Transport**: the [`Transport`] trait, with a `reqwest`-backed default
//! - **Results**: [`ExecutionResult`] keeps partial data next to server errors
//!
//! # Executing a Query
//!
//! ```no_run
//! use horizon_gql::Operation;
//! use horizon_gql_net::GraphQLClient;
//!
//! let client = GraphQLClient::new("https://api.example.com/graphql")
//!     .bearer_auth("my-token")
//!     .build()?;
//!
//! let query = Operation::query(|q| {
//!     q.field("viewer").select(|v| {
//!         v.field("login");
//!     });
//! })?;
//!
//! let result = client.execute(&query)?;
//! if let Some(errors) = result.errors() {
//!     eprintln!("partial response: {errors}");
//! }
//! println!("{:?}", result.path("viewer.login")?.as_str());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Outcomes
//!
//! - `data` present: `Ok`, with any `errors` exposed on the result
//! - only `errors`: [`ClientError::Execution`]
//! - neither: [`ClientError::Protocol`]
//! - non-2xx status: [`ClientError::Transport`] carrying
//!   [`TransportError::Status`]
//!
//! `execute` blocks. From async code, call it inside
//! `tokio::task::spawn_blocking`.

mod client;
mod error;
mod response;
pub mod runtime;
mod transport;

pub use client::{GraphQLClient, GraphQLClientBuilder};
pub use error::{ClientError, Result, TransportError};
pub use response::{
    ExecutionResult, GraphQLError, GraphQLExecutionError, GraphQLLocation, PathSegment,
};
pub use transport::{
    HttpTransport, HttpTransportConfig, Transport, TransportRequest, TransportResponse,
};
