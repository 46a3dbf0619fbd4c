//! GraphQL query DSL for Horizon.
//!
//! This crate builds GraphQL documents from Rust closures instead of
//! hand-written query strings, and wraps response data for checked access:
//!
//! - **Builder**: nested closures append fields, type-matches (`... on Type`)
//!   and fragment spreads in authored order
//! - **Fragments**: named, typed selections spread by reference
//! - **Serializer**: deterministic document text with de-duplicated trailing
//!   fragment definitions, or fragments resolved inline
//! - **Response values**: dotted-path access that tells "absent" from "null"
//!
//! Sending documents over HTTP lives in `horizon-gql-net`.
//!
//! # Example
//!
//! ```
//! use horizon_gql::{Fragment, Operation, Value};
//!
//! let cat = Fragment::new("CatFields", "Cat", |s| {
//!     s.field("name");
//!     s.field("likes");
//! })
//! .unwrap();
//!
//! let query = Operation::query(|s| {
//!     s.field("catCollection")
//!         .arg("limit", 2)
//!         .arg("order", Value::enum_value("likes_DESC"))
//!         .select(|s| {
//!             s.field("items").select(|s| {
//!                 s.spread(&cat);
//!                 s.on("Kitten", |s| {
//!                     s.field("ageInWeeks");
//!                 });
//!             });
//!         });
//! })
//! .unwrap();
//!
//! let text = query.to_document().unwrap();
//! assert!(text.contains("catCollection(limit: 2 order: likes_DESC) {"));
//! assert!(text.contains("... on Kitten {"));
//! assert!(text.ends_with("fragment CatFields on Cat {\n  name\n  likes\n}"));
//! ```

mod builder;
mod error;
mod fragment;
mod node;
mod operation;
mod response;
mod serializer;
mod value;

pub use builder::{FieldHandle, InlineHandle, Scope, SelectionStack, SpreadHandle};
pub use error::{Error, Result};
pub use fragment::Fragment;
pub use node::{
    is_valid_name, validate_selection, Arguments, Directive, Field, FragmentSpread,
    InlineFragment, Node, NodeKind,
};
pub use operation::{Operation, OperationType};
pub use response::ResponseValue;
pub use serializer::{FragmentMode, Serializer};
pub use value::Value;
