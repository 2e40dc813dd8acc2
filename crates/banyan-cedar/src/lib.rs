//! # banyan-cedar
//!
//! The policy evaluator behind the Banyan exchange protocol, running
//! [Cedar](https://www.cedarpolicy.com) in process.
//!
//! [`CedarEvaluator`] implements [`banyan_protocol::PolicyEvaluator`]:
//!
//! - `authorize` — evaluates a request and reports one result per statement.
//! - `policy_to_json` / `policy_from_json` — converts between policy text
//!   and structured statements, preserving order and annotations.
//! - `validate_policy` — type-checks policy text against merged schema
//!   fragments.
//!
//! Construct one evaluator at startup and hand it to
//! [`banyan_protocol::PolicyEngine`]; it is stateless and thread-safe.

mod authorize;
mod codec;
pub mod error;
pub mod evaluator;
mod policies;
mod validate;

pub use error::CedarError;
pub use evaluator::CedarEvaluator;
