//! # banyan-protocol
//!
//! The policy exchange protocol for Banyan: how an authorization request is
//! sent to a policy evaluator, how its decision comes back, and how policy
//! text moves to and from a structured statement form.
//!
//! The evaluator itself sits behind the [`PolicyEvaluator`] trait. This crate
//! never evaluates policies; it marshals requests, checks responses, and
//! guarantees that callers only ever see validated data.
//!
//! ## Key invariants
//!
//! - **Validate before trust**: [`PolicyEngine::invoke`] returns either a
//!   [`DecisionResponse`] that conforms to the checked-in response schema or a
//!   [`ProtocolError`]. There is no unvalidated middle ground.
//! - **Order and annotations survive**: the codec never reorders statements
//!   or drops annotations; `policy_to_json(policy_from_json(s)) == s`.
//! - **Stateless calls**: no state is shared between invocations, so one
//!   engine can serve concurrent callers.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use banyan_protocol::{AuthorizationRequest, PolicyEngine, PolicyEvaluator};
//!
//! fn check(evaluator: Arc<dyn PolicyEvaluator>) -> Result<bool, banyan_protocol::ProtocolError> {
//!     let engine = PolicyEngine::new(evaluator)?;
//!     let request = AuthorizationRequest::new(
//!         r#"User::"alice""#,
//!         r#"Action::"view""#,
//!         r#"Photo::"beach""#,
//!         "permit(principal, action, resource);",
//!     );
//!     Ok(engine.invoke(&request)?.is_allowed())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod evaluator;
pub mod schema;
pub mod statement;
pub mod validation;

pub use codec::PolicyCodec;
pub use config::{BanyanConfig, EngineConfig, EvaluatorConfig, DEFAULT_CONFIG_FILE};
pub use engine::{parse_response_payload, PolicyEngine};
pub use envelope::{
    AuthorizationRequest, Decision, DecisionResponse, StatementResult, TriggeredAction,
};
pub use error::{EvaluatorError, ProtocolError};
pub use evaluator::PolicyEvaluator;
pub use schema::{JsonSchema, ProtocolVersion, SchemaViolation, PROTOCOL_VERSION};
pub use statement::{Effect, PolicyStatement};
pub use validation::{ValidatePolicyRequest, ValidationResult};
