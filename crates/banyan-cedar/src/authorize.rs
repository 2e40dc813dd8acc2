// authorize.rs — Evaluate an authorization request with Cedar.
//
// Every statement in the policy set gets one StatementResult, in source
// order, marked `invoked` when Cedar lists it among the statements that
// determined the decision. Cedar applies default deny and forbid-overrides-
// permit; this module only reports what it decided.
//
// Anything wrong with the request contents (a bad entity reference, policy
// text that does not parse, entities or context that do not match the
// schema) is a domain problem: the call still succeeds, with decision Deny
// and the problem listed in `errors`.

use std::collections::HashSet;
use std::str::FromStr;

use banyan_protocol::{AuthorizationRequest, Decision, DecisionResponse, StatementResult};
use cedar_policy::{Authorizer, Context, Entities, EntityUid, PolicyId, PolicySet, Request, Schema};

use crate::error::CedarError;
use crate::policies::{annotations_of, ordered_policies};

/// Everything Cedar needs to answer one request.
struct Prepared {
    request: Request,
    policies: PolicySet,
    entities: Entities,
}

/// Evaluate `request`. Never fails; problems are reported in the response.
pub(crate) fn authorize(request: &AuthorizationRequest) -> DecisionResponse {
    match prepare(request) {
        Ok(prepared) => evaluate(&prepared),
        Err(e) => {
            tracing::debug!(error = %e, "request rejected before evaluation");
            DecisionResponse {
                decision: Decision::Deny,
                reasons: Vec::new(),
                errors: vec![e.to_string()],
            }
        }
    }
}

fn prepare(request: &AuthorizationRequest) -> Result<Prepared, CedarError> {
    let schema = match &request.schema {
        Some(text) => Some(
            Schema::from_json_str(text).map_err(|e| CedarError::Schema(e.to_string()))?,
        ),
        None => None,
    };

    let principal = entity_uid("principal", &request.principal)?;
    let action = entity_uid("action", &request.action)?;
    let resource = entity_uid("resource", &request.resource)?;

    if request.policy.trim().is_empty() {
        return Err(CedarError::InvalidField {
            field: "policy",
            reason: "policy text is empty".to_string(),
        });
    }
    let policies =
        PolicySet::from_str(&request.policy).map_err(|e| CedarError::PolicyParse(e.to_string()))?;

    let entities = Entities::from_json_str(&request.entities, schema.as_ref()).map_err(|e| {
        CedarError::InvalidField {
            field: "entities",
            reason: e.to_string(),
        }
    })?;

    let context = Context::from_json_str(&request.context, schema.as_ref().map(|s| (s, &action)))
        .map_err(|e| CedarError::InvalidField {
            field: "context",
            reason: e.to_string(),
        })?;

    let request = Request::new(principal, action, resource, context, schema.as_ref()).map_err(
        |e| CedarError::InvalidField {
            field: "request",
            reason: e.to_string(),
        },
    )?;

    Ok(Prepared {
        request,
        policies,
        entities,
    })
}

fn evaluate(prepared: &Prepared) -> DecisionResponse {
    let response =
        Authorizer::new().is_authorized(&prepared.request, &prepared.policies, &prepared.entities);

    let determining: HashSet<&PolicyId> = response.diagnostics().reason().collect();
    let reasons = ordered_policies(&prepared.policies)
        .into_iter()
        .map(|policy| StatementResult {
            policy_id: policy.id().to_string(),
            invoked: determining.contains(policy.id()),
            annotations: annotations_of(policy),
        })
        .collect();

    let errors = response
        .diagnostics()
        .errors()
        .map(|e| e.to_string())
        .collect();

    let decision = match response.decision() {
        cedar_policy::Decision::Allow => Decision::Allow,
        cedar_policy::Decision::Deny => Decision::Deny,
    };

    DecisionResponse {
        decision,
        reasons,
        errors,
    }
}

fn entity_uid(field: &'static str, raw: &str) -> Result<EntityUid, CedarError> {
    if raw.trim().is_empty() {
        return Err(CedarError::InvalidField {
            field,
            reason: "entity reference is empty".to_string(),
        });
    }
    EntityUid::from_str(raw).map_err(|e| CedarError::InvalidField {
        field,
        reason: format!("'{}' is not an entity reference: {}", raw, e),
    })
}
