// scenarios.rs — End-to-end decisions through the façade and the Cedar evaluator.
//
// Every request here goes the full path: AuthorizationRequest → JSON →
// CedarEvaluator → raw JSON → schema validation → DecisionResponse.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use banyan_cedar::CedarEvaluator;
use banyan_protocol::{
    AuthorizationRequest, Decision, EngineConfig, PolicyEngine, PolicyStatement, ProtocolError,
    TriggeredAction, ValidatePolicyRequest,
};

fn engine() -> PolicyEngine {
    PolicyEngine::new(Arc::new(CedarEvaluator::new())).unwrap()
}

fn view_request(policy: &str) -> AuthorizationRequest {
    AuthorizationRequest::new(
        r#"User::"alice""#,
        r#"Action::"view""#,
        r#"Photo::"beach""#,
        policy,
    )
}

#[test]
fn single_matching_permit_allows() {
    let response = engine()
        .invoke(&view_request(
            r#"permit(principal == User::"alice", action == Action::"view", resource == Photo::"beach");"#,
        ))
        .unwrap();

    assert_eq!(response.decision, Decision::Allow);
    assert_eq!(response.reasons.len(), 1);
    assert!(response.reasons[0].invoked);
    assert!(response.errors.is_empty());
}

#[test]
fn only_matching_forbid_denies() {
    let response = engine()
        .invoke(&view_request(r#"@name("lockdown") forbid(principal, action, resource);"#))
        .unwrap();

    assert_eq!(response.decision, Decision::Deny);
    assert_eq!(response.reasons.len(), 1);
    assert!(response.reasons[0].invoked);
    assert_eq!(response.reasons[0].name(), Some("lockdown"));
}

#[test]
fn forbid_overrides_permit() {
    let response = engine()
        .invoke(&view_request(
            r#"
            @name("open") permit(principal, action, resource);
            @name("closed") forbid(principal, action == Action::"view", resource);
            "#,
        ))
        .unwrap();

    assert_eq!(response.decision, Decision::Deny);
    assert_eq!(response.reasons.len(), 2);
    assert_eq!(response.reasons[0].name(), Some("open"));
    assert_eq!(response.reasons[1].name(), Some("closed"));
    assert!(response.reasons[1].invoked);
}

#[test]
fn same_request_yields_same_decision() {
    let engine = engine();
    let request = view_request(
        r#"
        @action("Notify") permit(principal, action, resource);
        forbid(principal == User::"mallory", action, resource);
        "#,
    );
    let first = engine.invoke(&request).unwrap();
    let second = engine.invoke(&request).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.triggered_actions(), vec![TriggeredAction::Notify]);
}

#[test]
fn concurrent_callers_share_one_engine() {
    let engine = engine();
    let request = view_request(r#"permit(principal, action == Action::"view", resource);"#);
    let expected = engine.invoke(&request).unwrap();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| engine.invoke(&request).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn entity_attributes_and_context_drive_conditions() {
    let entities = r#"[
        { "uid": { "type": "User", "id": "alice" }, "attrs": { "level": 5 }, "parents": [] }
    ]"#;
    let policy = r#"permit(principal, action, resource) when { principal.level >= 3 && context.mfa };"#;

    let allowed = engine()
        .invoke(
            &view_request(policy)
                .with_entities(entities)
                .with_context(r#"{"mfa": true}"#),
        )
        .unwrap();
    assert_eq!(allowed.decision, Decision::Allow);

    let denied = engine()
        .invoke(
            &view_request(policy)
                .with_entities(entities)
                .with_context(r#"{"mfa": false}"#),
        )
        .unwrap();
    assert_eq!(denied.decision, Decision::Deny);
}

#[test]
fn domain_problems_arrive_as_errors_in_a_valid_response() {
    let mut request = view_request("permit(principal, action, resource);");
    request.principal = "alice".to_string();

    let response = engine().invoke(&request).unwrap();
    assert_eq!(response.decision, Decision::Deny);
    assert!(response.reasons.is_empty());
    assert_eq!(response.errors.len(), 1);
}

#[test]
fn round_trip_preserves_statements_order_and_annotations() {
    let engine = engine();
    let original: Vec<PolicyStatement> = engine
        .policy_to_json(
            r#"
            @name("limit")
            @message("transfers over 100 need review")
            permit(principal == User::"alice", action == Action::"transfer", resource)
            when { context.amount < 100 };

            @action("MFA")
            forbid(principal, action in [Action::"transfer", Action::"withdraw"], resource)
            when { context.mfa == false };

            @action("MFA")
            forbid(principal, action, resource) unless { context.mfa };

            @name("mixed")
            permit(principal, action, resource)
            when { context.amount > 0 }
            unless { context.frozen }
            when { principal has level };
            "#,
        )
        .unwrap();
    assert_eq!(original.len(), 4);

    let text = engine.policy_from_json(&original).unwrap();
    let reparsed = engine.policy_to_json(&text).unwrap();
    assert_eq!(reparsed, original);
    assert_eq!(reparsed[1].annotation("action"), Some("MFA"));
    assert_eq!(reparsed[2].conditions[0]["kind"], "unless");
    let kinds: Vec<&str> = reparsed[3]
        .conditions
        .iter()
        .filter_map(|c| c["kind"].as_str())
        .collect();
    assert_eq!(kinds, vec!["when", "unless", "when"]);
}

#[test]
fn round_trip_law_holds_across_policy_constructs() {
    let config = EngineConfig {
        verify_round_trip: true,
        ..EngineConfig::default()
    };
    let engine = PolicyEngine::with_config(Arc::new(CedarEvaluator::new()), config).unwrap();

    let cases = [
        ("empty set", ""),
        ("unless", r#"forbid(principal, action, resource) unless { context.mfa };"#),
        (
            "when unless when",
            r#"permit(principal, action, resource)
               when { context.amount > 0 } unless { context.frozen } when { context.ok };"#,
        ),
        (
            "is in scope",
            r#"permit(principal is User in Group::"admins", action, resource is Photo in Album::"trip");"#,
        ),
        ("like pattern", r#"permit(principal, action, resource) when { resource.name like "*.jpg" };"#),
        ("valueless annotation", "@audit permit(principal, action, resource);"),
        (
            "annotations mixed",
            r#"@audit @name("n") @action("Notify") forbid(principal == User::"eve", action, resource);"#,
        ),
    ];

    for (label, text) in cases {
        let statements = engine
            .policy_to_json(text)
            .unwrap_or_else(|e| panic!("{}: to_json failed: {}", label, e));
        let printed = engine
            .policy_from_json(&statements)
            .unwrap_or_else(|e| panic!("{}: from_json failed: {}", label, e));
        let reparsed = engine.policy_to_json(&printed).unwrap();
        assert_eq!(reparsed, statements, "{}", label);
    }
}

#[test]
fn verified_printing_requires_canonical_statements() {
    let config = EngineConfig {
        verify_round_trip: true,
        ..EngineConfig::default()
    };
    let engine = PolicyEngine::with_config(Arc::new(CedarEvaluator::new()), config).unwrap();
    let escaped: PolicyStatement = serde_json::from_value(serde_json::json!({
        "effect": "permit",
        "principal": { "op": "==", "entity": { "__entity": { "type": "User", "id": "alice" } } },
        "action": { "op": "All" },
        "resource": { "op": "All" }
    }))
    .unwrap();

    match engine.policy_from_json(&[escaped]) {
        Err(ProtocolError::RoundTrip { index: 0, detail }) => {
            assert!(detail.contains("scope"));
        }
        other => panic!("expected RoundTrip, got {:?}", other),
    }
}

#[test]
fn valueless_annotation_reads_the_same_in_both_paths() {
    let text = "@audit permit(principal, action, resource);";
    let engine = engine();

    let statements = engine.policy_to_json(text).unwrap();
    assert_eq!(statements[0].annotation("audit"), Some(""));

    let response = engine.invoke(&view_request(text)).unwrap();
    assert_eq!(response.reasons[0].annotations.get("audit").map(String::as_str), Some(""));
}

#[test]
fn verified_round_trip_through_config() {
    let config = EngineConfig {
        verify_round_trip: true,
        ..EngineConfig::default()
    };
    let engine = PolicyEngine::with_config(Arc::new(CedarEvaluator::new()), config).unwrap();
    let statements = engine
        .policy_to_json(r#"@name("n") permit(principal, action, resource is Photo);"#)
        .unwrap();
    engine.policy_from_json(&statements).unwrap();
}

#[test]
fn malformed_policy_text_is_policy_parse_error() {
    match engine().policy_to_json("permit(principal, action, resource") {
        Err(ProtocolError::PolicyParse { .. }) => {}
        other => panic!("expected PolicyParse, got {:?}", other),
    }
}

#[test]
fn merged_fragments_accept_attributes_from_either() {
    let accounts = r#"{
        "Bank": {
            "entityTypes": {
                "User": { "shape": { "type": "Record", "attributes": { "level": { "type": "Long" } } } }
            },
            "actions": {
                "transfer": { "appliesTo": { "principalTypes": ["User"], "resourceTypes": ["Vault::Wallet"] } }
            }
        }
    }"#;
    let wallets = r#"{
        "Vault": {
            "entityTypes": {
                "Wallet": { "shape": { "type": "Record", "attributes": { "balance": { "type": "Long" } } } }
            },
            "actions": {}
        }
    }"#;
    let policy = r#"permit(principal, action == Bank::Action::"transfer", resource)
        when { principal.level > 2 && resource.balance > 100 };"#;

    let engine = engine();
    let merged = engine
        .validate_policy(
            &ValidatePolicyRequest::new(policy)
                .with_fragment(accounts)
                .with_fragment(wallets),
        )
        .unwrap();
    assert!(merged.valid, "unexpected errors: {:?}", merged.errors);

    let partial = engine
        .validate_policy(&ValidatePolicyRequest::new(policy).with_fragment(accounts))
        .unwrap();
    assert!(!partial.valid);
}

/// Runs every `<name>#<Allow|Deny>#<label>.json` request under tests/requests.
#[test]
fn example_requests_reach_expected_decisions() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/requests");
    let engine = engine();
    let mut checked = 0;

    for entry in fs::read_dir(&dir).unwrap() {
        let path = entry.unwrap().path();
        let file_name = path.file_stem().unwrap().to_string_lossy().to_string();
        let parts: Vec<&str> = file_name.split('#').collect();
        let expected = match parts.get(1) {
            Some(&"Allow") => Decision::Allow,
            Some(&"Deny") => Decision::Deny,
            _ => continue,
        };

        let request: AuthorizationRequest =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let response = engine.invoke(&request).unwrap();
        assert_eq!(response.decision, expected, "{}", file_name);

        if parts.get(2) == Some(&"mfa-required") {
            assert_eq!(response.triggered_actions(), vec![TriggeredAction::Mfa]);
        }
        checked += 1;
    }
    assert_eq!(checked, 4);
}
