// policies.rs — Policy set helpers shared by authorize and the codec.
//
// PolicySet does not iterate in source order. Parsed statements are named
// policy0, policy1, ... in the order they appear, so sorting on that numeric
// suffix restores it.

use std::collections::BTreeMap;

use cedar_policy::{Policy, PolicyId, PolicySet};

/// Statements of `set` in source order.
pub(crate) fn ordered_policies(set: &PolicySet) -> Vec<&Policy> {
    let mut policies: Vec<&Policy> = set.policies().collect();
    policies.sort_by_cached_key(|p| source_position(p.id()));
    policies
}

/// Id of the statement at `index` in a printed or parsed set.
pub(crate) fn positional_id(index: usize) -> PolicyId {
    PolicyId::new(format!("policy{}", index))
}

fn source_position(id: &PolicyId) -> (usize, String) {
    let id = id.to_string();
    let position = id
        .strip_prefix("policy")
        .and_then(|n| n.parse().ok())
        .unwrap_or(usize::MAX);
    (position, id)
}

pub(crate) fn annotations_of(policy: &Policy) -> BTreeMap<String, String> {
    policy
        .annotations()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn numeric_suffix_orders_past_ten() {
        let text = (0..11)
            .map(|i| format!("@seq(\"{}\") forbid(principal, action, resource);", i))
            .collect::<Vec<_>>()
            .join("\n");
        let set = PolicySet::from_str(&text).unwrap();
        let seqs: Vec<String> = ordered_policies(&set)
            .iter()
            .map(|p| annotations_of(p)["seq"].clone())
            .collect();
        let expected: Vec<String> = (0..11).map(|i| i.to_string()).collect();
        assert_eq!(seqs, expected);
    }

    #[test]
    fn annotations_are_collected() {
        let set = PolicySet::from_str(
            r#"@name("limit") @action("MFA") permit(principal, action, resource);"#,
        )
        .unwrap();
        let policy = ordered_policies(&set)[0];
        let annotations = annotations_of(policy);
        assert_eq!(annotations.get("name").map(String::as_str), Some("limit"));
        assert_eq!(annotations.get("action").map(String::as_str), Some("MFA"));
    }

    #[test]
    fn positional_ids_match_parser_naming() {
        let set = PolicySet::from_str("permit(principal, action, resource);").unwrap();
        assert_eq!(ordered_policies(&set)[0].id(), &positional_id(0));
    }
}
