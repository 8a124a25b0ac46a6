//! Reference resolution against backend outputs.
//!
//! Resolution replaces each reference expression with the matching backend
//! output. A reference whose type or property has no output stays verbatim
//! in the value and produces a [`ReferenceIssue::Unresolved`] warning, so a
//! partially-covered environment is visible without being destructive.

use std::collections::BTreeMap;

use tracing::debug;

use crate::expr::{ReferenceIssue, REFERENCE_PATTERN};

/// Tracing target for resolution operations.
const RESOLVE_TARGET: &str = "deskribe_refs::resolve";

/// Outcome of resolving an environment map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    /// The environment with every resolvable reference substituted.
    pub env: BTreeMap<String, String>,
    /// One warning per distinct unresolved reference.
    pub warnings: Vec<ReferenceIssue>,
}

/// Substitutes backend outputs into every value of the environment map.
///
/// `outputs` maps resource type to property to resolved value. Each match is
/// replaced independently; duplicate occurrences of the same reference are
/// all replaced. Values without references pass through unchanged, and the
/// operation is idempotent as long as outputs do not themselves contain
/// reference expressions.
///
/// Substituted values are logged redacted because they commonly carry
/// credentials.
#[must_use]
pub fn resolve_references(
    env: &BTreeMap<String, String>,
    outputs: &BTreeMap<String, BTreeMap<String, String>>,
) -> ResolvedEnvironment {
    let mut warnings: Vec<ReferenceIssue> = Vec::new();
    let mut resolved = BTreeMap::new();

    for (name, value) in env {
        let replaced = REFERENCE_PATTERN.replace_all(value, |captures: &regex::Captures<'_>| {
            let raw = &captures[0];
            let resource_type = &captures[1];
            let property = &captures[2];
            match outputs
                .get(resource_type)
                .and_then(|properties| properties.get(property))
            {
                Some(output) => {
                    debug!(
                        target: RESOLVE_TARGET,
                        env_var = %name,
                        resource_type,
                        property,
                        value = "***",
                        "resolved reference"
                    );
                    output.clone()
                }
                None => {
                    let warning = ReferenceIssue::Unresolved {
                        env_var: name.clone(),
                        raw: raw.to_owned(),
                    };
                    if !warnings.contains(&warning) {
                        warnings.push(warning);
                    }
                    raw.to_owned()
                }
            }
        });
        resolved.insert(name.clone(), replaced.into_owned());
    }

    ResolvedEnvironment {
        env: resolved,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect()
    }

    fn outputs_of(
        entries: &[(&str, &[(&str, &str)])],
    ) -> BTreeMap<String, BTreeMap<String, String>> {
        entries
            .iter()
            .map(|(resource_type, properties)| {
                (
                    (*resource_type).to_owned(),
                    properties
                        .iter()
                        .map(|(property, value)| {
                            ((*property).to_owned(), (*value).to_owned())
                        })
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn substitutes_matching_output() {
        let env = env_of(&[("DB", "@resource(postgres).connectionString")]);
        let outputs = outputs_of(&[("postgres", &[("connectionString", "host=db;user=svc")])]);
        let resolved = resolve_references(&env, &outputs);
        assert_eq!(resolved.env["DB"], "host=db;user=svc");
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn replaces_every_reference_in_a_value() {
        let env = env_of(&[(
            "URL",
            "postgres://@resource(postgres).host:@resource(postgres).port/app",
        )]);
        let outputs = outputs_of(&[("postgres", &[("host", "db.internal"), ("port", "5432")])]);
        let resolved = resolve_references(&env, &outputs);
        assert_eq!(resolved.env["URL"], "postgres://db.internal:5432/app");
    }

    #[test]
    fn replaces_duplicate_occurrences() {
        let env = env_of(&[("BOTH", "@resource(redis).endpoint @resource(redis).endpoint")]);
        let outputs = outputs_of(&[("redis", &[("endpoint", "cache:6379")])]);
        let resolved = resolve_references(&env, &outputs);
        assert_eq!(resolved.env["BOTH"], "cache:6379 cache:6379");
    }

    #[test]
    fn leaves_unresolved_reference_verbatim_with_warning() {
        let env = env_of(&[("HOST", "@resource(postgres).host")]);
        let outputs = outputs_of(&[("postgres", &[("connectionString", "secret")])]);
        let resolved = resolve_references(&env, &outputs);
        assert_eq!(resolved.env["HOST"], "@resource(postgres).host");
        assert_eq!(
            resolved.warnings,
            vec![ReferenceIssue::Unresolved {
                env_var: "HOST".into(),
                raw: "@resource(postgres).host".into(),
            }]
        );
    }

    #[test]
    fn missing_resource_type_also_warns() {
        let env = env_of(&[("CACHE", "@resource(redis).endpoint")]);
        let resolved = resolve_references(&env, &BTreeMap::new());
        assert_eq!(resolved.env["CACHE"], "@resource(redis).endpoint");
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn literal_values_pass_through_unchanged() {
        let env = env_of(&[("PLAIN", "value"), ("EMPTY", "")]);
        let resolved = resolve_references(&env, &BTreeMap::new());
        assert_eq!(resolved.env, env);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn resolution_is_idempotent() {
        let env = env_of(&[(
            "MIX",
            "db=@resource(postgres).host cache=@resource(redis).endpoint",
        )]);
        let outputs = outputs_of(&[("postgres", &[("host", "db.internal")])]);
        let first = resolve_references(&env, &outputs);
        let second = resolve_references(&first.env, &outputs);
        assert_eq!(second.env, first.env);
        assert_eq!(second.warnings, first.warnings);
    }

    #[test]
    fn duplicate_unresolved_references_warn_once() {
        let env = env_of(&[("TWICE", "@resource(redis).endpoint @resource(redis).endpoint")]);
        let resolved = resolve_references(&env, &BTreeMap::new());
        assert_eq!(resolved.warnings.len(), 1);
    }
}
