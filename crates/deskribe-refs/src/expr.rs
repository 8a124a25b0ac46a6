//! Reference extraction and validation.
//!
//! The expression grammar is regular: `@resource(<type>).<property>` where
//! `<type>` matches `[A-Za-z0-9_.]+` and `<property>` matches
//! `[A-Za-z0-9_]+`. Multiple references may appear inside a single value,
//! interleaved with literal text.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Compiled reference expression grammar.
pub(crate) static REFERENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@resource\(([A-Za-z0-9_.]+)\)\.([A-Za-z0-9_]+)")
        .expect("reference pattern compiles")
});

/// A single reference expression found inside an environment value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    /// Name of the environment variable the reference appears in.
    pub env_var: String,
    /// The matched expression text, exactly as written.
    pub raw: String,
    /// The referenced resource type tag.
    pub resource_type: String,
    /// The referenced output property.
    pub property: String,
}

/// Findings raised by reference validation and resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReferenceIssue {
    /// A reference names a resource type the manifest never declares.
    #[error("environment variable '{env_var}' references undeclared resource type '{resource_type}'")]
    UnknownType {
        /// Environment variable carrying the reference.
        env_var: String,
        /// The undeclared type tag.
        resource_type: String,
    },

    /// A reference survived resolution because no backend output matched.
    #[error("environment variable '{env_var}' reference '{raw}' was not resolved by any backend output")]
    Unresolved {
        /// Environment variable carrying the reference.
        env_var: String,
        /// The unresolved expression text.
        raw: String,
    },
}

/// Scans an environment map and returns every reference expression.
///
/// Order is deterministic: environment variables are visited in map order,
/// and matches within a value are reported left to right. A reference that
/// occurs twice is reported twice.
#[must_use]
pub fn extract_references(env: &BTreeMap<String, String>) -> Vec<ResourceReference> {
    let mut references = Vec::new();
    for (name, value) in env {
        for captures in REFERENCE_PATTERN.captures_iter(value) {
            let raw = captures
                .get(0)
                .expect("capture group zero always exists")
                .as_str();
            references.push(ResourceReference {
                env_var: name.clone(),
                raw: raw.to_owned(),
                resource_type: captures[1].to_owned(),
                property: captures[2].to_owned(),
            });
        }
    }
    references
}

/// Checks every reference against the manifest's declared resource types.
///
/// Collects one [`ReferenceIssue::UnknownType`] per offending reference
/// instead of stopping at the first, so a single run surfaces the full set.
#[must_use]
pub fn validate_references<'a, I>(
    references: &[ResourceReference],
    declared_types: I,
) -> Vec<ReferenceIssue>
where
    I: IntoIterator<Item = &'a str>,
{
    let declared: Vec<&str> = declared_types.into_iter().collect();
    references
        .iter()
        .filter(|reference| !declared.contains(&reference.resource_type.as_str()))
        .map(|reference| ReferenceIssue::UnknownType {
            env_var: reference.env_var.clone(),
            resource_type: reference.resource_type.clone(),
        })
        .collect()
}
