//! admit/skip decision for a single candidate block
//!
//! [is_match] decides whether a block is addressed by an [UpdateSpec] at all. For those that are,
//! [decide] applies the exclusion rules in a fixed order, first applicable rule wins:
//!
//! 1. local module references are never updated
//! 2. name matches one of `ignore_names`
//! 3. no version attribute (admitted only with force-add)
//! 4. current version is in `ignore_versions`
//! 5. `from_versions` is set and does not contain the current version
use crate::spec::{UpdateKind, UpdateSpec};
use crate::wildcard;
use serde::Serialize;

/// Read-only view of a block considered for an update
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: UpdateKind,
    /// block label or provider key, may be empty for unlabeled blocks
    pub name: String,
    /// module source or provider name
    pub source_or_key: String,
    /// provider `source` attribute, if any
    #[new(default)]
    pub provider_source: Option<String>,
    /// unquoted version text, `None` if the block has no version attribute
    pub current_version: Option<String>,
}

impl Candidate {
    pub fn with_provider_source(mut self, source: Option<String>) -> Self {
        self.provider_source = source;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Admit,
    SkipLocalReference,
    SkipIgnoredName,
    SkipIgnoredVersion,
    SkipNotInFromSet,
    SkipNoVersionAttribute,
}

impl Decision {
    pub fn is_admit(self) -> bool {
        self == Decision::Admit
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Admit => f.write_str("admitted"),
            Decision::SkipLocalReference => f.write_str("local reference has no version"),
            Decision::SkipIgnoredName => f.write_str("name is ignored"),
            Decision::SkipIgnoredVersion => f.write_str("version is ignored"),
            Decision::SkipNotInFromSet => f.write_str("version not in --from"),
            Decision::SkipNoVersionAttribute => f.write_str("no version attribute"),
        }
    }
}

/// Exact string containment, no version semantics
pub fn contains<S: AsRef<str>>(set: &[S], value: &str) -> bool {
    set.iter().any(|member| member.as_ref() == value)
}

/// Module sources pointing into the filesystem
pub fn is_local_reference(source: &str) -> bool {
    source.starts_with("./") || source.starts_with("../") || source.starts_with('/')
}

/// Does `spec` address `candidate`?
///
/// Providers are addressed by their local name or by their `source` attribute.
pub fn is_match(candidate: &Candidate, spec: &UpdateSpec) -> bool {
    if candidate.kind != spec.kind() {
        return false;
    }

    let Some(key) = spec.match_key() else {
        return true;
    };

    candidate.source_or_key == key || candidate.provider_source.as_deref() == Some(key)
}

/// Decide whether an addressed candidate gets its version rewritten
pub fn decide(candidate: &Candidate, spec: &UpdateSpec, force_add: bool) -> Decision {
    if candidate.kind == UpdateKind::Module && is_local_reference(&candidate.source_or_key) {
        return Decision::SkipLocalReference;
    }

    if !candidate.name.is_empty() && wildcard::matches_any(&candidate.name, spec.ignore_names()) {
        return Decision::SkipIgnoredName;
    }

    let Some(current) = candidate.current_version.as_deref() else {
        return if force_add {
            Decision::Admit
        } else {
            Decision::SkipNoVersionAttribute
        };
    };

    if contains(spec.ignore_versions(), current) {
        return Decision::SkipIgnoredVersion;
    }

    if !spec.from_versions().is_empty() && !contains(spec.from_versions(), current) {
        return Decision::SkipNotInFromSet;
    }

    Decision::Admit
}
