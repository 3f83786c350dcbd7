//! declarative description of a version update
use serde::Serialize;

/// The kind of version declaration an [UpdateSpec] targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// `version` attribute of a `module` block
    Module,
    /// `version` of an entry in `terraform { required_providers { ... } }`
    Provider,
    /// `required_version` attribute of a `terraform` block
    Terraform,
}

impl std::fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateKind::Module => f.write_str("module"),
            UpdateKind::Provider => f.write_str("provider"),
            UpdateKind::Terraform => f.write_str("terraform"),
        }
    }
}

/// One desired change
///
/// Versions are opaque tokens. `from_versions` and `ignore_versions` compare by exact string
/// equality, so `3.14` and `3.14.0` are different versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateSpec {
    kind: UpdateKind,
    /// module source or provider name, `None` for [UpdateKind::Terraform]
    match_key: Option<String>,
    target_version: String,
    /// only update blocks currently at one of these versions (empty: any version)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    from_versions: Vec<String>,
    /// never update blocks currently at one of these versions
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ignore_versions: Vec<String>,
    /// never update blocks whose name matches one of these wildcard patterns
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ignore_names: Vec<String>,
}

impl UpdateSpec {
    pub fn module(source: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(UpdateKind::Module, Some(source.into()), version.into())
    }

    pub fn provider(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(UpdateKind::Provider, Some(name.into()), version.into())
    }

    pub fn terraform(version: impl Into<String>) -> Self {
        Self::new(UpdateKind::Terraform, None, version.into())
    }

    fn new(kind: UpdateKind, match_key: Option<String>, target_version: String) -> Self {
        Self {
            kind,
            match_key,
            target_version,
            from_versions: Vec::new(),
            ignore_versions: Vec::new(),
            ignore_names: Vec::new(),
        }
    }

    pub fn with_from_versions(mut self, versions: Vec<String>) -> Self {
        self.from_versions = versions;
        self
    }

    pub fn with_ignore_versions(mut self, versions: Vec<String>) -> Self {
        self.ignore_versions = versions;
        self
    }

    pub fn with_ignore_names(mut self, patterns: Vec<String>) -> Self {
        self.ignore_names = patterns;
        self
    }

    pub fn kind(&self) -> UpdateKind {
        self.kind
    }

    pub fn match_key(&self) -> Option<&str> {
        self.match_key.as_deref()
    }

    pub fn target_version(&self) -> &str {
        &self.target_version
    }

    pub fn from_versions(&self) -> &[String] {
        &self.from_versions
    }

    pub fn ignore_versions(&self) -> &[String] {
        &self.ignore_versions
    }

    pub fn ignore_names(&self) -> &[String] {
        &self.ignore_names
    }
}

impl std::fmt::Display for UpdateSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.match_key {
            Some(key) => write!(f, "{} {} -> {}", self.kind, key, self.target_version),
            None => write!(f, "{} -> {}", self.kind, self.target_version),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn constructors() {
        let spec = UpdateSpec::module("org/net/aws", "5.0.0")
            .with_from_versions(vec!["3.0.0".into()])
            .with_ignore_names(vec!["legacy-*".into()]);

        assert_eq!(spec.kind(), UpdateKind::Module);
        assert_eq!(spec.match_key(), Some("org/net/aws"));
        assert_eq!(spec.target_version(), "5.0.0");
        assert_eq!(spec.from_versions(), ["3.0.0".to_string()]);
        assert!(spec.ignore_versions().is_empty());
        assert_eq!(spec.ignore_names(), ["legacy-*".to_string()]);

        assert_eq!(UpdateSpec::terraform(">= 1.5").match_key(), None);
    }

    #[test]
    fn display() {
        assert_eq!(
            UpdateSpec::provider("aws", "~> 5.0").to_string(),
            "provider aws -> ~> 5.0"
        );
        assert_eq!(UpdateSpec::terraform("1.6.0").to_string(), "terraform -> 1.6.0");
    }
}
