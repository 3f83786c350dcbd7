//! batch update files
//!
//! A batch file lists many updates at once:
//!
//! ```yaml
//! files: "**/*.tf"
//! force_add: false
//! modules:
//!   - source: org/net/aws
//!     version: 5.0.0
//!     from: 3.0.0            # a single version or a list
//!     ignore_versions: [4.0.0]
//!     ignore_names: ["legacy-*"]
//! providers:
//!   - name: aws
//!     version: "~> 5.0"
//! terraform:
//!   version: ">= 1.5"
//! ```
//!
//! Loading is all or nothing: any invalid entry rejects the whole batch, so nothing is written
//! for a batch that is only partially valid.
use crate::spec::UpdateSpec;
use serde::de::value::{MapAccessDeserializer, StringDeserializer};
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::marker::PhantomData;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("unable to read batch file {}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid batch file")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{section}[{index}]: missing required field `{field}`")]
    MissingField {
        section: &'static str,
        index: usize,
        field: &'static str,
    },
    #[error("batch file contains no updates")]
    Empty,
}

/// A validated batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// file pattern, if the batch names one
    pub files: Option<String>,
    pub force_add: bool,
    pub specs: Vec<UpdateSpec>,
}

impl Batch {
    pub fn load(path: &Path) -> Result<Self, BatchError> {
        tracing::info!(path = %path.display(), "loading batch file");
        let contents = std::fs::read_to_string(path).map_err(|source| BatchError::Io {
            path: path.to_owned(),
            source,
        })?;
        contents.parse()
    }
}

impl std::str::FromStr for Batch {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: RawBatch = serde_yaml::from_str(s)?;
        raw.validate()
    }
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawBatch {
    #[serde(default)]
    files: Option<String>,
    #[serde(default)]
    force_add: bool,
    #[serde(default)]
    modules: Vec<RawModule>,
    #[serde(default)]
    providers: Vec<RawProvider>,
    #[serde(default)]
    terraform: OneOrMany<RawTerraform>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawModule {
    source: Option<String>,
    version: Option<String>,
    #[serde(default)]
    from: OneOrMany<String>,
    #[serde(default)]
    ignore_versions: OneOrMany<String>,
    #[serde(default)]
    ignore_names: OneOrMany<String>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawProvider {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    from: OneOrMany<String>,
    #[serde(default)]
    ignore_versions: OneOrMany<String>,
    #[serde(default)]
    ignore_names: OneOrMany<String>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawTerraform {
    version: Option<String>,
    #[serde(default)]
    from: OneOrMany<String>,
    #[serde(default)]
    ignore_versions: OneOrMany<String>,
}

/// A field that accepts a single value or a list of values
///
/// Strings and list entries keep their text as written, so `from: [3.10]` stays `3.10`. A lone
/// unquoted number is read by YAML as a number first: `from: 3.10` becomes `3.1`.
#[derive(Debug)]
struct OneOrMany<T>(Vec<T>);

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany(Vec::new())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OneOrMany<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OneOrManyVisitor(PhantomData))
    }
}

struct OneOrManyVisitor<T>(PhantomData<T>);

impl<T> OneOrManyVisitor<T> {
    fn text<'de, E: de::Error>(self, text: String) -> Result<OneOrMany<T>, E>
    where
        T: Deserialize<'de>,
    {
        T::deserialize(StringDeserializer::<E>::new(text)).map(|value| OneOrMany(vec![value]))
    }
}

impl<'de, T: Deserialize<'de>> Visitor<'de> for OneOrManyVisitor<T> {
    type Value = OneOrMany<T>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a single value or a list of values")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(OneOrMany::default())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        self.text(v.to_owned())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        self.text(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        self.text(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.text(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.text(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        let text = serde_yaml::Number::from(v).to_string();
        tracing::warn!(
            value = %text,
            "unquoted number in batch file, quote it to keep trailing zeros"
        );
        self.text(text)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(value) = seq.next_element()? {
            values.push(value);
        }
        Ok(OneOrMany(values))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        T::deserialize(MapAccessDeserializer::new(map)).map(|value| OneOrMany(vec![value]))
    }
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl OneOrMany<String> {
    /// trimmed, blank entries dropped
    fn into_strings(self) -> Vec<String> {
        self.into_vec()
            .into_iter()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .collect()
    }
}

fn required(
    value: Option<String>,
    section: &'static str,
    index: usize,
    field: &'static str,
) -> Result<String, BatchError> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or(BatchError::MissingField {
            section,
            index,
            field,
        })
}

fn with_filters(
    spec: UpdateSpec,
    from: OneOrMany<String>,
    ignore_versions: OneOrMany<String>,
    ignore_names: OneOrMany<String>,
) -> UpdateSpec {
    spec.with_from_versions(from.into_strings())
        .with_ignore_versions(ignore_versions.into_strings())
        .with_ignore_names(ignore_names.into_strings())
}

impl RawBatch {
    fn validate(self) -> Result<Batch, BatchError> {
        let mut specs = vec![];

        for (index, module) in self.modules.into_iter().enumerate() {
            let source = required(module.source, "modules", index, "source")?;
            let version = required(module.version, "modules", index, "version")?;
            specs.push(with_filters(
                UpdateSpec::module(source, version),
                module.from,
                module.ignore_versions,
                module.ignore_names,
            ));
        }

        for (index, provider) in self.providers.into_iter().enumerate() {
            let name = required(provider.name, "providers", index, "name")?;
            let version = required(provider.version, "providers", index, "version")?;
            specs.push(with_filters(
                UpdateSpec::provider(name, version),
                provider.from,
                provider.ignore_versions,
                provider.ignore_names,
            ));
        }

        for (index, terraform) in self.terraform.into_vec().into_iter().enumerate() {
            let version = required(terraform.version, "terraform", index, "version")?;
            specs.push(with_filters(
                UpdateSpec::terraform(version),
                terraform.from,
                terraform.ignore_versions,
                OneOrMany::default(),
            ));
        }

        if specs.is_empty() {
            return Err(BatchError::Empty);
        }

        let files = self
            .files
            .map(|files| files.trim().to_owned())
            .filter(|files| !files.is_empty());

        Ok(Batch {
            files,
            force_add: self.force_add,
            specs,
        })
    }
}
