//! a parsed terraform document
//!
//! [TfDocument] owns the [Body] of a single file. Parsing and printing go through `hcl_edit`, which
//! keeps whitespace, comments and attribute order intact, so rewriting one version value changes
//! exactly that value in the printed output.
use crate::filter::Candidate;
use crate::visit::{CandidateMut, VisitCandidatesMut, VisitMut};
use hcl_edit::structure::Body;

#[derive(Debug, Clone)]
pub struct TfDocument {
    body: Body,
}

impl TfDocument {
    pub fn parse(input: &str) -> Result<Self, hcl_edit::parser::Error> {
        let body = hcl_edit::parser::parse_body(input)?;
        Ok(Self { body })
    }

    /// All version-bearing blocks, in document order
    pub fn candidates(&mut self) -> Vec<Candidate> {
        struct Collect(Vec<Candidate>);

        impl<'c> VisitMut<CandidateMut<'c>> for Collect {
            fn visit_mut(&mut self, value: &mut CandidateMut<'c>) {
                self.0.push(value.candidate().clone());
            }
        }

        let mut collect = Collect(Vec::new());
        self.visit_candidates_mut(&mut collect);
        collect.0
    }
}

impl VisitCandidatesMut for TfDocument {
    fn visit_candidates_mut(&mut self, visitor: &mut dyn for<'c> VisitMut<CandidateMut<'c>>) {
        self.body.visit_candidates_mut(visitor);
    }
}

impl std::str::FromStr for TfDocument {
    type Err = hcl_edit::parser::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for TfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.body, f)
    }
}

/// Utility macro to create a [TfDocument]
///
/// ```
/// # use tfbump::tf_document;
/// let document = tf_document!(r#"module "vpc" { source = "org/net/aws" }"#);
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use tfbump::tf_document;
/// tf_document!("not = valid = hcl");
/// ```
#[macro_export]
macro_rules! tf_document {
    { $expr:expr } => {
        $crate::document::TfDocument::parse($expr).expect("document must parse")
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::spec::UpdateKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trip_is_lossless() {
        let input = r#"# header comment
terraform {
  required_version = ">= 1.5" // inline


  required_providers {
    aws = { source = "hashicorp/aws", version = "~> 4.0" }
  }
}

/* block
   comment */
module   "vpc"   {
  source = "org/net/aws"
}
"#;
        let document: TfDocument = input.parse().expect("document must parse");
        assert_eq!(document.to_string(), input);
    }

    #[test]
    fn candidates() {
        let mut document = tf_document!(
            r#"
module "a" {
  source  = "org/net/aws"
  version = "3.0.0"
}
module "b" {
  source  = "org/net/aws"
  version = "3.0.0"
}
"#
        );

        let candidates = document.candidates();
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.kind == UpdateKind::Module));
        assert_eq!(candidates[0].name, "a");
        assert_eq!(candidates[1].name, "b");
    }

    #[test]
    fn malformed_input_errors() {
        assert!(TfDocument::parse("module \"vpc\" {").is_err());
    }
}
