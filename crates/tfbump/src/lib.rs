//! # tfbump - rewrite terraform version declarations
//!
//! ## Introduction for developers
//!
//! Read this to understand how `tfbump` works internally.
//!
//! ### What gets rewritten
//!
//! Three kinds of version declarations are recognized:
//!
//! ```hcl
//! terraform {
//!   required_version = ">= 1.5"           # terraform version constraint
//!
//!   required_providers {
//!     aws = {
//!       source  = "hashicorp/aws"
//!       version = "~> 5.0"                # provider version
//!     }
//!     legacy = "~> 1.0"                   # provider version, pre 0.13 style
//!   }
//! }
//!
//! module "vpc" {
//!   source  = "org/net/aws"
//!   version = "3.0.0"                     # module version
//! }
//! ```
//!
//! Modules are identified by `source`, providers by their key (`aws`) or their `source`. Modules with
//! a local `source` (`./`, `../`, `/`) have no version and are never touched.
//!
//! ### Loading files
//!
//! Files are found with a glob pattern ([discovery::find_files]) and each one is parsed into a
//! [document::TfDocument]. Parsing and printing go through [hcl_edit], which keeps comments and
//! whitespace, so the printed document differs from the input only in the rewritten values.
//!
//! ### Deciding
//!
//! An [spec::UpdateSpec] says which blocks to look at and which version to write. It comes from the
//! command line or from a [batch::Batch] file.
//!
//! For each spec the document is walked once ([visit::VisitCandidatesMut]). Every version-bearing
//! block is offered to [filter::is_match] and, if it matches, [filter::decide] applies the
//! exclusion rules:
//!
//! | **rule**                          | **result**               |
//! |-----------------------------------|--------------------------|
//! | local module source               | `SkipLocalReference`     |
//! | name matches an ignore pattern    | `SkipIgnoredName`        |
//! | no version attribute              | `SkipNoVersionAttribute` |
//! | version in `ignore_versions`      | `SkipIgnoredVersion`     |
//! | version not in `from_versions`    | `SkipNotInFromSet`       |
//! | otherwise                         | `Admit`                  |
//!
//! The first rule that applies wins. Ignore patterns use [wildcard::matches]. Versions are compared
//! as plain strings.
//!
//! ### Writing
//!
//! [update::Updater] rewrites admitted blocks and writes a file back only if a value actually
//! changed ([files::write_preserving_permissions]). A file that fails to load or write is reported
//! and the remaining files are still processed.
//!
pub mod batch;
pub mod discovery;
pub mod document;
pub mod files;
pub mod filter;
pub mod spec;
pub mod update;
pub mod visit;
pub mod wildcard;
