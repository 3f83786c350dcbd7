//! apply [UpdateSpec]s to documents and files
//!
//! Every file goes through `loaded → scanned → unchanged | written`:
//!
//! - loaded: the file is read and parsed. Failures end processing of this file only.
//! - scanned: each spec walks the document once, in the order the specs were given. A block
//!   admitted by several specs ends up with the version of the last one.
//! - written: at least one version changed. The document is written back unless this is a dry run.
use crate::document::TfDocument;
use crate::files::{self, FileError};
use crate::filter::{self, Decision};
use crate::spec::{UpdateKind, UpdateSpec};
use crate::visit::{CandidateMut, VisitCandidatesMut, VisitMut};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// decide and report, but never write
    pub dry_run: bool,
    /// add a version attribute to matching blocks that have none
    pub force_add: bool,
}

/// A version that was (or in a dry run, would be) rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub kind: UpdateKind,
    pub name: String,
    /// previous version, `None` if the attribute was added
    pub from: Option<String>,
    pub to: String,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let from = self.from.as_deref().unwrap_or("(none)");
        match self.kind {
            UpdateKind::Terraform => write!(f, "terraform required_version: {from} -> {}", self.to),
            kind => write!(f, "{kind} {}: {from} -> {}", self.name, self.to),
        }
    }
}

/// A matching block that was left alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skip {
    pub kind: UpdateKind,
    pub name: String,
    pub reason: Decision,
    pub version: Option<String>,
}

impl std::fmt::Display for Skip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.name, self.reason)?;
        if let Some(version) = &self.version {
            write!(f, " ({version})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentOutcome {
    pub changed: bool,
    pub actions: Vec<Action>,
    pub skips: Vec<Skip>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// true if at least one version changed, even in a dry run
    pub changed: bool,
    /// true if the file was written to disk
    pub written: bool,
    pub actions: Vec<Action>,
    pub skips: Vec<Skip>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub files: Vec<FileReport>,
    pub errors: Vec<FileError>,
}

impl RunReport {
    pub fn changed_files(&self) -> usize {
        self.files.iter().filter(|file| file.changed).count()
    }

    pub fn action_count(&self) -> usize {
        self.files.iter().map(|file| file.actions.len()).sum()
    }
}

#[derive(derive_new::new, Debug, Clone)]
pub struct Updater {
    specs: Vec<UpdateSpec>,
    options: UpdateOptions,
}

impl Updater {
    /// Applies all specs to an in-memory document
    pub fn update_document(&self, document: &mut TfDocument) -> DocumentOutcome {
        let mut outcome = DocumentOutcome::default();

        for spec in &self.specs {
            let mut applier = SpecApplier::new(spec, self.options.force_add, &mut outcome);
            document.visit_candidates_mut(&mut applier);
        }

        outcome
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn update_file(&self, path: &Path) -> Result<FileReport, FileError> {
        let contents = files::read(path)?;
        let mut document = TfDocument::parse(&contents).map_err(|source| FileError::Parse {
            path: path.to_owned(),
            source,
        })?;

        let outcome = self.update_document(&mut document);

        let written = outcome.changed && !self.options.dry_run;
        if written {
            files::write_preserving_permissions(path, &document.to_string())?;
        } else if outcome.changed {
            tracing::info!(path = %path.display(), "dry run, not writing");
        }

        Ok(FileReport {
            path: path.to_owned(),
            changed: outcome.changed,
            written,
            actions: outcome.actions,
            skips: outcome.skips,
        })
    }

    /// Processes files one after another. A failing file does not stop the others.
    pub fn update_files<P: AsRef<Path>>(&self, paths: &[P]) -> RunReport {
        let mut report = RunReport::default();

        for path in paths {
            match self.update_file(path.as_ref()) {
                Ok(file) => report.files.push(file),
                Err(error) => {
                    tracing::warn!(%error, "skipping file");
                    report.errors.push(error);
                }
            }
        }

        report
    }
}

#[derive(derive_new::new)]
struct SpecApplier<'s> {
    spec: &'s UpdateSpec,
    force_add: bool,
    outcome: &'s mut DocumentOutcome,
}

impl<'s, 'c> VisitMut<CandidateMut<'c>> for SpecApplier<'s> {
    fn visit_mut(&mut self, value: &mut CandidateMut<'c>) {
        let candidate = value.candidate();
        if !filter::is_match(candidate, self.spec) {
            return;
        }

        let decision = filter::decide(candidate, self.spec, self.force_add);
        tracing::debug!(
            kind = %candidate.kind,
            name = %candidate.name,
            version = ?candidate.current_version,
            %decision,
            "decided"
        );

        if !decision.is_admit() {
            self.outcome.skips.push(Skip {
                kind: candidate.kind,
                name: candidate.name.clone(),
                reason: decision,
                version: candidate.current_version.clone(),
            });
            return;
        }

        let from = candidate.current_version.clone();
        let kind = candidate.kind;
        let name = candidate.name.clone();

        if value.set_version(self.spec.target_version()) {
            self.outcome.changed = true;
            self.outcome.actions.push(Action {
                kind,
                name,
                from,
                to: self.spec.target_version().to_owned(),
            });
        }
    }
}
