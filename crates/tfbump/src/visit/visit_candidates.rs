use super::VisitMut;
use crate::filter::Candidate;
use crate::spec::UpdateKind;
use hcl_edit::expr::{Expression, Object, ObjectKey, ObjectValue, ObjectValueTerminator};
use hcl_edit::structure::{Attribute, Block, Body};
use hcl_edit::{Decor, Decorate, Decorated, Ident};

/// A version-bearing block, paired with write access to its version
pub struct CandidateMut<'a> {
    candidate: Candidate,
    slot: Slot<'a>,
}

enum Slot<'a> {
    /// attribute `key` of a block body (`module.version`, `terraform.required_version`)
    Attribute { body: &'a mut Body, key: &'static str },
    /// value of a `required_providers` entry, either an object or a legacy constraint string
    Provider(&'a mut Expression),
}

impl<'a> CandidateMut<'a> {
    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    /// Sets the version, creating the attribute if it does not exist yet
    ///
    /// Returns false if the version already had this exact value
    pub fn set_version(&mut self, version: &str) -> bool {
        let changed = match &mut self.slot {
            Slot::Attribute { body, key } => set_attribute(body, *key, version),
            Slot::Provider(Expression::Object(object)) => set_object_version(object, version),
            Slot::Provider(expr) => set_expression(expr, version),
        };

        if changed {
            self.candidate.current_version = Some(version.to_owned());
        }

        changed
    }
}

/// Visit all version-bearing blocks in document order
pub trait VisitCandidatesMut {
    fn visit_candidates_mut(&mut self, visitor: &mut dyn for<'c> VisitMut<CandidateMut<'c>>);
}

impl VisitCandidatesMut for Body {
    fn visit_candidates_mut(&mut self, visitor: &mut dyn for<'c> VisitMut<CandidateMut<'c>>) {
        for block in self.blocks_mut() {
            match block.ident.value().as_str() {
                "module" => visit_module(block, visitor),
                "terraform" => visit_terraform(block, visitor),
                _ => {}
            }
        }
    }
}

fn visit_module(block: &mut Block, visitor: &mut dyn for<'c> VisitMut<CandidateMut<'c>>) {
    let name = block
        .labels
        .first()
        .map(|label| label.as_str().to_owned())
        .unwrap_or_default();
    let source = attribute_text(&block.body, "source").unwrap_or_default();
    let version = attribute_text(&block.body, "version");

    let mut candidate = CandidateMut {
        candidate: Candidate::new(UpdateKind::Module, name, source, version),
        slot: Slot::Attribute {
            body: &mut block.body,
            key: "version",
        },
    };
    visitor.visit_mut(&mut candidate);
}

fn visit_terraform(block: &mut Block, visitor: &mut dyn for<'c> VisitMut<CandidateMut<'c>>) {
    let version = attribute_text(&block.body, "required_version");
    let mut candidate = CandidateMut {
        candidate: Candidate::new(
            UpdateKind::Terraform,
            "terraform".to_owned(),
            String::new(),
            version,
        ),
        slot: Slot::Attribute {
            body: &mut block.body,
            key: "required_version",
        },
    };
    visitor.visit_mut(&mut candidate);

    for providers in block.body.get_blocks_mut("required_providers") {
        for mut entry in providers.body.attributes_mut() {
            let name = entry.key.value().as_str().to_owned();
            let value = entry.value_mut();

            let (source, version) = match &*value {
                Expression::Object(object) => (
                    object_text(object, "source"),
                    object_text(object, "version"),
                ),
                Expression::String(constraint) => (None, Some(constraint.value().clone())),
                _ => {
                    tracing::debug!(provider = %name, "unsupported required_providers entry");
                    continue;
                }
            };

            let mut candidate = CandidateMut {
                candidate: Candidate::new(UpdateKind::Provider, name.clone(), name, version)
                    .with_provider_source(source),
                slot: Slot::Provider(value),
            };
            visitor.visit_mut(&mut candidate);
        }
    }
}

/// Unquoted text of an expression
pub(crate) fn expression_text(expr: &Expression) -> String {
    match expr {
        Expression::String(value) => value.value().clone(),
        other => other.to_string().trim().trim_matches('"').to_owned(),
    }
}

fn attribute_text(body: &Body, key: &str) -> Option<String> {
    body.get_attribute(key)
        .map(|attribute| expression_text(&attribute.value))
}

fn object_key_str(key: &ObjectKey) -> Option<&str> {
    match key {
        ObjectKey::Ident(ident) => Some(ident.value().as_str()),
        ObjectKey::Expression(Expression::String(value)) => Some(value.value().as_str()),
        ObjectKey::Expression(_) => None,
    }
}

fn find_object_key(object: &Object, key: &str) -> Option<ObjectKey> {
    object
        .iter()
        .find(|(object_key, _)| object_key_str(object_key) == Some(key))
        .map(|(object_key, _)| object_key.clone())
}

fn object_text(object: &Object, key: &str) -> Option<String> {
    object
        .iter()
        .find(|(object_key, _)| object_key_str(object_key) == Some(key))
        .map(|(_, value)| expression_text(value.expr()))
}

/// Replaces a value, keeping the whitespace and comments around it
fn set_expression(expr: &mut Expression, version: &str) -> bool {
    if let Expression::String(current) = expr {
        if current.value().as_str() == version {
            return false;
        }

        *current.value_mut() = version.to_owned();
        return true;
    }

    let decor = expr.decor().clone();
    let mut replacement = Expression::from(version);
    *replacement.decor_mut() = decor;
    *expr = replacement;
    true
}

fn set_attribute(body: &mut Body, key: &'static str, version: &str) -> bool {
    if let Some(mut attribute) = body.get_attribute_mut(key) {
        return set_expression(attribute.value_mut(), version);
    }

    tracing::debug!(key, "adding missing attribute");
    insert_attribute(body, Attribute::new(Ident::new(key), version));
    true
}

/// Inserts `attribute` right after `source`, or first, indented like its siblings
fn insert_attribute(body: &mut Body, mut attribute: Attribute) {
    // `{ source = "x" }` cannot hold a second attribute
    if body.prefer_oneline() {
        body.set_prefer_oneline(false);
        for index in 0..body.len() {
            if let Some(structure) = body.get_mut(index) {
                *structure.decor_mut() = Decor::new(INDENT, "");
            }
        }
    }

    let indent = body
        .iter()
        .find_map(|structure| indentation(structure.decor()))
        .unwrap_or_else(|| INDENT.to_owned());
    attribute.decor_mut().set_prefix(indent);

    let index = body
        .iter()
        .position(|structure| {
            structure
                .as_attribute()
                .is_some_and(|attribute| attribute.key.as_str() == "source")
        })
        .map_or(0, |source| source + 1);
    body.insert(index, attribute);
}

const INDENT: &str = "  ";

/// Whitespace after the last line break of a prefix
fn indentation(decor: &Decor) -> Option<String> {
    let prefix = decor.prefix()?;
    let line = prefix.rsplit('\n').next().unwrap_or_default();
    line.chars()
        .all(char::is_whitespace)
        .then(|| line.to_owned())
}

fn set_object_version(object: &mut Object, version: &str) -> bool {
    if let Some(key) = find_object_key(object, "version") {
        return match object.get_mut(&key) {
            Some(value) => set_expression(value.expr_mut(), version),
            None => false,
        };
    }

    tracing::debug!("adding missing provider version");

    let mut key = Decorated::new(Ident::new("version"));
    let mut value = ObjectValue::new(version);
    value.set_terminator(ObjectValueTerminator::None);

    if let Some(last_key) = object.iter().last().map(|(key, _)| key.clone()) {
        if let Some(last) = object.get_mut(&last_key) {
            value.set_assignment(last.assignment());

            match last.terminator() {
                ObjectValueTerminator::Newline => {
                    value.set_terminator(ObjectValueTerminator::Newline);
                    if let Some(indent) = indentation(last_key.decor()) {
                        key.decor_mut().set_prefix(indent);
                    }
                }
                terminator => {
                    // the new entry takes over the space before `}`
                    if terminator == ObjectValueTerminator::None {
                        let decor = last.expr_mut().decor_mut();
                        if let Some(suffix) = decor.suffix().cloned() {
                            value.expr_mut().decor_mut().set_suffix(suffix);
                        }
                        decor.set_suffix("");
                        last.set_terminator(ObjectValueTerminator::Comma);
                    } else {
                        value.set_terminator(terminator);
                    }

                    if let Some(prefix) = last_key.decor().prefix().cloned() {
                        key.decor_mut().set_prefix(prefix);
                    }
                }
            }
        }
    }

    object.insert(ObjectKey::Ident(key), value);
    true
}
