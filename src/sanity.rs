//! Naming and notation checks over a diagram's text.
//!
//! Every finding carries a stable code. Codes are grouped by subject:
//! - `00xx` association end role names
//! - `01xx` multiplicities
//! - `02xx` attributes
//! - `03xx` operations

use std::fmt;

use crate::connector::AnchorEnd;
use crate::model::{Diagram, ElementKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SanityCode {
    /// Role name contains whitespace.
    RoleHasSpaces,
    /// Role name contains something other than ASCII letters and digits.
    RoleNotAlphanumeric,
    /// Role name does not start with a lowercase letter.
    RoleNotCamelCase,
    /// Multiplicity is not `n`, `*`, `n..m` or `n..*`.
    MalformedMultiplicity,
    /// Multiplicity range whose lower bound exceeds its upper bound.
    InvertedMultiplicity,
    /// Attribute without a `: type` part.
    AttributeMissingType,
    /// Attribute name is not a camelCase identifier.
    AttributeBadName,
    /// Operation without a parameter list.
    OperationMissingParameters,
    /// Operation name is not a camelCase identifier.
    OperationBadName,
}

impl SanityCode {
    pub fn as_str(self) -> &'static str {
        match self {
            SanityCode::RoleHasSpaces => "0001",
            SanityCode::RoleNotAlphanumeric => "0002",
            SanityCode::RoleNotCamelCase => "0003",
            SanityCode::MalformedMultiplicity => "0101",
            SanityCode::InvertedMultiplicity => "0102",
            SanityCode::AttributeMissingType => "0201",
            SanityCode::AttributeBadName => "0202",
            SanityCode::OperationMissingParameters => "0301",
            SanityCode::OperationBadName => "0302",
        }
    }

    pub fn subject(self) -> &'static str {
        match self {
            SanityCode::RoleHasSpaces
            | SanityCode::RoleNotAlphanumeric
            | SanityCode::RoleNotCamelCase => "Role",
            SanityCode::MalformedMultiplicity | SanityCode::InvertedMultiplicity => {
                "Multiplicity"
            }
            SanityCode::AttributeMissingType | SanityCode::AttributeBadName => "Attribute",
            SanityCode::OperationMissingParameters | SanityCode::OperationBadName => "Operation",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            SanityCode::RoleHasSpaces => "Element contains spaces.",
            SanityCode::RoleNotAlphanumeric => "Element contains non-alphanumeric characters.",
            SanityCode::RoleNotCamelCase => "Element is not in camelCase format.",
            SanityCode::MalformedMultiplicity => "Expected n, *, n..m or n..*.",
            SanityCode::InvertedMultiplicity => "Lower bound is greater than upper bound.",
            SanityCode::AttributeMissingType => "Attribute has no type.",
            SanityCode::AttributeBadName => "Attribute name is not a camelCase identifier.",
            SanityCode::OperationMissingParameters => "Operation has no parameter list.",
            SanityCode::OperationBadName => "Operation name is not a camelCase identifier.",
        }
    }
}

impl fmt::Display for SanityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding, tied to the element whose text caused it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{code}] {subject} `{value}`: {message}", subject = .code.subject(), message = .code.message())]
pub struct Diagnostic {
    pub element: u64,
    pub end: Option<AnchorEnd>,
    pub code: SanityCode,
    pub value: String,
}

/// Association end role names. Empty roles are fine.
pub fn check_role(value: &str) -> Vec<SanityCode> {
    let mut codes = Vec::new();
    if value.chars().any(char::is_whitespace) {
        codes.push(SanityCode::RoleHasSpaces);
    }
    if value.chars().any(|c| !c.is_ascii_alphanumeric()) {
        codes.push(SanityCode::RoleNotAlphanumeric);
    }
    if let Some(first) = value.chars().next() {
        if !first.is_ascii_lowercase() {
            codes.push(SanityCode::RoleNotCamelCase);
        }
    }
    codes
}

fn is_camel_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

fn strip_visibility(value: &str) -> &str {
    value
        .trim()
        .trim_start_matches(['+', '-', '#', '~'])
        .trim_start()
}

/// Multiplicities such as `1`, `*`, `0..1` and `1..*`. Empty means unspecified.
pub fn check_multiplicity(value: &str) -> Vec<SanityCode> {
    let value = value.trim();
    if value.is_empty() || value == "*" {
        return vec![];
    }
    let bound = |s: &str| -> Option<Option<u32>> {
        if s == "*" {
            Some(None)
        } else {
            s.parse::<u32>().ok().map(Some)
        }
    };
    match value.split_once("..") {
        None => match value.parse::<u32>() {
            Ok(_) => vec![],
            Err(_) => vec![SanityCode::MalformedMultiplicity],
        },
        Some((lower, upper)) => match (lower.parse::<u32>(), bound(upper)) {
            (Ok(lo), Some(Some(hi))) if lo > hi => vec![SanityCode::InvertedMultiplicity],
            (Ok(_), Some(_)) => vec![],
            _ => vec![SanityCode::MalformedMultiplicity],
        },
    }
}

/// Attributes written as `[visibility]name : type`.
pub fn check_attribute(value: &str) -> Vec<SanityCode> {
    let body = strip_visibility(value);
    let (name, ty) = match body.split_once(':') {
        Some((name, ty)) => (name.trim(), ty.trim()),
        None => (body, ""),
    };
    let mut codes = Vec::new();
    if !is_camel_identifier(name) {
        codes.push(SanityCode::AttributeBadName);
    }
    if ty.is_empty() {
        codes.push(SanityCode::AttributeMissingType);
    }
    codes
}

/// Operations written as `[visibility]name(params)[ : type]`.
pub fn check_operation(value: &str) -> Vec<SanityCode> {
    let body = strip_visibility(value);
    let mut codes = Vec::new();
    let Some((name, rest)) = body.split_once('(') else {
        if !is_camel_identifier(body) {
            codes.push(SanityCode::OperationBadName);
        }
        codes.push(SanityCode::OperationMissingParameters);
        return codes;
    };
    if !is_camel_identifier(name.trim()) {
        codes.push(SanityCode::OperationBadName);
    }
    if !rest.contains(')') {
        codes.push(SanityCode::OperationMissingParameters);
    }
    codes
}

/// Runs every check over the diagram, in element order.
pub fn check_diagram(diagram: &Diagram) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let mut push = |element: u64, end: Option<AnchorEnd>, codes: Vec<SanityCode>, value: &str| {
        out.extend(codes.into_iter().map(|code| Diagnostic {
            element,
            end,
            code,
            value: value.to_string(),
        }));
    };
    for element in diagram.elements() {
        match &element.kind {
            ElementKind::Class(class) => {
                for attribute in &class.attributes {
                    push(element.id, None, check_attribute(attribute), attribute);
                }
                for operation in &class.operations {
                    push(element.id, None, check_operation(operation), operation);
                }
            }
            ElementKind::Association(connector) => {
                for end in [AnchorEnd::Start, AnchorEnd::End] {
                    let label = connector.label(end);
                    push(element.id, Some(end), check_role(&label.role), &label.role);
                    push(
                        element.id,
                        Some(end),
                        check_multiplicity(&label.multiplicity),
                        &label.multiplicity,
                    );
                }
            }
        }
    }
    tracing::debug!(findings = out.len(), "sanity check finished");
    out
}
