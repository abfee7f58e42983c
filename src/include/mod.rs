//! # Include Resolver
//!
//! Classifies C preprocessor `#include` directives and resolves their
//! targets against a search path of directories in the virtual filesystem.
//!
//! | Directive | Kind | Path |
//! |-----------|------|------|
//! | `#include "a/b.h"` | `User` | `a/b.h` |
//! | `#include <a/b.h>` | `System` | `a/b.h` |
//! | `#include <a/b.h> x` | `Invalid` | |
//! | `#include <>` | `Invalid` | |
//!
//! Leading spaces and tabs are allowed; anything else after the closing
//! delimiter invalidates the directive.
//!
//! Resolved includes become `inc:depends` edges from the including file to
//! the included one. [`depends_rule`] is the Adjacency Rule over those edges,
//! so include cycles can be found with [`crate::adapter::cycles`].

pub mod resolve;

use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::model::Value;
use crate::traversal::Traversal;
use crate::{Error, Result};

pub use resolve::{link_dependencies, resolve, search_path};

/// Dependency predicate (including file → included file).
pub const DEPENDS: &str = "inc:depends";

const INCLUDE_PATTERN: &str = r#"^\s*#include\s+(?:"(?P<user>.+)"|<(?P<system>.+)>)\s*$"#;

fn include_regex() -> &'static Regex {
    static INCLUDE_REGEX: OnceLock<Regex> = OnceLock::new();
    INCLUDE_REGEX.get_or_init(|| Regex::new(INCLUDE_PATTERN).expect("include pattern is valid"))
}

/// Step from a file to the files it includes.
pub fn depends_rule() -> Traversal {
    Traversal::new().out(Value::iri(DEPENDS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeKind {
    /// `#include "…"`
    User,
    /// `#include <…>`
    System,
    Invalid,
}

/// One directive line, as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Include(String);

impl Include {
    /// Wrap a line without validating it.
    pub fn new(line: impl Into<String>) -> Self {
        Include(line.into())
    }

    /// Wrap a line, rejecting it unless it is a well-formed directive.
    pub fn parse(line: impl Into<String>) -> Result<Self> {
        let include = Include(line.into());
        if include.is_valid() {
            Ok(include)
        } else {
            Err(Error::InvalidInclude(include.0))
        }
    }

    /// Every line of `source` that starts (after indentation) with `#include`.
    ///
    /// Malformed directives are kept; they fail later, in `path()`.
    pub fn scan(source: &str) -> Vec<Include> {
        source
            .lines()
            .filter(|line| line.trim_start().starts_with("#include"))
            .map(Include::new)
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn captures(&self) -> Option<Captures<'_>> {
        include_regex().captures(&self.0)
    }

    pub fn kind(&self) -> IncludeKind {
        match self.captures() {
            Some(c) if c.name("user").is_some() => IncludeKind::User,
            Some(_) => IncludeKind::System,
            None => IncludeKind::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.kind() != IncludeKind::Invalid
    }

    pub fn is_user(&self) -> bool {
        self.kind() == IncludeKind::User
    }

    pub fn is_system(&self) -> bool {
        self.kind() == IncludeKind::System
    }

    /// The quoted or bracketed target path.
    pub fn path(&self) -> Result<&str> {
        self.captures()
            .and_then(|c| c.name("user").or_else(|| c.name("system")))
            .map(|m| m.as_str())
            .ok_or_else(|| Error::NoPathFound(self.0.clone()))
    }
}

impl fmt::Display for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Include {
    fn from(s: &str) -> Self {
        Include::new(s)
    }
}
