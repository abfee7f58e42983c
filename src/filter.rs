//! Composable accept/reject predicates.
//!
//! ```rust
//! use mobius::filter::{And, Filter, Not, RegexFilter};
//!
//! // skip the Git index, keep C sources
//! let sources: And<str> = And::new()
//!     .with(Not::new(RegexFilter::new(r"\.git").unwrap()))
//!     .with(RegexFilter::new(r"\.c$").unwrap());
//! assert!(sources.filter("a/b.c").unwrap());
//! assert!(!sources.filter(".git/a/b.c").unwrap());
//! ```

use std::fmt;

use regex::Regex;

use crate::{Error, Result};

/// Decides whether an item passes.
pub trait Filter<T: ?Sized> {
    fn filter(&self, item: &T) -> Result<bool>;
}

/// A boxed filter, as held by the list combinators.
pub type BoxFilter<T> = Box<dyn Filter<T> + Send + Sync>;

impl<T: ?Sized, F: Filter<T> + ?Sized> Filter<T> for Box<F> {
    fn filter(&self, item: &T) -> Result<bool> {
        (**self).filter(item)
    }
}

// ============================================================================
// Leaves
// ============================================================================

/// A closure as a filter.
pub struct FnFilter<F>(pub F);

impl<T: ?Sized, F> Filter<T> for FnFilter<F>
where
    F: Fn(&T) -> Result<bool>,
{
    fn filter(&self, item: &T) -> Result<bool> {
        (self.0)(item)
    }
}

/// Passes items whose text contains a match for the pattern.
#[derive(Debug, Clone)]
pub struct RegexFilter {
    regex: Regex,
}

impl RegexFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::FilterError(e.to_string()))?;
        Ok(Self { regex })
    }
}

impl From<Regex> for RegexFilter {
    fn from(regex: Regex) -> Self {
        Self { regex }
    }
}

impl<T: AsRef<str> + ?Sized> Filter<T> for RegexFilter {
    fn filter(&self, item: &T) -> Result<bool> {
        Ok(self.regex.is_match(item.as_ref()))
    }
}

// ============================================================================
// Combinators
// ============================================================================

/// Inverts its inner filter. Errors pass through unchanged.
pub struct Not<F>(F);

impl<F> Not<F> {
    pub fn new(inner: F) -> Self {
        Not(inner)
    }
}

impl<T: ?Sized, F: Filter<T>> Filter<T> for Not<F> {
    fn filter(&self, item: &T) -> Result<bool> {
        self.0.filter(item).map(|pass| !pass)
    }
}

macro_rules! list_filter {
    ($(#[$doc:meta])* $name:ident, $label:literal, $on_hit:expr, $hit:expr, $default:expr) => {
        $(#[$doc])*
        pub struct $name<T: ?Sized> {
            list: Vec<BoxFilter<T>>,
        }

        impl<T: ?Sized> $name<T> {
            pub fn new() -> Self {
                Self { list: Vec::new() }
            }

            pub fn with(mut self, filter: impl Filter<T> + Send + Sync + 'static) -> Self {
                self.list.push(Box::new(filter));
                self
            }

            pub fn push(&mut self, filter: BoxFilter<T>) {
                self.list.push(filter);
            }

            pub fn len(&self) -> usize {
                self.list.len()
            }

            pub fn is_empty(&self) -> bool {
                self.list.is_empty()
            }
        }

        impl<T: ?Sized> Default for $name<T> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<T: ?Sized> FromIterator<BoxFilter<T>> for $name<T> {
            fn from_iter<I: IntoIterator<Item = BoxFilter<T>>>(iter: I) -> Self {
                Self { list: iter.into_iter().collect() }
            }
        }

        impl<T: ?Sized> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({} filters)", $label, self.list.len())
            }
        }

        impl<T: ?Sized> Filter<T> for $name<T> {
            fn filter(&self, item: &T) -> Result<bool> {
                for filter in &self.list {
                    let pass = filter
                        .filter(item)
                        .map_err(|e| Error::FilterError(format!("{} filter: {e}", $label)))?;
                    if pass == $hit {
                        return Ok($on_hit);
                    }
                }
                Ok($default)
            }
        }
    };
}

list_filter!(
    /// Passes if any filter passes. Empty rejects.
    Or, "or", true, true, false
);
list_filter!(
    /// Passes if every filter passes. Empty accepts.
    And, "and", false, false, true
);
list_filter!(
    /// Passes if no filter passes. Empty accepts.
    Nor, "nor", false, true, true
);

#[cfg(test)]
mod tests {
    use super::*;

    fn regexes<L: FromIterator<BoxFilter<str>>>(patterns: &[&str]) -> L {
        patterns
            .iter()
            .map(|p| Box::new(RegexFilter::new(p).unwrap()) as BoxFilter<str>)
            .collect()
    }

    fn failing() -> FnFilter<impl Fn(&str) -> Result<bool>> {
        FnFilter(|_: &str| Err(Error::FilterError("boom".into())))
    }

    #[test]
    fn test_or() {
        let any: Or<str> = regexes(&["not item", "item"]);
        assert!(any.filter("item").unwrap());
        let none: Or<str> = regexes(&["not item 1", "not item 2"]);
        assert!(!none.filter("item").unwrap());
        assert!(!Or::<str>::new().filter("item").unwrap());
    }

    #[test]
    fn test_nor() {
        let any: Nor<str> = regexes(&["not item", "item"]);
        assert!(!any.filter("item").unwrap());
        let none: Nor<str> = regexes(&["not item 1", "not item 2"]);
        assert!(none.filter("item").unwrap());
    }

    #[test]
    fn test_and() {
        let all: And<str> = regexes(&["it", "em"]);
        assert!(all.filter("item").unwrap());
        let some: And<str> = regexes(&["item", "not"]);
        assert!(!some.filter("item").unwrap());
        assert!(And::<str>::new().filter("item").unwrap());
    }

    #[test]
    fn test_not() {
        let re = RegexFilter::new("item").unwrap();
        assert!(!Not::new(re.clone()).filter("item").unwrap());
        assert!(Not::new(re).filter("other").unwrap());
    }

    #[test]
    fn test_fn_filter() {
        let short = FnFilter(|s: &str| Ok::<_, Error>(s.len() < 3));
        assert!(short.filter("ab").unwrap());
        assert!(!short.filter("abc").unwrap());
    }

    #[test]
    fn test_errors_are_wrapped_and_stop_evaluation() {
        let or = Or::<str>::new().with(failing()).with(RegexFilter::new("x").unwrap());
        let err = or.filter("x").unwrap_err();
        assert!(err.to_string().contains("or filter: "), "{err}");

        let nested = And::<str>::new().with(Or::<str>::new().with(failing()));
        let err = nested.filter("x").unwrap_err();
        assert!(err.to_string().contains("and filter: "), "{err}");
        assert!(err.to_string().contains("or filter: "), "{err}");

        assert!(Not::new(failing()).filter("x").is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(RegexFilter::new("("), Err(Error::FilterError(_))));
    }
}
