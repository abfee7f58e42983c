//! Path compiler: slash-separated text → directory traversal.
//!
//! ```text
//! "a/../b/./c"  ──segments──▶  Child(a) Parent Child(b) Stay Child(c)
//!               ──compile───▶  in(<fs:dir>).has(<fs:name>, "a")
//!                              .out(<fs:dir>)
//!                              .in(<fs:dir>).has(<fs:name>, "b")
//!                              .in(<fs:dir>).has(<fs:name>, "c")
//! ```
//!
//! Empty segments (leading, trailing or doubled `/`) behave like `.`.

use std::fmt;

use crate::model::Value;
use crate::traversal::Traversal;
use super::{DIR, NAME};

/// Step to the directory entry named `name`.
pub fn child(name: &str) -> Traversal {
    Traversal::new()
        .incoming(Value::iri(DIR))
        .has(Value::iri(NAME), [Value::from(name)])
}

/// Step to the containing directory.
pub fn parent() -> Traversal {
    Traversal::new().out(Value::iri(DIR))
}

// ============================================================================
// Segment
// ============================================================================

/// One component of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// `.` or empty
    Stay,
    /// `..`
    Parent,
    Child(&'a str),
}

impl<'a> Segment<'a> {
    pub fn parse(s: &'a str) -> Self {
        match s {
            "" | "." => Segment::Stay,
            ".." => Segment::Parent,
            name => Segment::Child(name),
        }
    }

    pub fn traversal(&self) -> Traversal {
        match self {
            Segment::Stay => Traversal::new(),
            Segment::Parent => parent(),
            Segment::Child(name) => child(name),
        }
    }
}

// ============================================================================
// Path
// ============================================================================

/// A slash-separated path, relative to the filesystem root.
///
/// Stateless: compiling the same text twice yields equal traversals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(String);

impl Path {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment<'_>> {
        self.0.split('/').map(Segment::parse)
    }

    /// Compile to a traversal that starts at the directory the path is
    /// relative to.
    pub fn compile(&self) -> Traversal {
        self.segments()
            .fold(Traversal::new(), |t, seg| t.follow(&seg.traversal()))
    }

    /// The same path walked backwards: from the target towards the start.
    pub fn compile_reverse(&self) -> Traversal {
        self.compile().reverse()
    }

    /// Split off the last significant (not empty, not `.`) segment.
    ///
    /// Returns `None` when the path has no significant segment, i.e. it
    /// denotes the directory it is relative to.
    pub fn split_last(&self) -> Option<(Path, &str)> {
        let s = self.0.as_str();
        let mut end = s.len();
        loop {
            let start = s[..end].rfind('/').map_or(0, |i| i + 1);
            let seg = &s[start..end];
            if !seg.is_empty() && seg != "." {
                let prefix = s[..start].trim_end_matches('/');
                let prefix = if prefix.is_empty() { "." } else { prefix };
                return Some((Path::new(prefix), seg));
            }
            if start == 0 {
                return None;
            }
            end = start - 1;
        }
    }

    /// Containing path; `"."` for single-segment paths.
    pub fn up(&self) -> Path {
        self.split_last().map_or_else(|| Path::new("."), |(up, _)| up)
    }

    /// Final significant segment; `"."` when there is none.
    pub fn base(&self) -> &str {
        self.split_last().map_or(".", |(_, base)| base)
    }

    pub fn down(&self, name: &str) -> Path {
        if self.split_last().is_none() {
            Path::new(name)
        } else {
            Path::new(format!("{}/{name}", self.0.trim_end_matches('/')))
        }
    }

    /// Lexical normal form: `.` and empty segments dropped, `..` cancels the
    /// preceding named segment. `"."` when nothing remains.
    pub fn normalize(&self) -> Path {
        let mut out: Vec<&str> = Vec::new();
        for seg in self.segments() {
            match seg {
                Segment::Stay => {}
                Segment::Parent => match out.last() {
                    Some(last) if *last != ".." => { out.pop(); }
                    _ => out.push(".."),
                },
                Segment::Child(name) => out.push(name),
            }
        }
        if out.is_empty() {
            Path::new(".")
        } else {
            Path::new(out.join("/"))
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self { Path::new(s) }
}

impl From<String> for Path {
    fn from(s: String) -> Self { Path(s) }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_segments() {
        let path = Path::new("/a/./../b//");
        let segs: Vec<Segment<'_>> = path.segments().collect();
        assert_eq!(segs, vec![
            Segment::Stay,
            Segment::Child("a"),
            Segment::Stay,
            Segment::Parent,
            Segment::Child("b"),
            Segment::Stay,
            Segment::Stay,
        ]);
    }

    #[test]
    fn test_compile_shapes() {
        assert!(Path::new("").compile().is_identity());
        assert!(Path::new(".").compile().is_identity());
        assert!(Path::new("./").compile().is_identity());
        assert_eq!(Path::new("..").compile(), parent());
        assert_eq!(Path::new("a").compile(), child("a"));
        assert_eq!(Path::new("a/../b").compile(), child("a").follow(&parent()).follow(&child("b")));
    }

    #[test]
    fn test_compile_reverse_goes_up() {
        let r = Path::new("a/b").compile_reverse();
        assert_eq!(r.reverse(), Path::new("a/b").compile());
        // name filters come first, then the step to the parent
        assert_eq!(r.to_string(), "has(<fs:name>, \"b\").out(<fs:dir>).has(<fs:name>, \"a\").out(<fs:dir>)");
    }

    #[test]
    fn test_up_and_base() {
        let cases = [
            ("a", ".", "a"),
            ("a/b", "a", "b"),
            ("a/b/", "a", "b"),
            (".a/b/c.d", ".a/b", "c.d"),
            ("a/./", ".", "a"),
            ("a/..", "a", ".."),
            ("/a", ".", "a"),
            ("", ".", "."),
            (".", ".", "."),
        ];
        for (path, up, base) in cases {
            let p = Path::new(path);
            assert_eq!(p.up().as_str(), up, "up({path:?})");
            assert_eq!(p.base(), base, "base({path:?})");
        }
    }

    #[test]
    fn test_down() {
        assert_eq!(Path::new(".").down("a").as_str(), "a");
        assert_eq!(Path::new("a/").down("b").as_str(), "a/b");
        assert_eq!(Path::new("a").down("b").up(), Path::new("a"));
    }

    #[test]
    fn test_normalize() {
        let cases = [
            ("a/b", "a/b"),
            ("./a//b/", "a/b"),
            ("a/../b", "b"),
            ("a/b/../../c", "c"),
            ("../a", "../a"),
            ("a/../..", ".."),
            ("", "."),
            ("a/..", "."),
        ];
        for (path, normal) in cases {
            assert_eq!(Path::new(path).normalize().as_str(), normal, "normalize({path:?})");
        }
    }

    fn segment() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(".".to_string()),
            Just("..".to_string()),
            Just(String::new()),
            "[a-z.]{1,4}",
        ]
    }

    proptest! {
        #[test]
        fn prop_compile_is_composition(segs in prop::collection::vec(segment(), 0..6)) {
            let whole = Path::new(segs.join("/")).compile();
            let composed = segs
                .iter()
                .fold(Traversal::new(), |t, s| t.follow(&Path::new(s.as_str()).compile()));
            prop_assert_eq!(whole, composed);
        }

        #[test]
        fn prop_compile_is_deterministic(s in "[a-z./]{0,12}") {
            prop_assert_eq!(Path::new(s.as_str()).compile(), Path::new(s.as_str()).compile());
        }

        #[test]
        fn prop_normalize_is_idempotent(s in "[a-z./]{0,12}") {
            let once = Path::new(s.as_str()).normalize();
            prop_assert_eq!(once.normalize(), once);
        }
    }
}
