//! Reference traversal evaluator.
//!
//! Works against any `StorageBackend` using only its primitive triple
//! lookups, so a backend gets evaluation for free and may override
//! `StorageBackend::evaluate` when it can do better.

use hashbrown::HashSet;
use tracing::trace;

use crate::context::Context;
use crate::model::{Direction, Value};
use crate::storage::StorageBackend;
use crate::Result;
use super::{Query, Step};

/// Evaluate `query` against `backend`.
///
/// Unconstrained queries (no seeds) start from every node in the store.
/// Results are de-duplicated and keep first-seen order.
pub fn evaluate<B>(backend: &B, ctx: &Context, query: &Query) -> Result<Vec<Value>>
where
    B: StorageBackend + ?Sized,
{
    ctx.check()?;
    let start = if query.is_unconstrained() {
        backend.all_nodes(ctx)?
    } else {
        let mut seeds = Unique::default();
        seeds.extend(query.seeds.iter().cloned());
        seeds.into_vec()
    };
    let result = run(backend, ctx, query.traversal.steps(), start)?;
    trace!(
        traversal = %query.traversal,
        seeds = query.seeds.len(),
        results = result.len(),
        "evaluated traversal"
    );
    Ok(result)
}

fn run<B>(backend: &B, ctx: &Context, steps: &[Step], mut current: Vec<Value>) -> Result<Vec<Value>>
where
    B: StorageBackend + ?Sized,
{
    for step in steps {
        if current.is_empty() {
            break;
        }
        ctx.check()?;
        current = apply(backend, ctx, step, current)?;
    }
    Ok(current)
}

fn apply<B>(backend: &B, ctx: &Context, step: &Step, current: Vec<Value>) -> Result<Vec<Value>>
where
    B: StorageBackend + ?Sized,
{
    match step {
        Step::Expand { dir, predicate } => {
            let mut out = Unique::default();
            for node in &current {
                for triple in backend.triples(ctx, node, *dir, predicate.as_ref())? {
                    if let Some(next) = triple.target(node, *dir) {
                        out.push(next.clone());
                    }
                }
            }
            Ok(out.into_vec())
        }

        Step::Has { predicate, values } => {
            let mut out = Vec::with_capacity(current.len());
            for node in current {
                let triples = backend.triples(ctx, &node, Direction::Outgoing, Some(predicate))?;
                if triples.iter().any(|t| values.contains(&t.object)) {
                    out.push(node);
                }
            }
            Ok(out)
        }

        Step::Is(values) => Ok(current.into_iter().filter(|n| values.contains(n)).collect()),

        Step::Recursive { body, depth } => {
            let (min, max) = depth.bounds(backend.max_traversal_depth());
            let mut seen: HashSet<Value> = current.iter().cloned().collect();
            let mut out = Vec::new();
            if min == 0 {
                out.extend(current.iter().cloned());
            }

            // Level by level, so results come out nearest first.
            let mut frontier = current;
            for level in 1..=max {
                let reached = run(backend, ctx, body.steps(), frontier)?;
                let fresh: Vec<Value> = reached
                    .into_iter()
                    .filter(|n| seen.insert(n.clone()))
                    .collect();
                if fresh.is_empty() {
                    break;
                }
                if level >= min {
                    out.extend(fresh.iter().cloned());
                }
                frontier = fresh;
            }
            Ok(out)
        }
    }
}

/// Order-preserving set.
#[derive(Default)]
struct Unique {
    seen: HashSet<Value>,
    items: Vec<Value>,
}

impl Unique {
    fn push(&mut self, v: Value) {
        if self.seen.insert(v.clone()) {
            self.items.push(v);
        }
    }

    fn extend(&mut self, it: impl IntoIterator<Item = Value>) {
        for v in it {
            self.push(v);
        }
    }

    fn into_vec(self) -> Vec<Value> {
        self.items
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancelToken;
    use crate::model::Triple;
    use crate::storage::{ExpandDepth, MemoryBackend};
    use crate::traversal::Traversal;
    use crate::Error;

    fn next() -> Value {
        Value::iri("next")
    }

    fn n(s: &str) -> Value {
        Value::from(s)
    }

    /// 1 → 2 → 3 → 4, plus 1 -[tag]-> "x"
    fn chain() -> MemoryBackend {
        let db = MemoryBackend::new();
        let ctx = Context::background();
        db.insert(&ctx, &[
            Triple::new(n("1"), next(), n("2")),
            Triple::new(n("2"), next(), n("3")),
            Triple::new(n("3"), next(), n("4")),
            Triple::new(n("1"), Value::iri("tag"), n("x")),
        ]).unwrap();
        db
    }

    #[test]
    fn test_unconstrained_starts_from_all_nodes() {
        let db = chain();
        let ctx = Context::background();
        let all = evaluate(&db, &ctx, &Query::all()).unwrap();
        assert_eq!(all, vec![n("1"), n("2"), n("3"), n("4"), n("x")]);
    }

    #[test]
    fn test_expand_out_and_in() {
        let db = chain();
        let ctx = Context::background();
        let q = Query::from_nodes([n("2")]).follow(&Traversal::new().out(next()));
        assert_eq!(evaluate(&db, &ctx, &q).unwrap(), vec![n("3")]);

        let q = Query::from_nodes([n("2")]).follow(&Traversal::new().incoming(next()));
        assert_eq!(evaluate(&db, &ctx, &q).unwrap(), vec![n("1")]);

        let q = Query::from_nodes([n("1")]).follow(&Traversal::new().out_any());
        assert_eq!(evaluate(&db, &ctx, &q).unwrap(), vec![n("2"), n("x")]);
    }

    #[test]
    fn test_has_and_is_filter() {
        let db = chain();
        let ctx = Context::background();
        let q = Query::all().follow(&Traversal::new().has(Value::iri("tag"), [n("x")]));
        assert_eq!(evaluate(&db, &ctx, &q).unwrap(), vec![n("1")]);

        let q = Query::from_nodes([n("1")]).follow(&Traversal::new().out(next()).is([n("3")]));
        assert!(evaluate(&db, &ctx, &q).unwrap().is_empty());
    }

    #[test]
    fn test_recursive_nearest_first() {
        let db = chain();
        let ctx = Context::background();
        let up = Traversal::new().recursive(Traversal::new().out(next()), ExpandDepth::Unbounded);
        let q = Query::from_nodes([n("1")]).follow(&up);
        assert_eq!(evaluate(&db, &ctx, &q).unwrap(), vec![n("2"), n("3"), n("4")]);

        let two = Traversal::new().recursive(Traversal::new().out(next()), ExpandDepth::Range { min: 2, max: 2 });
        let q = Query::from_nodes([n("1")]).follow(&two);
        assert_eq!(evaluate(&db, &ctx, &q).unwrap(), vec![n("3")]);
    }

    #[test]
    fn test_recursive_terminates_on_cycle() {
        let db = MemoryBackend::new();
        let ctx = Context::background();
        db.insert(&ctx, &[
            Triple::new(n("8"), next(), n("9")),
            Triple::new(n("9"), next(), n("8")),
        ]).unwrap();
        let t = Traversal::new().recursive(Traversal::new().out(next()), ExpandDepth::Unbounded);
        let got = evaluate(&db, &ctx, &Query::from_nodes([n("8")]).follow(&t)).unwrap();
        assert_eq!(got, vec![n("9")]);
    }

    #[test]
    fn test_seeds_are_deduplicated() {
        let db = chain();
        let ctx = Context::background();
        let q = Query::from_nodes([n("1"), n("1")]).follow(&Traversal::new().out(next()));
        assert_eq!(evaluate(&db, &ctx, &q).unwrap(), vec![n("2")]);
    }

    #[test]
    fn test_cancelled_context_fails() {
        let db = chain();
        let token = CancelToken::new();
        token.cancel();
        let ctx = Context::with_cancel(token);
        let result = evaluate(&db, &ctx, &Query::all());
        assert!(matches!(result, Err(Error::StorageError(_))));
    }
}
