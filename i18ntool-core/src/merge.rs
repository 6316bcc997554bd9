//! Reconciliation engine: bring a target collection in line with the source.
//!
//! Presence-only and one-way. A target unit whose id vanished from the source
//! is dropped (or kept when `remove_unused_ids` is off); a target unit with no
//! `<target>` receives the source text as a placeholder. Existing targets are
//! never rewritten, even when the source text changed.

use crate::types::{MergeResult, TranslationUnit, UnitCollection};

/// Apply the merge policy to `target` in place.
///
/// Every decision is keyed by id, so the result does not depend on iteration
/// order. Units that exist only in `source` are not inserted; see
/// [`propagate_new_units`] for that.
pub fn merge(
    source: &UnitCollection,
    target: &mut UnitCollection,
    remove_unused_ids: bool,
) -> MergeResult {
    let mut result = MergeResult::default();

    target.retain(|unit| match source.get(&unit.id) {
        None if remove_unused_ids => {
            result.removed += 1;
            false
        }
        None => true,
        Some(canonical) => {
            if unit.target.is_none() {
                unit.target = Some(canonical.source.clone());
                result.added += 1;
            }
            true
        }
    });

    tracing::debug!(
        added = result.added,
        removed = result.removed,
        "merged target collection"
    );
    result
}

/// Append every source unit missing from `target`, with the source text as
/// its target. Returns the number of units appended.
///
/// Opt-in companion to [`merge`]; appended units carry no markup and are laid
/// out by the serializer.
pub fn propagate_new_units(source: &UnitCollection, target: &mut UnitCollection) -> usize {
    let missing: Vec<TranslationUnit> = source
        .iter()
        .filter(|unit| !target.contains(&unit.id))
        .map(|unit| {
            TranslationUnit::new(unit.id.clone(), unit.source.clone())
                .with_target(unit.source.clone())
        })
        .collect();

    let count = missing.len();
    for unit in missing {
        target.insert(unit);
    }
    count
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn src(pairs: &[(&str, &str)]) -> UnitCollection {
        pairs
            .iter()
            .map(|(id, text)| TranslationUnit::new(*id, *text))
            .collect()
    }

    fn tgt(entries: &[(&str, &str, Option<&str>)]) -> UnitCollection {
        entries
            .iter()
            .map(|(id, source, target)| {
                let unit = TranslationUnit::new(*id, *source);
                match target {
                    Some(t) => unit.with_target(*t),
                    None => unit,
                }
            })
            .collect()
    }

    fn scenario_target() -> UnitCollection {
        tgt(&[
            ("u1", "Hello", Some("Bonjour")),
            ("u3", "Old", Some("Vieux")),
        ])
    }

    #[test]
    fn scenario_a_removes_unused_and_keeps_translation() {
        let source = src(&[("u1", "Hello"), ("u2", "World")]);
        let mut target = scenario_target();

        let result = merge(&source, &mut target, true);

        assert_eq!(result, MergeResult { added: 0, removed: 1 });
        assert_eq!(target.ids().collect::<Vec<_>>(), vec!["u1"]);
        assert_eq!(target.get("u1").and_then(|u| u.target.as_deref()), Some("Bonjour"));
        assert!(!target.contains("u2"), "source-only units are not injected");
    }

    #[test]
    fn scenario_b_retains_unused_when_disabled() {
        let source = src(&[("u1", "Hello"), ("u2", "World")]);
        let mut target = scenario_target();

        let result = merge(&source, &mut target, false);

        assert_eq!(result, MergeResult { added: 0, removed: 0 });
        assert_eq!(target, scenario_target());
    }

    #[test]
    fn scenario_c_empty_target_is_not_absent() {
        let source = src(&[("u1", "Hello")]);
        let mut target = tgt(&[("u1", "Hello", Some(""))]);

        let result = merge(&source, &mut target, true);

        assert!(result.is_noop());
        assert_eq!(target.get("u1").and_then(|u| u.target.as_deref()), Some(""));
    }

    #[test]
    fn missing_target_gets_source_placeholder() {
        let source = src(&[("u1", "Hello <x id=\"INTERPOLATION\"/>")]);
        let mut target = tgt(&[("u1", "stale source text", None)]);

        let result = merge(&source, &mut target, true);

        assert_eq!(result.added, 1);
        assert_eq!(
            target.get("u1").and_then(|u| u.target.as_deref()),
            Some("Hello <x id=\"INTERPOLATION\"/>")
        );
    }

    #[test]
    fn changed_source_text_never_overwrites_translation() {
        let source = src(&[("u1", "Hello there")]);
        let mut target = tgt(&[("u1", "Hello", Some("Bonjour"))]);

        merge(&source, &mut target, true);

        assert_eq!(target.get("u1").and_then(|u| u.target.as_deref()), Some("Bonjour"));
    }

    #[rstest]
    #[case(true, 0, 0)]
    #[case(false, 2, 0)]
    fn empty_source(#[case] remove: bool, #[case] remaining: usize, #[case] added: usize) {
        let source = UnitCollection::new();
        let mut target = scenario_target();

        let result = merge(&source, &mut target, remove);

        assert_eq!(target.len(), remaining);
        assert_eq!(result.added, added);
        assert_eq!(result.removed, 2 - remaining);
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn empty_target_is_noop(#[case] remove: bool) {
        let source = src(&[("u1", "Hello")]);
        let mut target = UnitCollection::new();

        let result = merge(&source, &mut target, remove);

        assert!(result.is_noop());
        assert!(target.is_empty());
    }

    #[test]
    fn second_merge_is_idempotent() {
        let source = src(&[("a", "A"), ("b", "B"), ("c", "C")]);
        let mut target = tgt(&[
            ("a", "A", None),
            ("x", "X", Some("ex")),
            ("b", "B", Some("bee")),
            ("c", "C", None),
        ]);

        let first = merge(&source, &mut target, true);
        let snapshot = target.clone();
        let second = merge(&source, &mut target, true);

        assert_eq!(first, MergeResult { added: 2, removed: 1 });
        assert!(second.is_noop());
        assert_eq!(target, snapshot);
    }

    #[test]
    fn merge_preserves_relative_order() {
        let source = src(&[("c", "C"), ("a", "A")]);
        let mut target = tgt(&[("a", "A", None), ("gone", "G", None), ("c", "C", None)]);

        merge(&source, &mut target, true);

        assert_eq!(target.ids().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn propagate_appends_only_missing_units() {
        let source = src(&[("u1", "Hello"), ("u2", "World")]);
        let mut target = tgt(&[("u1", "Hello", Some("Bonjour"))]);

        let appended = propagate_new_units(&source, &mut target);

        assert_eq!(appended, 1);
        assert_eq!(target.ids().collect::<Vec<_>>(), vec!["u1", "u2"]);
        assert_eq!(target.get("u1").and_then(|u| u.target.as_deref()), Some("Bonjour"));
        assert_eq!(target.get("u2").and_then(|u| u.target.as_deref()), Some("World"));
    }
}
