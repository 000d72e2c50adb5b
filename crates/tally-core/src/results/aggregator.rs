use super::snapshot::ResultsSnapshot;
use crate::choices::ChoiceCatalog;

/// One bar of the results chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    pub choice_id: &'static str,
    pub label: &'static str,
    pub count: u64,
    /// Width relative to the leading choice, in `[0, 100]`.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultsView {
    pub rows: Vec<BarRow>,
    pub total: u64,
    pub max: u64,
}

impl ResultsView {
    pub fn row(&self, choice_id: &str) -> Option<&BarRow> {
        self.rows.iter().find(|r| r.choice_id == choice_id)
    }

    pub fn percentage_of(&self, choice_id: &str) -> f64 {
        self.row(choice_id).map(|r| r.percentage).unwrap_or(0.0)
    }
}

pub fn percentage(count: u64, max: u64) -> f64 {
    if max == 0 {
        return 0.0;
    }
    (count as f64 / max as f64 * 100.0).clamp(0.0, 100.0)
}

/// Normalizes a snapshot into display rows.
///
/// Total and maximum run over every entry of the snapshot; rows only exist
/// for catalog choices, and a choice missing from the snapshot counts zero.
pub fn aggregate(snapshot: &ResultsSnapshot, catalog: &ChoiceCatalog) -> ResultsView {
    let (total, max) = snapshot
        .tallies()
        .fold((0u64, 0u64), |(total, max), t| {
            (total.saturating_add(t.count), max.max(t.count))
        });

    let rows = catalog
        .iter()
        .map(|choice| {
            let count = snapshot.count(choice.id);
            BarRow {
                choice_id: choice.id,
                label: choice.label,
                count,
                percentage: percentage(count, max),
            }
        })
        .collect();

    ResultsView { rows, total, max }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<ResultsSnapshot> {
        vec![
            ResultsSnapshot::from_counts([("print", 3), ("stare", 7)]),
            ResultsSnapshot::from_counts([("ai", 1)]),
            ResultsSnapshot::from_counts([
                ("print", 12),
                ("stare", 12),
                ("ai", 40),
                ("revert", 0),
                ("restart", 39),
            ]),
            ResultsSnapshot::from_counts([("print", 1), ("stare", 2), ("ai", 3), ("revert", 5)]),
            ResultsSnapshot::from_counts([("restart", u32::MAX as u64), ("ai", 1)]),
        ]
    }

    #[test]
    fn test_total_is_sum_of_counts() {
        let catalog = ChoiceCatalog::default();
        for snapshot in samples() {
            let view = aggregate(&snapshot, &catalog);
            let sum: u64 = snapshot.tallies().map(|t| t.count).sum();
            assert_eq!(view.total, sum);
        }
    }

    #[test]
    fn test_percentages_bounded_and_leader_full() {
        let catalog = ChoiceCatalog::default();
        for snapshot in samples() {
            let view = aggregate(&snapshot, &catalog);
            for row in &view.rows {
                assert!((0.0..=100.0).contains(&row.percentage), "{:?}", row);
            }
            let leader = view.rows.iter().max_by_key(|r| r.count).unwrap();
            assert_eq!(leader.percentage, 100.0);
        }
    }

    #[test]
    fn test_all_zero_has_no_division() {
        let catalog = ChoiceCatalog::default();
        for snapshot in [
            ResultsSnapshot::default(),
            ResultsSnapshot::from_counts([("print", 0), ("ai", 0)]),
        ] {
            let view = aggregate(&snapshot, &catalog);
            assert_eq!(view.total, 0);
            assert_eq!(view.rows.len(), catalog.len());
            assert!(view.rows.iter().all(|r| r.percentage == 0.0));
        }
    }

    #[test]
    fn test_relative_to_max() {
        let view = aggregate(
            &ResultsSnapshot::from_counts([("print", 3), ("stare", 7)]),
            &ChoiceCatalog::default(),
        );
        assert_eq!(view.total, 10);
        assert_eq!(view.percentage_of("stare"), 100.0);
        assert!((view.percentage_of("print") - 42.857).abs() < 0.01);
        assert_eq!(view.percentage_of("ai"), 0.0);
    }

    #[test]
    fn test_unknown_keys_have_no_row() {
        let view = aggregate(
            &ResultsSnapshot::from_counts([("ai", 2), ("emacs", 9)]),
            &ChoiceCatalog::default(),
        );
        assert!(view.row("emacs").is_none());
        assert_eq!(view.rows.len(), 5);
        assert_eq!(view.total, 11);
    }
}
