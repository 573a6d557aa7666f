//! Constrained top-K selection.
//!
//! Four phases run in order over a stable score-descending ranking:
//! greedy top-K, dimension gap-fill, difficulty rebalance, bounds
//! enforcement. Ties keep the original candidate order throughout.

use crate::config::SelectionConstraints;
use crate::error::PipelineError;
use crate::model::{Difficulty, Dimension, EnrichedCandidate};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Allowed deviation per difficulty bucket before a rebuild
pub const DIFFICULTY_TOLERANCE: usize = 2;

struct Selection {
    pool: Vec<EnrichedCandidate>,
    selected: Vec<bool>,
}

impl Selection {
    fn new(mut pool: Vec<EnrichedCandidate>) -> Self {
        // sort_by is stable, so equal scores keep input order
        pool.sort_by(|a, b| b.score.total_cmp(&a.score));
        let selected = vec![false; pool.len()];
        Self { pool, selected }
    }

    fn count(&self) -> usize {
        self.selected.iter().filter(|s| **s).count()
    }

    fn count_dimension(&self, dimension: Dimension) -> usize {
        self.ranks()
            .filter(|&i| self.pool[i].dimension == dimension)
            .count()
    }

    fn count_difficulty(&self, difficulty: Difficulty) -> usize {
        self.ranks()
            .filter(|&i| self.pool[i].difficulty == difficulty)
            .count()
    }

    /// Selected ranks, best first
    fn ranks(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.pool.len()).filter(move |&i| self.selected[i])
    }

    fn greedy_top_k(&mut self, k: usize) {
        for slot in self.selected.iter_mut().take(k) {
            *slot = true;
        }
        debug!("Selector: top-{} picked {}", k, self.count());
    }

    fn fill_dimension_gaps(&mut self, minimums: &BTreeMap<Dimension, usize>) {
        for dimension in Dimension::ALL {
            let Some(&minimum) = minimums.get(&dimension) else {
                continue;
            };
            let mut have = self.count_dimension(dimension);
            if have >= minimum {
                continue;
            }

            for i in 0..self.pool.len() {
                if have >= minimum {
                    break;
                }
                if !self.selected[i] && self.pool[i].dimension == dimension {
                    self.selected[i] = true;
                    have += 1;
                }
            }

            debug!(
                "Selector: {} gap-filled to {} (minimum {})",
                dimension, have, minimum
            );
        }
    }

    /// Returns true when the selection was rebuilt
    fn rebalance_difficulty(&mut self, ratios: &BTreeMap<Difficulty, f64>) -> bool {
        if ratios.is_empty() {
            return false;
        }

        let total = self.count();
        let targets = difficulty_targets(total, ratios);

        let balanced = targets
            .iter()
            .all(|&(d, target)| self.count_difficulty(d).abs_diff(target) <= DIFFICULTY_TOLERANCE);
        if balanced {
            debug!("Selector: difficulty within tolerance, no rebalance");
            return false;
        }

        let mut rebuilt = vec![false; self.pool.len()];
        let mut count = 0;

        for &(difficulty, target) in &targets {
            let mut taken = 0;
            for (i, slot) in rebuilt.iter_mut().enumerate() {
                if count >= total || taken >= target {
                    break;
                }
                if !*slot && self.pool[i].difficulty == difficulty {
                    *slot = true;
                    taken += 1;
                    count += 1;
                }
            }
        }

        // Top up from the overall ranking
        for slot in rebuilt.iter_mut() {
            if count >= total {
                break;
            }
            if !*slot {
                *slot = true;
                count += 1;
            }
        }

        self.selected = rebuilt;
        debug!(
            "Selector: rebalanced difficulty to {:?}",
            targets
                .iter()
                .map(|(d, _)| (d.to_string(), self.count_difficulty(*d)))
                .collect::<Vec<_>>()
        );
        true
    }

    fn enforce_bounds(&mut self, constraints: &SelectionConstraints) {
        let mut count = self.count();

        if count < constraints.min_count {
            for slot in self.selected.iter_mut() {
                if count >= constraints.min_count {
                    break;
                }
                if !*slot {
                    *slot = true;
                    count += 1;
                }
            }
        }

        if count > constraints.max_count {
            self.trim(constraints.max_count, &constraints.dimension_minimums);
        }
    }

    /// Keep the best `max` items, never dropping one a dimension minimum
    /// still needs
    fn trim(&mut self, max: usize, minimums: &BTreeMap<Dimension, usize>) {
        let reserved: BTreeMap<Dimension, usize> = minimums
            .iter()
            .map(|(&d, &m)| (d, m.min(self.count_dimension(d))))
            .collect();
        let mut outstanding: usize = reserved.values().sum();
        let mut kept_per_dimension: BTreeMap<Dimension, usize> = BTreeMap::new();
        let mut kept = vec![false; self.pool.len()];
        let mut kept_total = 0;

        for i in self.ranks().collect::<Vec<_>>() {
            let dimension = self.pool[i].dimension;
            let have = kept_per_dimension.get(&dimension).copied().unwrap_or(0);
            let needed = have < reserved.get(&dimension).copied().unwrap_or(0);

            if needed {
                outstanding -= 1;
            } else if kept_total + outstanding >= max {
                continue;
            }

            kept[i] = true;
            kept_total += 1;
            *kept_per_dimension.entry(dimension).or_insert(0) += 1;
        }

        self.selected = kept;
    }

    fn into_selected(self) -> Vec<EnrichedCandidate> {
        self.pool
            .into_iter()
            .zip(self.selected)
            .filter_map(|(c, keep)| keep.then_some(c))
            .collect()
    }
}

/// Per-difficulty target counts; exact halves round to even
fn difficulty_targets(total: usize, ratios: &BTreeMap<Difficulty, f64>) -> Vec<(Difficulty, usize)> {
    Difficulty::ALL
        .iter()
        .filter_map(|d| {
            ratios
                .get(d)
                .map(|r| (*d, (total as f64 * r).round_ties_even() as usize))
        })
        .collect()
}

/// Pick the final subset, ordered by score descending
pub fn select(
    candidates: Vec<EnrichedCandidate>,
    constraints: &SelectionConstraints,
) -> Result<Vec<EnrichedCandidate>, PipelineError> {
    constraints
        .check()
        .map_err(PipelineError::ConstraintConflict)?;

    let pool_size = candidates.len();
    let mut selection = Selection::new(candidates);

    selection.greedy_top_k(constraints.target_count);
    selection.fill_dimension_gaps(&constraints.dimension_minimums);
    if selection.rebalance_difficulty(&constraints.difficulty_ratios) {
        // The rebuild ignores dimensions; restore their minimums
        selection.fill_dimension_gaps(&constraints.dimension_minimums);
    }
    selection.enforce_bounds(constraints);

    let selected = selection.into_selected();
    info!(
        "Selected {} of {} candidates (target {}, bounds {}..={})",
        selected.len(),
        pool_size,
        constraints.target_count,
        constraints.min_count,
        constraints.max_count
    );

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposer::mock::candidate;

    fn item(idx: usize, dimension: Dimension, difficulty: Difficulty, score: f64) -> EnrichedCandidate {
        EnrichedCandidate::new(
            candidate("t", &format!("candidate number {}", idx), 0.8),
            dimension,
            difficulty,
            score,
        )
    }

    fn constraints(target: usize, min: usize, max: usize) -> SelectionConstraints {
        SelectionConstraints {
            target_count: target,
            min_count: min,
            max_count: max,
            dimension_minimums: BTreeMap::new(),
            difficulty_ratios: BTreeMap::new(),
        }
    }

    #[test]
    fn test_difficulty_targets_round_half_to_even() {
        let ratios = BTreeMap::from([
            (Difficulty::Basic, 0.25),
            (Difficulty::Intermediate, 0.5),
            (Difficulty::Killer, 0.25),
        ]);

        // 18 * 0.25 = 4.5 on both ends
        assert_eq!(
            difficulty_targets(18, &ratios),
            vec![
                (Difficulty::Basic, 4),
                (Difficulty::Intermediate, 9),
                (Difficulty::Killer, 4),
            ]
        );
        assert_eq!(
            difficulty_targets(10, &ratios),
            vec![
                (Difficulty::Basic, 2),
                (Difficulty::Intermediate, 5),
                (Difficulty::Killer, 2),
            ]
        );
    }

    fn texts(items: &[EnrichedCandidate]) -> Vec<String> {
        items.iter().map(|c| c.text().to_string()).collect()
    }

    fn ratios() -> BTreeMap<Difficulty, f64> {
        BTreeMap::from([
            (Difficulty::Basic, 0.3),
            (Difficulty::Intermediate, 0.5),
            (Difficulty::Killer, 0.2),
        ])
    }

    /// 20 project/intermediate items with descending scores 5.0, 4.8, ...
    fn uniform_pool() -> Vec<EnrichedCandidate> {
        (0..20)
            .map(|i| item(i, Dimension::Project, Difficulty::Intermediate, 5.0 - i as f64 * 0.2))
            .collect()
    }

    #[test]
    fn test_greedy_top_k() {
        let mut pool = uniform_pool();
        pool.reverse();

        let out = select(pool, &constraints(10, 8, 12)).unwrap();

        assert_eq!(out.len(), 10);
        assert_eq!(out[0].text(), "candidate number 0");
        assert_eq!(out[9].text(), "candidate number 9");
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let pool: Vec<_> = (0..6)
            .map(|i| item(i, Dimension::Project, Difficulty::Intermediate, 3.0))
            .collect();

        let out = select(pool, &constraints(4, 1, 6)).unwrap();

        assert_eq!(
            texts(&out),
            vec![
                "candidate number 0",
                "candidate number 1",
                "candidate number 2",
                "candidate number 3"
            ]
        );
    }

    #[test]
    fn test_dimension_gap_fill() {
        let mut pool = uniform_pool();
        pool.push(item(100, Dimension::Reflection, Difficulty::Intermediate, 1.5));
        pool.push(item(101, Dimension::Reflection, Difficulty::Intermediate, 1.2));
        pool.push(item(102, Dimension::Reflection, Difficulty::Intermediate, 1.1));
        let mut c = constraints(10, 8, 12);
        c.dimension_minimums.insert(Dimension::Reflection, 2);

        let out = select(pool, &c).unwrap();

        assert_eq!(out.len(), 12);
        let reflections: Vec<_> = out
            .iter()
            .filter(|e| e.dimension == Dimension::Reflection)
            .map(|e| e.text().to_string())
            .collect();
        assert_eq!(reflections, vec!["candidate number 100", "candidate number 101"]);
    }

    #[test]
    fn test_minimum_beyond_availability_takes_all_available() {
        let mut pool = uniform_pool();
        pool.push(item(100, Dimension::SoftSkill, Difficulty::Intermediate, 1.0));
        let mut c = constraints(10, 8, 12);
        c.dimension_minimums.insert(Dimension::SoftSkill, 3);

        let out = select(pool, &c).unwrap();

        assert_eq!(out.iter().filter(|e| e.dimension == Dimension::SoftSkill).count(), 1);
        assert_eq!(out.len(), 11);
    }

    #[test]
    fn test_difficulty_rebalance() {
        let mut pool = uniform_pool();
        for i in 0..5 {
            pool.push(item(100 + i, Dimension::Project, Difficulty::Basic, 2.0 - i as f64 * 0.1));
            pool.push(item(200 + i, Dimension::Project, Difficulty::Killer, 1.9 - i as f64 * 0.1));
        }
        let mut c = constraints(10, 8, 12);
        c.difficulty_ratios = ratios();

        let out = select(pool, &c).unwrap();

        assert_eq!(out.len(), 10);
        let count = |d| out.iter().filter(|e| e.difficulty == d).count();
        assert_eq!(count(Difficulty::Basic), 3);
        assert_eq!(count(Difficulty::Intermediate), 5);
        assert_eq!(count(Difficulty::Killer), 2);
        // Highest-scoring members of each bucket
        assert!(out.iter().any(|e| e.text() == "candidate number 100"));
        assert!(out.iter().any(|e| e.text() == "candidate number 201"));
        assert!(!out.iter().any(|e| e.text() == "candidate number 202"));
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_rebalance_skipped_within_tolerance() {
        let mut pool = uniform_pool();
        pool[0] = item(0, Dimension::Project, Difficulty::Basic, 5.0);
        pool[1] = item(1, Dimension::Project, Difficulty::Basic, 4.8);
        pool[2] = item(2, Dimension::Project, Difficulty::Killer, 4.6);
        let mut c = constraints(10, 8, 12);
        c.difficulty_ratios = ratios();

        let out = select(pool.clone(), &c).unwrap();

        // 2 basic / 7 intermediate / 1 killer is within 2 of 3 / 5 / 2
        let expected: Vec<_> = pool[..10].iter().map(|e| e.text().to_string()).collect();
        assert_eq!(texts(&out), expected);
    }

    #[test]
    fn test_rebalance_is_idempotent() {
        let mut pool = uniform_pool();
        for i in 0..5 {
            pool.push(item(100 + i, Dimension::Foundation, Difficulty::Basic, 2.0 - i as f64 * 0.1));
            pool.push(item(200 + i, Dimension::Reflection, Difficulty::Killer, 1.9 - i as f64 * 0.1));
        }
        let mut selection = Selection::new(pool);
        selection.greedy_top_k(10);

        assert!(selection.rebalance_difficulty(&ratios()));
        let rebuilt = selection.selected.clone();

        assert!(!selection.rebalance_difficulty(&ratios()));
        assert_eq!(selection.selected, rebuilt);
    }

    #[test]
    fn test_tops_up_to_minimum() {
        let out = select(uniform_pool(), &constraints(3, 5, 8)).unwrap();
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn test_small_pool_returns_everything() {
        let pool: Vec<_> = uniform_pool().into_iter().take(4).collect();
        let out = select(pool, &constraints(10, 8, 12)).unwrap();
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_trim_keeps_dimension_minimums() {
        let mut pool = uniform_pool();
        for i in 0..3 {
            pool.push(item(100 + i, Dimension::Foundation, Difficulty::Intermediate, 1.0));
            pool.push(item(200 + i, Dimension::Reflection, Difficulty::Intermediate, 1.0));
        }
        let mut c = constraints(10, 8, 12);
        c.dimension_minimums.insert(Dimension::Foundation, 3);
        c.dimension_minimums.insert(Dimension::Reflection, 3);

        let out = select(pool, &c).unwrap();

        assert_eq!(out.len(), 12);
        assert_eq!(out.iter().filter(|e| e.dimension == Dimension::Foundation).count(), 3);
        assert_eq!(out.iter().filter(|e| e.dimension == Dimension::Reflection).count(), 3);
        // The remaining slots go to the best project items
        assert!(out.iter().any(|e| e.text() == "candidate number 5"));
        assert!(!out.iter().any(|e| e.text() == "candidate number 6"));
    }

    #[test]
    fn test_conflicting_constraints_fail_loudly() {
        let mut c = constraints(10, 8, 12);
        c.dimension_minimums.insert(Dimension::Foundation, 7);
        c.dimension_minimums.insert(Dimension::Project, 7);

        let err = select(uniform_pool(), &c).unwrap_err();

        assert!(matches!(err, PipelineError::ConstraintConflict(_)));
    }

    #[test]
    fn test_deterministic() {
        let mut pool = uniform_pool();
        for i in 0..5 {
            pool.push(item(100 + i, Dimension::SoftSkill, Difficulty::Basic, 3.0));
            pool.push(item(200 + i, Dimension::Reflection, Difficulty::Killer, 3.0));
        }
        let mut c = constraints(10, 8, 12);
        c.dimension_minimums.insert(Dimension::SoftSkill, 2);
        c.difficulty_ratios = BTreeMap::from([(Difficulty::Killer, 0.4)]);

        let a = select(pool.clone(), &c).unwrap();
        let b = select(pool, &c).unwrap();

        assert_eq!(a, b);
        assert!(a.len() >= 8 && a.len() <= 12);
    }
}
