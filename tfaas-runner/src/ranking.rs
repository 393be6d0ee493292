//! Label ranking.

use tfaas_common::LabelResult;

use crate::error::{Error, Result};

/// Pair labels with probabilities and order them by descending probability.
///
/// Pairing stops at the shorter of the two inputs. The sort is stable, so
/// equal probabilities keep label order.
pub fn rank_all(labels: &[String], probabilities: &[f32]) -> Vec<LabelResult> {
    let mut results: Vec<LabelResult> = labels
        .iter()
        .zip(probabilities)
        .map(|(label, &probability)| LabelResult {
            label: label.clone(),
            probability,
        })
        .collect();

    results.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    results
}

/// The `top_n` most probable labels.
///
/// Fails with [`Error::Bounds`] when `top_n` is zero or larger than the
/// number of paired results.
pub fn rank(labels: &[String], probabilities: &[f32], top_n: usize) -> Result<Vec<LabelResult>> {
    let mut results = rank_all(labels, probabilities);
    if top_n == 0 || top_n > results.len() {
        return Err(Error::Bounds {
            requested: top_n,
            available: results.len(),
        });
    }
    results.truncate(top_n);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn pairs(results: &[LabelResult]) -> Vec<(&str, f32)> {
        results
            .iter()
            .map(|r| (r.label.as_str(), r.probability))
            .collect()
    }

    #[test]
    fn test_rank_top_two() {
        let results = rank(&labels(&["cat", "dog", "fish"]), &[0.2, 0.7, 0.1], 2).unwrap();
        assert_eq!(pairs(&results), vec![("dog", 0.7), ("cat", 0.2)]);
    }

    #[test]
    fn test_rank_ties_keep_label_order() {
        let results = rank(&labels(&["a", "b"]), &[0.5, 0.5], 2).unwrap();
        assert_eq!(pairs(&results), vec![("a", 0.5), ("b", 0.5)]);

        let results = rank_all(&labels(&["a", "b", "c", "d"]), &[0.1, 0.3, 0.3, 0.3]);
        assert_eq!(
            pairs(&results),
            vec![("b", 0.3), ("c", 0.3), ("d", 0.3), ("a", 0.1)]
        );
    }

    #[test]
    fn test_extra_probabilities_ignored() {
        let results = rank_all(&labels(&["a", "b"]), &[0.1, 0.2, 0.9, 0.8]);
        assert_eq!(pairs(&results), vec![("b", 0.2), ("a", 0.1)]);
    }

    #[test]
    fn test_fewer_probabilities_than_labels() {
        let results = rank_all(&labels(&["a", "b", "c"]), &[0.4]);
        assert_eq!(pairs(&results), vec![("a", 0.4)]);
    }

    #[test]
    fn test_top_n_out_of_bounds() {
        let err = rank(&labels(&["a", "b"]), &[0.1, 0.2], 3).unwrap_err();
        assert!(matches!(
            err,
            Error::Bounds {
                requested: 3,
                available: 2
            }
        ));

        let err = rank(&labels(&["a"]), &[0.1], 0).unwrap_err();
        assert!(matches!(err, Error::Bounds { requested: 0, .. }));
    }

    #[test]
    fn test_nan_does_not_panic() {
        let results = rank_all(&labels(&["a", "b", "c"]), &[f32::NAN, 0.5, 0.2]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[1].label, "b");
        assert_eq!(results[2].label, "c");
    }
}
