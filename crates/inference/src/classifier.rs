//! Classifier adapter: score, then pick the arg-max label.

use contracts::{ContractError, FeatureVector, Prediction, ScoringFunction};
use tracing::trace;

/// Index of the first maximum, scanning left to right with a strict `>`.
///
/// `None` only for an empty slice.
pub fn argmax(scores: &[f64]) -> Option<usize> {
    let first = scores.first()?;
    let (index, _) = scores
        .iter()
        .enumerate()
        .skip(1)
        .fold((0, *first), |(best_i, best), (i, &s)| {
            if s > best {
                (i, s)
            } else {
                (best_i, best)
            }
        });
    Some(index)
}

/// Score `vector` and label the result.
///
/// Scoring errors are returned unchanged.
///
/// # Errors
/// `ClassificationFailure` if the score count differs from the label count
pub async fn classify<S>(
    vector: &FeatureVector,
    scorer: &S,
    labels: &[String],
) -> Result<Prediction, ContractError>
where
    S: ScoringFunction,
{
    let scores = scorer.score(vector.values()).await?;
    if scores.len() != labels.len() {
        return Err(ContractError::classification(format!(
            "scoring function returned {} scores for {} labels",
            scores.len(),
            labels.len()
        )));
    }
    let index = argmax(&scores)
        .ok_or_else(|| ContractError::classification("no labels to choose from"))?;
    trace!(index, score = scores[index], "selected label");

    Ok(Prediction {
        label: labels[index].clone(),
        scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FnScorer;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_argmax_first_maximum() {
        assert_eq!(argmax(&[0.1, 0.9, 0.9]), Some(1));
        assert_eq!(argmax(&[2.0, 2.0]), Some(0));
        assert_eq!(argmax(&[-3.0]), Some(0));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[f64::NAN, 1.0]), Some(0));
        assert_eq!(argmax(&[0.0, f64::NAN, 1.0]), Some(2));
    }

    #[tokio::test]
    async fn test_classify_ties_go_left() {
        let scorer = FnScorer::new(|_: &[f64]| vec![0.1, 0.9, 0.9]);
        let vector = FeatureVector::new(vec!["0__mean".into()], vec![1.0]);
        let prediction = classify(&vector, &scorer, &labels(&["a", "b", "c"]))
            .await
            .unwrap();
        assert_eq!(prediction.label, "b");
        assert_eq!(prediction.scores, vec![0.1, 0.9, 0.9]);
    }

    #[tokio::test]
    async fn test_score_count_mismatch() {
        let scorer = FnScorer::new(|_: &[f64]| vec![1.0]);
        let err = classify(&FeatureVector::default(), &scorer, &labels(&["a", "b"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::ClassificationFailure { .. }));
    }

    #[tokio::test]
    async fn test_scorer_sees_values_in_order() {
        let scorer = FnScorer::new(|x: &[f64]| vec![x[0], x[1]]);
        let vector = FeatureVector::new(vec!["0__a".into(), "0__b".into()], vec![1.0, 4.0]);
        let prediction = classify(&vector, &scorer, &labels(&["first", "second"]))
            .await
            .unwrap();
        assert_eq!(prediction.label, "second");
    }
}
