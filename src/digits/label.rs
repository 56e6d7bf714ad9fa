use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

/// Predicted class of one evaluated image, with the true class when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub predicted_label: usize,
    pub actual_label: Option<u8>,
}

impl ClassificationResult {
    pub fn is_correct(&self) -> Option<bool> {
        self.actual_label
            .map(|actual| usize::from(actual) == self.predicted_label)
    }
}

/// Index of the largest probability.
///
/// Ties go to the lowest index and NaN never wins. `None` for an empty slice
/// or one holding only NaN.
pub fn predicted_label(probabilities: &[f32]) -> Option<usize> {
    probabilities
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, &p)| match best {
            Some((_, top)) if top >= p => best,
            _ => Some((i, p)),
        })
        .map(|(i, _)| i)
}

/// Maps each probability vector to a [`ClassificationResult`], pairing it
/// with `actual[i]` when available.
///
/// Results line up one-to-one with `probabilities`; a row with no maximum
/// (empty or all NaN) is an error rather than a gap.
pub fn classify_all(
    probabilities: &[Vec<f32>],
    actual: &[u8],
) -> Result<Vec<ClassificationResult>, ClassifierError> {
    probabilities
        .iter()
        .enumerate()
        .map(|(i, probs)| {
            let predicted_label = predicted_label(probs).ok_or_else(|| {
                ClassifierError::Shape(format!("prediction {i} has no finite maximum"))
            })?;
            Ok(ClassificationResult {
                predicted_label,
                actual_label: actual.get(i).copied(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_maximum() {
        let probs = [0.1, 0.05, 0.6, 0.05, 0.05, 0.05, 0.05, 0.0, 0.0, 0.05];
        assert_eq!(predicted_label(&probs), Some(2));
    }

    #[test]
    fn ties_go_to_the_first_index() {
        assert_eq!(predicted_label(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(predicted_label(&[0.1; 10]), Some(0));
    }

    #[test]
    fn nan_and_empty() {
        assert_eq!(predicted_label(&[]), None);
        assert_eq!(predicted_label(&[f32::NAN, f32::NAN]), None);
        assert_eq!(predicted_label(&[f32::NAN, 0.1, 0.3]), Some(2));
    }

    #[test]
    fn classify_all_pairs_actual_labels() {
        let probs = vec![vec![0.9, 0.1], vec![0.3, 0.7], vec![0.5, 0.5]];
        let results = classify_all(&probs, &[0, 0]).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].is_correct(), Some(true));
        assert_eq!(results[1].is_correct(), Some(false));
        assert_eq!(results[2].actual_label, None);
        assert_eq!(results[2].predicted_label, 0);
    }

    #[test]
    fn row_without_maximum_is_an_error_not_a_gap() {
        let probs = vec![vec![f32::NAN, f32::NAN], vec![0.1, 0.9], vec![0.8, 0.2]];
        let err = classify_all(&probs, &[0, 1, 0]).unwrap_err();
        assert!(matches!(err, ClassifierError::Shape(ref msg) if msg.contains("prediction 0")));

        let probs = vec![vec![0.1, 0.9], vec![]];
        assert!(classify_all(&probs, &[1, 0]).is_err());
    }
}
