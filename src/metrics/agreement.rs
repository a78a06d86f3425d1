use crate::parsing::{Dataset, PredictionColumn};
use ndarray::{s, ArrayView1};

/// Windows with fewer rows than this are too noisy to report
pub const MIN_WINDOW_SAMPLES: usize = 5;

/// Result of comparing every (liked, disliked) pair
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Agreement {
    pub correct: u64,
    pub total: u64,
    pub rate: f64,
}

/// Fraction of (liked, disliked) pairs where the model scores the liked sample strictly higher.
/// Rows rated neither 0 nor 1 take no part. A column the dataset lacks yields zero pairs.
pub fn pairwise_agreement(dataset: &Dataset, column: PredictionColumn) -> Agreement {
    match dataset.prediction(column) {
        Some(prediction) => agreement_of(dataset.rating.view(), prediction),
        None => Agreement::default(),
    }
}

/// Pairwise agreement over the trailing `window` rows ending at each row.
/// NaN marks rows whose window has fewer than five rows or no mixed pair.
pub fn rolling_pairwise_agreement(
    dataset: &Dataset,
    column: PredictionColumn,
    window: usize,
) -> Vec<f64> {
    let prediction = match dataset.prediction(column) {
        Some(prediction) => prediction,
        None => return vec![f64::NAN; dataset.len()],
    };

    (0..dataset.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            if i + 1 - start < MIN_WINDOW_SAMPLES {
                return f64::NAN;
            }

            let agreement = agreement_of(
                dataset.rating.slice(s![start..=i]),
                prediction.slice(s![start..=i]),
            );
            match agreement.total {
                0 => f64::NAN,
                _ => agreement.rate,
            }
        })
        .collect()
}

fn agreement_of(rating: ArrayView1<f64>, prediction: ArrayView1<f64>) -> Agreement {
    let scores_rated = |target: f64| -> Vec<f64> {
        rating
            .iter()
            .zip(prediction.iter())
            .filter(|(r, _)| **r == target)
            .map(|(_, p)| *p)
            .collect()
    };
    let liked = scores_rated(1.0);
    let disliked = scores_rated(0.0);

    let total = (liked.len() * disliked.len()) as u64;
    if total == 0 {
        return Agreement::default();
    }

    // Ties count against the model
    let correct = liked
        .iter()
        .map(|&l| disliked.iter().filter(|&&d| l > d).count() as u64)
        .sum::<u64>();

    Agreement {
        correct,
        total,
        rate: correct as f64 / total as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::tests::legacy_dataset;
    use ndarray::Array1;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const LEGACY: PredictionColumn = PredictionColumn::Legacy;

    #[test]
    fn perfect_ranking() {
        let dataset = legacy_dataset(
            &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0],
            &[0.9, 0.1, 0.8, 0.2, 0.7, 0.3],
        );

        let agreement = pairwise_agreement(&dataset, LEGACY);
        assert_eq!(
            agreement,
            Agreement {
                correct: 9,
                total: 9,
                rate: 1.0
            }
        );
    }

    #[test]
    fn ties_count_as_incorrect() {
        let dataset = legacy_dataset(&[1.0, 0.0, 0.0], &[0.5, 0.5, 0.2]);

        let agreement = pairwise_agreement(&dataset, LEGACY);
        assert_eq!(agreement.correct, 1);
        assert_eq!(agreement.total, 2);
        assert_eq!(agreement.rate, 0.5);
    }

    #[test]
    fn unknown_ratings_are_excluded() {
        let dataset = legacy_dataset(&[1.0, 0.5, 0.0], &[0.6, 0.9, 0.1]);

        let agreement = pairwise_agreement(&dataset, LEGACY);
        assert_eq!(agreement.total, 1);
        assert_eq!(agreement.correct, 1);
    }

    #[test]
    fn one_sided_dataset_has_no_pairs() {
        let dataset = legacy_dataset(&[1.0, 1.0], &[0.6, 0.9]);
        assert_eq!(pairwise_agreement(&dataset, LEGACY), Agreement::default());

        let empty = legacy_dataset(&[], &[]);
        assert_eq!(pairwise_agreement(&empty, LEGACY), Agreement::default());
    }

    #[test]
    fn absent_column_has_no_pairs() {
        let dataset = legacy_dataset(&[1.0, 0.0], &[0.6, 0.1]);
        assert_eq!(
            pairwise_agreement(&dataset, PredictionColumn::Audio),
            Agreement::default()
        );
    }

    #[test]
    fn random_datasets_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(17);

        for _ in 0..50 {
            let len = rng.gen_range(0..40);
            let ratings: Vec<f64> = (0..len)
                .map(|_| [0.0, 1.0, 0.5][rng.gen_range(0..3)])
                .collect();
            let predictions: Vec<f64> = (0..len).map(|_| rng.gen_range(0.0..1.0)).collect();
            let dataset = legacy_dataset(&ratings, &predictions);

            let liked = ratings.iter().filter(|r| **r == 1.0).count() as u64;
            let disliked = ratings.iter().filter(|r| **r == 0.0).count() as u64;
            let agreement = pairwise_agreement(&dataset, LEGACY);

            assert_eq!(agreement.total, liked * disliked);
            assert!(agreement.correct <= agreement.total);
            assert!((0.0..=1.0).contains(&agreement.rate));
        }
    }

    #[test]
    fn negated_scores_invert_the_rate() {
        let mut rng = StdRng::seed_from_u64(3);
        let ratings: Vec<f64> = (0..30).map(|i| (i % 2) as f64).collect();
        // Distinct scores, so there are no ties
        let predictions: Vec<f64> = (0..30)
            .map(|i| i as f64 + rng.gen_range(0.0..0.5))
            .collect();
        let negated: Vec<f64> = predictions.iter().map(|p| -p).collect();

        let forward = pairwise_agreement(&legacy_dataset(&ratings, &predictions), LEGACY);
        let backward = pairwise_agreement(&legacy_dataset(&ratings, &negated), LEGACY);

        assert!(forward.total > 0);
        assert_eq!(forward.correct + backward.correct, forward.total);
        assert!((forward.rate - (1.0 - backward.rate)).abs() < 1e-12);
    }

    #[test]
    fn rolling_length_and_ramp_up() {
        let dataset = legacy_dataset(
            &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
            &[0.9, 0.1, 0.8, 0.2, 0.1, 0.3, 0.7],
        );

        let rolling = rolling_pairwise_agreement(&dataset, LEGACY, 50);
        assert_eq!(rolling.len(), dataset.len());
        assert!(rolling[..4].iter().all(|v| v.is_nan()));

        for (i, value) in rolling.iter().enumerate().skip(4) {
            let direct = pairwise_agreement(&dataset.slice(0, i + 1), LEGACY);
            assert_eq!(*value, direct.rate);
        }
    }

    #[test]
    fn rolling_window_matches_direct_sub_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let ratings: Vec<f64> = (0..60).map(|_| rng.gen_range(0..2) as f64).collect();
        let predictions: Vec<f64> = (0..60).map(|_| rng.gen_range(0.0..1.0)).collect();
        let dataset = legacy_dataset(&ratings, &predictions);
        let window = 8;

        let rolling = rolling_pairwise_agreement(&dataset, LEGACY, window);
        for (i, value) in rolling.iter().enumerate() {
            let start = (i + 1).saturating_sub(window);
            let direct = pairwise_agreement(&dataset.slice(start, i + 1), LEGACY);

            if i + 1 - start < MIN_WINDOW_SAMPLES || direct.total == 0 {
                assert!(value.is_nan(), "row {} should be undefined", i);
            } else {
                assert_eq!(*value, direct.rate, "row {}", i);
            }
        }
    }

    #[test]
    fn rolling_window_without_mixed_labels_is_undefined() {
        let dataset = legacy_dataset(
            &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0],
            &[0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3],
        );

        let rolling = rolling_pairwise_agreement(&dataset, LEGACY, 50);
        assert!(rolling[..6].iter().all(|v| v.is_nan()));
        assert_eq!(rolling[6], 1.0);
    }

    #[test]
    fn rolling_small_window_never_defined() {
        let ratings = Array1::from_iter((0..20).map(|i| (i % 2) as f64));
        let dataset = legacy_dataset(ratings.as_slice().unwrap(), &[0.5; 20]);

        let rolling = rolling_pairwise_agreement(&dataset, LEGACY, 4);
        assert!(rolling.iter().all(|v| v.is_nan()));
    }
}
