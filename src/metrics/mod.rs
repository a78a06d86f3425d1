use crate::parsing::{Dataset, PredictionColumn};
use ndarray::{s, Array1, ArrayView1};

pub mod agreement;

pub use agreement::{pairwise_agreement, rolling_pairwise_agreement, Agreement};

/// Default number of rows in each half of the baseline comparison
pub const DEFAULT_BASELINE_ROWS: usize = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LikeRate {
    pub likes: usize,
    pub total: usize,
    pub rate: f64,
}

/// Statistics for one end of the dataset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaselineHalf {
    pub like_rate: LikeRate,
    pub pairwise: Agreement,
    pub mean_error: f64,
}

/// First n rows against last n rows, to see whether the model drifted
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    pub n: usize,
    pub column: PredictionColumn,
    pub first: BaselineHalf,
    pub last: BaselineHalf,
}

/// Sample index of the first liked audition
pub fn time_to_first_like(dataset: &Dataset) -> Option<i64> {
    dataset
        .sample_index
        .iter()
        .zip(dataset.rating.iter())
        .filter(|(_, rating)| **rating == 1.0)
        .map(|(index, _)| *index)
        .min()
}

/// Share of rows rated exactly 1.0. Every row counts in the denominator.
pub fn like_rate(dataset: &Dataset) -> LikeRate {
    let likes = dataset.rating.iter().filter(|r| **r == 1.0).count();
    let total = dataset.len();
    let rate = match total {
        0 => 0.0,
        _ => likes as f64 / total as f64,
    };

    LikeRate { likes, total, rate }
}

/// |prediction - rating| per row, if the dataset has the column
pub fn absolute_errors(dataset: &Dataset, column: PredictionColumn) -> Option<Array1<f64>> {
    dataset
        .prediction(column)
        .map(|prediction| (&prediction - &dataset.rating).mapv(f64::abs))
}

/// Mean absolute prediction error over the whole dataset
pub fn mean_prediction_error(dataset: &Dataset, column: PredictionColumn) -> f64 {
    absolute_errors(dataset, column)
        .and_then(|errors| errors.mean())
        .unwrap_or(0.0)
}

/// Trailing mean of the absolute error, defined from the first row on
pub fn rolling_prediction_error(
    dataset: &Dataset,
    column: PredictionColumn,
    window: usize,
) -> Vec<f64> {
    match absolute_errors(dataset, column) {
        Some(errors) => trailing_mean(errors.view(), window),
        None => vec![0.0; dataset.len()],
    }
}

/// Mean absolute error of all rows up to and including each row
pub fn cumulative_prediction_error(dataset: &Dataset, column: PredictionColumn) -> Vec<f64> {
    rolling_prediction_error(dataset, column, dataset.len().max(1))
}

/// Trailing mean of the rating
pub fn rolling_like_rate(dataset: &Dataset, window: usize) -> Vec<f64> {
    trailing_mean(dataset.rating.view(), window)
}

/// Compare the first `n` rows with the last `n`.
/// When the dataset has fewer than 2n rows, n becomes half its length.
pub fn baseline_comparison(dataset: &Dataset, column: PredictionColumn, n: usize) -> Baseline {
    let n = if dataset.len() / 2 < n {
        dataset.len() / 2
    } else {
        n
    };

    let half = |part: Dataset| BaselineHalf {
        like_rate: like_rate(&part),
        pairwise: pairwise_agreement(&part, column),
        mean_error: mean_prediction_error(&part, column),
    };

    Baseline {
        n,
        column,
        first: half(dataset.head(n)),
        last: half(dataset.tail(n)),
    }
}

// Mean of the last `window` values ending at each position, clipped at the start
fn trailing_mean(values: ArrayView1<f64>, window: usize) -> Vec<f64> {
    let window = window.max(1);

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            values.slice(s![start..=i]).mean().unwrap_or(0.0)
        })
        .collect()
}
