use crate::metrics::{
    baseline_comparison, like_rate, mean_prediction_error, pairwise_agreement, time_to_first_like,
    Agreement, Baseline, LikeRate,
};
use crate::parsing::{Dataset, PredictionColumn};
use json::{object, JsonValue};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE_WIDTH: usize = 55;

/// Figures reported for one prediction column
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSummary {
    pub column: PredictionColumn,
    pub pairwise: Agreement,
    pub mean_error: f64,
}

/// Everything printed in the metrics summary
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub time_to_first_like: Option<i64>,
    pub like_rate: LikeRate,
    pub columns: Vec<ColumnSummary>,
    pub baseline: Baseline,
}

impl Summary {
    /// Compute the summary. The baseline uses the first column, or the legacy one if none is selected.
    pub fn compute(dataset: &Dataset, columns: &[PredictionColumn], baseline_rows: usize) -> Summary {
        let primary = columns.first().copied().unwrap_or(PredictionColumn::Legacy);

        Summary {
            time_to_first_like: time_to_first_like(dataset),
            like_rate: like_rate(dataset),
            columns: columns
                .iter()
                .map(|&column| ColumnSummary {
                    column,
                    pairwise: pairwise_agreement(dataset, column),
                    mean_error: mean_prediction_error(dataset, column),
                })
                .collect(),
            baseline: baseline_comparison(dataset, primary, baseline_rows),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        let mut data = object! {};

        data["total_samples"] = self.like_rate.total.into();
        data["time_to_first_like"] = match self.time_to_first_like {
            Some(index) => index.into(),
            None => JsonValue::Null,
        };
        data["like_rate"] = like_rate_json(&self.like_rate);

        let mut columns = object! {};
        for summary in &self.columns {
            let mut entry = object! {};
            entry["pairwise_agreement"] = agreement_json(&summary.pairwise);
            entry["mean_error"] = summary.mean_error.into();
            columns[summary.column.header()] = entry;
        }
        data["columns"] = columns;

        let baseline = &self.baseline;
        let mut halves = object! {};
        for (key, half) in [("first", &baseline.first), ("last", &baseline.last)] {
            let mut entry = object! {};
            entry["like_rate"] = like_rate_json(&half.like_rate);
            entry["pairwise_agreement"] = agreement_json(&half.pairwise);
            entry["mean_error"] = half.mean_error.into();
            halves[key] = entry;
        }
        halves["n"] = baseline.n.into();
        halves["column"] = baseline.column.header().into();
        data["baseline"] = halves;

        data
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rate = &self.like_rate;

        writeln!(f, "\nMetrics Summary")?;
        writeln!(f, "{}", "─".repeat(RULE_WIDTH))?;
        writeln!(f, "Total samples:         {}", rate.total)?;
        match self.time_to_first_like {
            Some(index) => writeln!(f, "Time-to-first-like:    {} auditions", index)?,
            None => writeln!(f, "Time-to-first-like:    N/A auditions")?,
        }
        writeln!(f)?;
        writeln!(
            f,
            "Like Rate:             {:.1}% ({}/{})",
            rate.rate * 100.0,
            rate.likes,
            rate.total
        )?;

        for summary in &self.columns {
            writeln!(f)?;
            writeln!(f, "[{}]", summary.column.label())?;
            writeln!(
                f,
                "  Pairwise Agreement:  {:.1}% ({}/{} pairs)",
                summary.pairwise.rate * 100.0,
                summary.pairwise.correct,
                summary.pairwise.total
            )?;
            writeln!(f, "  Mean Pred Error:     {:.3}", summary.mean_error)?;
        }

        let baseline = &self.baseline;
        let n = baseline.n;
        writeln!(
            f,
            "\nBaseline Comparison (First {} vs Last {}) [{}]",
            n,
            n,
            baseline.column.header()
        )?;
        writeln!(f, "{}", "─".repeat(RULE_WIDTH))?;
        writeln!(
            f,
            "{:20} {:>12} {:>12}",
            "",
            format!("First {}", n),
            format!("Last {}", n)
        )?;
        writeln!(
            f,
            "{:20} {:>11.1}% {:>11.1}%",
            "Like Rate",
            baseline.first.like_rate.rate * 100.0,
            baseline.last.like_rate.rate * 100.0
        )?;
        writeln!(
            f,
            "{:20} {:>11.1}% {:>11.1}%",
            "Pairwise Agreement",
            baseline.first.pairwise.rate * 100.0,
            baseline.last.pairwise.rate * 100.0
        )?;
        writeln!(
            f,
            "{:20} {:>12.3} {:>12.3}",
            "Mean Pred Error", baseline.first.mean_error, baseline.last.mean_error
        )
    }
}

/// Side-by-side statistics for two configuration tags
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub tags: [String; 2],
    pub samples: [usize; 2],
    pub like_rate: [f64; 2],
    pub columns: Vec<(PredictionColumn, [f64; 2], [f64; 2])>,
}

impl Comparison {
    /// Compare the rows tagged `first` with the rows tagged `second`.
    /// Returns None when the dataset has no configFlags column.
    pub fn compute(
        dataset: &Dataset,
        first: &str,
        second: &str,
        columns: &[PredictionColumn],
    ) -> Option<Comparison> {
        let a = dataset.filter_config(first)?;
        let b = dataset.filter_config(second)?;

        Some(Comparison {
            tags: [first.to_string(), second.to_string()],
            samples: [a.len(), b.len()],
            like_rate: [like_rate(&a).rate, like_rate(&b).rate],
            columns: columns
                .iter()
                .map(|&column| {
                    (
                        column,
                        [
                            pairwise_agreement(&a, column).rate,
                            pairwise_agreement(&b, column).rate,
                        ],
                        [
                            mean_prediction_error(&a, column),
                            mean_prediction_error(&b, column),
                        ],
                    )
                })
                .collect(),
        })
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b] = &self.tags;

        writeln!(f, "\n=== Comparison: {} vs {} ===", a, b)?;
        writeln!(f, "{:20} {:>15} {:>15}", "", a, b)?;
        writeln!(f, "{}", "-".repeat(52))?;
        writeln!(f, "{:20} {:>15} {:>15}", "Samples", self.samples[0], self.samples[1])?;
        writeln!(
            f,
            "{:20} {:>14.1}% {:>14.1}%",
            "Like Rate",
            self.like_rate[0] * 100.0,
            self.like_rate[1] * 100.0
        )?;

        for (column, pairwise, error) in &self.columns {
            writeln!(
                f,
                "{:20} {:>14.1}% {:>14.1}%",
                format!("Pairwise ({})", column.short_label()),
                pairwise[0] * 100.0,
                pairwise[1] * 100.0
            )?;
            writeln!(
                f,
                "{:20} {:>15.3} {:>15.3}",
                format!("Error ({})", column.short_label()),
                error[0],
                error[1]
            )?;
        }

        Ok(())
    }
}

/// Write the summary as pretty-printed JSON
pub fn write_summary_json(path: &Path, summary: &Summary) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(summary.to_json().pretty(2).as_bytes())?;

    Ok(())
}

fn like_rate_json(rate: &LikeRate) -> JsonValue {
    let mut data = object! {};
    data["likes"] = rate.likes.into();
    data["total"] = rate.total.into();
    data["rate"] = rate.rate.into();
    data
}

fn agreement_json(agreement: &Agreement) -> JsonValue {
    let mut data = object! {};
    data["correct"] = agreement.correct.into();
    data["total"] = agreement.total.into();
    data["rate"] = agreement.rate.into();
    data
}
