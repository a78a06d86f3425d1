use crate::parsing::{Dataset, PredictionColumn};
use std::path::{Path, PathBuf};

pub type PlotResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Output files, suffixed with the active config tag
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartPaths {
    pub rolling_error: PathBuf,
    pub cumulative_error: PathBuf,
    pub like_rate: PathBuf,
    pub rolling_pairwise: PathBuf,
}

impl ChartPaths {
    pub fn new(output_dir: &Path, tag: Option<&str>) -> ChartPaths {
        let suffix = tag.map(|tag| format!("_{}", tag)).unwrap_or_default();
        let path = |stem: &str| output_dir.join(format!("{}{}.png", stem, suffix));

        ChartPaths {
            rolling_error: path("rolling_prediction_error"),
            cumulative_error: path("cumulative_prediction_error"),
            like_rate: path("like_rate_over_time"),
            rolling_pairwise: path("rolling_pairwise_agreement"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ChartOptions {
    pub error_window: usize,
    pub pairwise_window: usize,
}

/// Split a series at undefined values so gaps are left undrawn
#[cfg_attr(not(feature = "plots"), allow(dead_code))]
fn defined_segments(xs: &[f64], ys: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = vec![];
    let mut current = vec![];

    for (&x, &y) in xs.iter().zip(ys) {
        if y.is_nan() {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        } else {
            current.push((x, y));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Render every chart. Returns the files written; the pairwise chart is
/// skipped when no column has a defined rolling value.
#[cfg(feature = "plots")]
pub fn render_charts(
    dataset: &Dataset,
    columns: &[PredictionColumn],
    paths: &ChartPaths,
    options: ChartOptions,
) -> PlotResult<Vec<PathBuf>> {
    use crate::metrics::{
        cumulative_prediction_error, rolling_like_rate, rolling_pairwise_agreement,
        rolling_prediction_error,
    };
    use plotters::prelude::*;

    const LIKE_COLOR: RGBColor = RGBColor(0x16, 0xa3, 0x4a);

    let xs: Vec<f64> = dataset.sample_index.iter().map(|&i| i as f64).collect();
    let column_color = |column: &PredictionColumn| {
        let (r, g, b) = column.color();
        RGBColor(r, g, b)
    };
    let mut written = vec![];

    let rolling_errors: Vec<Series> = columns
        .iter()
        .map(|column| Series {
            label: column.label(),
            color: column_color(column),
            segments: defined_segments(
                &xs,
                &rolling_prediction_error(dataset, *column, options.error_window),
            ),
            fill: true,
        })
        .collect();
    draw_line_chart(
        &paths.rolling_error,
        &ChartSpec {
            caption: format!("Rolling Prediction Error (window={})", options.error_window),
            y_desc: "Prediction Error",
            y_range: None,
            reference: None,
            legend: (columns.len() > 1).then_some(LegendCorner::UpperRight),
        },
        &xs,
        &rolling_errors,
    )?;
    written.push(paths.rolling_error.clone());

    let cumulative_errors: Vec<Series> = columns
        .iter()
        .map(|column| Series {
            label: column.label(),
            color: column_color(column),
            segments: defined_segments(&xs, &cumulative_prediction_error(dataset, *column)),
            fill: false,
        })
        .collect();
    draw_line_chart(
        &paths.cumulative_error,
        &ChartSpec {
            caption: "Cumulative Prediction Error".to_string(),
            y_desc: "Mean Prediction Error",
            y_range: None,
            reference: None,
            legend: (columns.len() > 1).then_some(LegendCorner::UpperRight),
        },
        &xs,
        &cumulative_errors,
    )?;
    written.push(paths.cumulative_error.clone());

    let like_rate = Series {
        label: "Like Rate",
        color: LIKE_COLOR,
        segments: defined_segments(&xs, &rolling_like_rate(dataset, options.error_window)),
        fill: true,
    };
    draw_line_chart(
        &paths.like_rate,
        &ChartSpec {
            caption: format!("Rolling Like Rate (window={})", options.error_window),
            y_desc: "Like Rate",
            y_range: Some(0.0..1.0),
            reference: Some(Reference::Unlabelled),
            legend: None,
        },
        &xs,
        std::slice::from_ref(&like_rate),
    )?;
    written.push(paths.like_rate.clone());

    let pairwise: Vec<Series> = columns
        .iter()
        .map(|column| Series {
            label: column.label(),
            color: column_color(column),
            segments: defined_segments(
                &xs,
                &rolling_pairwise_agreement(dataset, *column, options.pairwise_window),
            ),
            fill: false,
        })
        .filter(|series| !series.segments.is_empty())
        .collect();
    if pairwise.is_empty() {
        log::info!("no defined rolling pairwise agreement, skipping chart");
    } else {
        draw_line_chart(
            &paths.rolling_pairwise,
            &ChartSpec {
                caption: format!(
                    "Rolling Pairwise Agreement (window={})",
                    options.pairwise_window
                ),
                y_desc: "Pairwise Agreement",
                y_range: Some(0.0..1.0),
                reference: Some(Reference::Labelled("Random Guessing")),
                legend: Some(LegendCorner::LowerRight),
            },
            &xs,
            &pairwise,
        )?;
        written.push(paths.rolling_pairwise.clone());
    }

    Ok(written)
}

#[cfg(not(feature = "plots"))]
pub fn render_charts(
    _dataset: &Dataset,
    _columns: &[PredictionColumn],
    _paths: &ChartPaths,
    _options: ChartOptions,
) -> PlotResult<Vec<PathBuf>> {
    Err("plots feature is not enabled".into())
}

#[cfg(feature = "plots")]
struct Series {
    label: &'static str,
    color: plotters::style::RGBColor,
    segments: Vec<Vec<(f64, f64)>>,
    fill: bool,
}

#[cfg(feature = "plots")]
struct ChartSpec {
    caption: String,
    y_desc: &'static str,
    // None scales to the data
    y_range: Option<std::ops::Range<f64>>,
    reference: Option<Reference>,
    legend: Option<LegendCorner>,
}

/// Dashed line at 0.5
#[cfg(feature = "plots")]
#[derive(Clone, Copy)]
enum Reference {
    Unlabelled,
    Labelled(&'static str),
}

#[cfg(feature = "plots")]
#[derive(Clone, Copy)]
enum LegendCorner {
    UpperRight,
    LowerRight,
}

#[cfg(feature = "plots")]
fn draw_line_chart(path: &Path, spec: &ChartSpec, xs: &[f64], series: &[Series]) -> PlotResult<()> {
    use plotters::prelude::*;

    const REFERENCE_COLOR: RGBColor = RGBColor(0x9c, 0xa3, 0xaf);

    let x_min = xs.first().copied().unwrap_or(0.0);
    let x_max = xs.last().copied().unwrap_or(1.0).max(x_min + 1.0);
    let y_range = spec.y_range.clone().unwrap_or_else(|| {
        let y_max = series
            .iter()
            .flat_map(|s| s.segments.iter().flatten())
            .map(|&(_, y)| y)
            .fold(0.0_f64, f64::max);
        0.0..(y_max * 1.1).max(0.1)
    });

    let root = BitMapBackend::new(path, (1500, 750)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(&spec.caption, ("sans-serif", 28))
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_range)?;
    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .x_desc("Sample Index")
        .y_desc(spec.y_desc)
        .label_style(("sans-serif", 16))
        .draw()?;

    for s in series {
        let color = s.color;
        for (i, segment) in s.segments.iter().enumerate() {
            if s.fill {
                chart.draw_series(AreaSeries::new(
                    segment.iter().copied(),
                    0.0,
                    color.mix(0.2),
                ))?;
            }

            let drawn = chart.draw_series(LineSeries::new(
                segment.iter().copied(),
                color.stroke_width(2),
            ))?;
            if i == 0 {
                drawn.label(s.label).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }
        }
    }

    if let Some(reference) = spec.reference {
        let drawn = chart.draw_series(DashedLineSeries::new(
            vec![(x_min, 0.5), (x_max, 0.5)],
            8,
            6,
            REFERENCE_COLOR.stroke_width(1),
        ))?;
        if let Reference::Labelled(label) = reference {
            drawn.label(label).legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], REFERENCE_COLOR.stroke_width(1))
            });
        }
    }

    if let Some(legend) = spec.legend {
        let position = match legend {
            LegendCorner::UpperRight => SeriesLabelPosition::UpperRight,
            LegendCorner::LowerRight => SeriesLabelPosition::LowerRight,
        };
        chart
            .configure_series_labels()
            .position(position)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    log::debug!("wrote {}", path.display());

    Ok(())
}
