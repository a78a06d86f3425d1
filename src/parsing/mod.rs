use ndarray::{s, Array1, ArrayView1, Axis};

pub mod error;
pub mod feedback;

pub use error::DatasetError;

/// A prediction column written by the audition logger
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredictionColumn {
    Genome,
    Audio,
    Legacy,
}

impl PredictionColumn {
    /// Every column the loader knows about, in report order
    pub const ALL: [PredictionColumn; 3] = [
        PredictionColumn::Genome,
        PredictionColumn::Audio,
        PredictionColumn::Legacy,
    ];

    /// Header of the column in the CSV file
    pub fn header(&self) -> &'static str {
        match self {
            PredictionColumn::Genome => "mlpGenomePrediction",
            PredictionColumn::Audio => "mlpAudioPrediction",
            PredictionColumn::Legacy => "mlpPrediction",
        }
    }

    /// Label used in the summary and in chart legends
    pub fn label(&self) -> &'static str {
        match self {
            PredictionColumn::Genome => "Genome MLP",
            PredictionColumn::Audio => "Audio MLP",
            PredictionColumn::Legacy => "MLP",
        }
    }

    /// Shorter label for the comparison table
    pub fn short_label(&self) -> &'static str {
        match self {
            PredictionColumn::Genome => "Genome",
            PredictionColumn::Audio => "Audio",
            PredictionColumn::Legacy => "MLP",
        }
    }

    /// Chart colour as RGB
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            PredictionColumn::Audio => (0xdc, 0x26, 0x26),
            PredictionColumn::Genome | PredictionColumn::Legacy => (0x25, 0x63, 0xeb),
        }
    }
}

/// Which family of predictions to analyze
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    Genome,
    Audio,
    #[default]
    Both,
}

impl InputMode {
    /// Keep the columns that belong to this mode. The legacy column counts as a genome model.
    pub fn select(&self, columns: &[PredictionColumn]) -> Vec<PredictionColumn> {
        columns
            .iter()
            .copied()
            .filter(|column| match self {
                InputMode::Genome => {
                    matches!(column, PredictionColumn::Genome | PredictionColumn::Legacy)
                }
                InputMode::Audio => *column == PredictionColumn::Audio,
                InputMode::Both => true,
            })
            .collect()
    }
}

/// The feedback log held in columns, ordered by sample index
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub sample_index: Array1<i64>,
    pub rating: Array1<f64>,
    pub predictions: Vec<(PredictionColumn, Array1<f64>)>,
    // None when the file has no configFlags column
    pub config: Option<Vec<Option<String>>>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rating.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rating.is_empty()
    }

    /// Prediction columns available for analysis.
    /// The legacy column is only reported when neither dual column exists.
    pub fn prediction_columns(&self) -> Vec<PredictionColumn> {
        let mut columns: Vec<PredictionColumn> = self
            .predictions
            .iter()
            .map(|(column, _)| *column)
            .filter(|column| *column != PredictionColumn::Legacy)
            .collect();

        if columns.is_empty() && self.prediction(PredictionColumn::Legacy).is_some() {
            columns.push(PredictionColumn::Legacy);
        }

        columns
    }

    /// Scores of a prediction column, if the file has it
    pub fn prediction(&self, column: PredictionColumn) -> Option<ArrayView1<f64>> {
        self.predictions
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, values)| values.view())
    }

    /// Rows whose configFlags equal `tag`. Returns None when the column is absent.
    pub fn filter_config(&self, tag: &str) -> Option<Dataset> {
        let config = self.config.as_ref()?;
        let indices: Vec<usize> = config
            .iter()
            .enumerate()
            .filter(|(_, value)| value.as_deref() == Some(tag))
            .map(|(i, _)| i)
            .collect();

        Some(self.select(&indices))
    }

    /// The first `n` rows (all of them if there are fewer)
    pub fn head(&self, n: usize) -> Dataset {
        self.slice(0, n.min(self.len()))
    }

    /// The last `n` rows (all of them if there are fewer)
    pub fn tail(&self, n: usize) -> Dataset {
        let len = self.len();
        self.slice(len - n.min(len), len)
    }

    /// Contiguous rows [start, end)
    pub fn slice(&self, start: usize, end: usize) -> Dataset {
        Dataset {
            sample_index: self.sample_index.slice(s![start..end]).to_owned(),
            rating: self.rating.slice(s![start..end]).to_owned(),
            predictions: self
                .predictions
                .iter()
                .map(|(column, values)| (*column, values.slice(s![start..end]).to_owned()))
                .collect(),
            config: self.config.as_ref().map(|config| config[start..end].to_vec()),
        }
    }

    fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            sample_index: self.sample_index.select(Axis(0), indices),
            rating: self.rating.select(Axis(0), indices),
            predictions: self
                .predictions
                .iter()
                .map(|(column, values)| (*column, values.select(Axis(0), indices)))
                .collect(),
            config: self
                .config
                .as_ref()
                .map(|config| indices.iter().map(|&i| config[i].clone()).collect()),
        }
    }
}
