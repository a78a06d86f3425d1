use std::path::PathBuf;

/// Errors raised while loading the feedback log
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// The input path does not resolve to a file
    #[error("CSV not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Required columns are absent from the header
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Neither the legacy nor the dual prediction format is present
    #[error(
        "Missing prediction columns: need either 'mlpPrediction' or \
         'mlpGenomePrediction'/'mlpAudioPrediction'"
    )]
    MissingPredictionColumns,

    /// A prediction column is present but a row has no value for it
    #[error("Column '{column}' has no value at row {row}")]
    IncompletePredictionColumn { column: &'static str, row: usize },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
