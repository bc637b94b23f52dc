/// Errors returned by the threshold estimators and the histogram container.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ThresholdError {
    #[error("dimensionality not supported: expected a 1-D histogram, got {dimensionality}-D")]
    DimensionalityNotSupported { dimensionality: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("histogram has {actual} bins, at least {required} are required")]
    TooFewBins { required: usize, actual: usize },
    #[error("invalid histogram: {0}")]
    InvalidHistogram(String),
    #[error("could not find a maximum in Otsu's measure for inter-class variance")]
    NoMaximum,
}

pub type Result<T> = std::result::Result<T, ThresholdError>;
