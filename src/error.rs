use crate::aggregate::AggregateError;
use crate::charts::ChartError;
use crate::loader::DataLoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("data load failed: {0}")]
    DataLoad(#[from] DataLoadError),

    #[error("aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("chart rendering failed: {0}")]
    ChartRender(#[from] ChartError),

    #[error("cannot write report: {0}")]
    Output(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn wraps_module_errors() {
        let err: ReportError = DataLoadError::MissingColumns {
            path: PathBuf::from("expense_data.csv"),
            missing: vec!["Vendor".to_string()],
        }
        .into();
        let msg = err.to_string();
        assert!(msg.starts_with("data load failed"));
        assert!(msg.contains("Vendor"));

        let err: ReportError = ChartError::InvalidData("palette is empty".to_string()).into();
        assert!(matches!(err, ReportError::ChartRender(_)));
    }
}
