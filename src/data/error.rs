use std::path::PathBuf;

use thiserror::Error;

/// The two load failures callers distinguish. Either one aborts the whole
/// load: the dashboard's value is the joined dataset, so there is no partial
/// snapshot. Decode problems (missing columns, unparsable numbers) travel as
/// `anyhow` errors with file/sheet/row context instead.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no environment CSV files found in {}", dir.display())]
    MissingEnvironmentData { dir: PathBuf },

    #[error("growth workbook '{name}' not found in {}", dir.display())]
    MissingGrowthWorkbook { name: String, dir: PathBuf },
}
