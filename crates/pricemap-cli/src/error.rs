use thiserror::Error;

use pricemap_core::HarvestError;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] pricemap_core::ValidationError),

    #[error(transparent)]
    Harvest(HarvestError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<HarvestError> for CliError {
    fn from(error: HarvestError) -> Self {
        match error {
            HarvestError::Validation(validation) => Self::Validation(validation),
            other => Self::Harvest(other),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Harvest(_) | Self::Io(_) => 10,
        }
    }
}
