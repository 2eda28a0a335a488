use thiserror::Error;

use crate::domain::ApartmentId;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Charge not found: {apartment_id}-{period}")]
    ChargeNotFound {
        apartment_id: ApartmentId,
        period: String,
    },

    #[error("{0:#}")]
    Store(#[from] anyhow::Error),
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::ChargeNotFound { .. })
    }
}
