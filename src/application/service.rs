use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::{ApartmentId, ChargeKey, ChargeRecord, ChargeStatus, Month, Period};
use crate::storage::Repository;

use super::{AppError, ChargeSummary};

/// Application service for the charge ledger.
/// This is the primary interface for any client (HTTP API, CLI).
pub struct ChargeService {
    repo: Repository,
}

/// Result of a generation run
#[derive(Debug, Default)]
pub struct GenerationResult {
    pub generated: Vec<ChargeRecord>,
    pub duplicates: Vec<ChargeKey>,
}

/// Result of recording a payment
#[derive(Debug)]
pub enum PaymentOutcome {
    /// The charge went from unpaid to paid.
    Recorded(ChargeRecord),
    /// The charge was already paid; nothing changed.
    AlreadyPaid(ChargeRecord),
}

/// Exact-match filters shared by the listing operations
#[derive(Debug, Clone, Default)]
pub struct ChargeFilter {
    pub apartment_id: Option<ApartmentId>,
    pub period: Option<String>,
}

impl ChargeFilter {
    pub fn new(apartment_id: Option<ApartmentId>, period: Option<String>) -> Self {
        Self {
            apartment_id,
            period,
        }
    }
}

impl ChargeService {
    /// Create a new charge service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open the database at the given path, creating it and its schema if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Release the database connections.
    pub async fn close(&self) {
        self.repo.close().await;
    }

    /// Generate unpaid charges for every (apartment, month) pair.
    ///
    /// With no month, all twelve months of `year` are targeted. Pairs that
    /// already have a charge are reported as duplicates and left untouched.
    /// A store failure aborts the run; charges written before it remain.
    pub async fn generate_charges(
        &self,
        year: i32,
        month: Option<Month>,
        apartment_ids: &[ApartmentId],
    ) -> Result<GenerationResult, AppError> {
        let periods = Period::for_year(year, month);
        let mut result = GenerationResult::default();

        for &apartment_id in apartment_ids {
            for &period in &periods {
                let charge = ChargeRecord::new(apartment_id, period);

                if self.repo.insert_charge_if_absent(&charge).await? {
                    result.generated.push(charge);
                } else {
                    debug!(key = %charge.key(), "charge already exists, skipping");
                    result.duplicates.push(charge.key());
                }
            }
        }

        info!(
            year,
            month = month.map(Month::number),
            generated = result.generated.len(),
            duplicates = result.duplicates.len(),
            "charge generation finished"
        );

        Ok(result)
    }

    /// Mark a charge as paid on the given date.
    ///
    /// Paying an already-paid charge is a no-op reported as `AlreadyPaid`;
    /// the first payment date is kept.
    pub async fn record_payment(
        &self,
        key: &ChargeKey,
        payment_date: NaiveDate,
    ) -> Result<PaymentOutcome, AppError> {
        let mut charge = self.get_charge(key).await?;

        if !charge.mark_paid(payment_date) {
            warn!(key = %key, "duplicate payment attempt");
            return Ok(PaymentOutcome::AlreadyPaid(charge));
        }

        if !self.repo.mark_paid(key, payment_date).await? {
            // Someone else paid (or removed) it between the read and the update
            let current = self.get_charge(key).await?;
            warn!(key = %key, "charge was paid concurrently");
            return Ok(PaymentOutcome::AlreadyPaid(current));
        }

        info!(key = %key, %payment_date, "payment recorded");
        Ok(PaymentOutcome::Recorded(charge))
    }

    /// Get a single charge by key.
    pub async fn get_charge(&self, key: &ChargeKey) -> Result<ChargeRecord, AppError> {
        self.repo
            .get_charge(key)
            .await?
            .ok_or_else(|| AppError::ChargeNotFound {
                apartment_id: key.apartment_id,
                period: key.period.clone(),
            })
    }

    /// List charges matching the filter, optionally restricted to one status.
    pub async fn list_charges(
        &self,
        filter: &ChargeFilter,
        status: Option<ChargeStatus>,
    ) -> Result<Vec<ChargeRecord>, AppError> {
        Ok(self
            .repo
            .list_charges(
                filter.apartment_id,
                filter.period.as_deref(),
                status.map(|s| s.is_paid()),
            )
            .await?)
    }

    /// List paid charges.
    pub async fn list_paid_charges(
        &self,
        filter: &ChargeFilter,
    ) -> Result<Vec<ChargeRecord>, AppError> {
        self.list_charges(filter, Some(ChargeStatus::Paid)).await
    }

    /// List every charge regardless of status.
    pub async fn list_all_charges(
        &self,
        filter: &ChargeFilter,
    ) -> Result<Vec<ChargeRecord>, AppError> {
        self.list_charges(filter, None).await
    }

    /// List unpaid charges.
    pub async fn list_unpaid_charges(
        &self,
        filter: &ChargeFilter,
    ) -> Result<Vec<ChargeRecord>, AppError> {
        self.list_charges(filter, Some(ChargeStatus::Unpaid)).await
    }

    /// Delete every charge. Returns how many were removed.
    pub async fn delete_all_charges(&self) -> Result<u64, AppError> {
        let deleted = self.repo.delete_all_charges().await?;
        info!(deleted, "all charges deleted");
        Ok(deleted)
    }

    /// Paid/unpaid counts and amounts for the filtered charges.
    pub async fn summarize(&self, filter: &ChargeFilter) -> Result<ChargeSummary, AppError> {
        let totals = self
            .repo
            .charge_totals(filter.apartment_id, filter.period.as_deref())
            .await?;

        Ok(ChargeSummary::new(filter.clone(), totals))
    }
}
