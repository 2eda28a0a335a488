use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{ChargeFilter, ChargeService};
use crate::domain::{ChargeDocument, ChargeStatus, format_cents};

/// Snapshot of the charges collection for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub charges: Vec<ChargeDocument>,
}

/// Exporter for converting charge data to CSV or JSON
pub struct Exporter<'a> {
    service: &'a ChargeService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a ChargeService) -> Self {
        Self { service }
    }

    /// Export charges to CSV format
    pub async fn export_charges_csv<W: Write>(
        &self,
        writer: W,
        filter: &ChargeFilter,
        status: Option<ChargeStatus>,
    ) -> Result<usize> {
        let charges = self.service.list_charges(filter, status).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "departamento_id",
            "departamento",
            "periodo",
            "monto",
            "pagado",
            "fecha_pago",
        ])?;

        for charge in &charges {
            csv_writer.write_record([
                charge.apartment_id.to_string(),
                charge.apartment_id.to_string(),
                charge.period.clone(),
                format_cents(charge.amount_cents),
                charge.paid.to_string(),
                charge
                    .payment_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(charges.len())
    }

    /// Export charges as a JSON snapshot
    pub async fn export_charges_json<W: Write>(
        &self,
        mut writer: W,
        filter: &ChargeFilter,
        status: Option<ChargeStatus>,
    ) -> Result<ChargeSnapshot> {
        let charges = self.service.list_charges(filter, status).await?;

        let snapshot = ChargeSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            charges: charges.iter().map(ChargeDocument::from).collect(),
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
