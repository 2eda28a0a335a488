use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{cents_to_decimal, ApartmentId, ChargeKey, ChargeRecord};

/// The charge as it is exchanged with clients and exported:
/// Spanish field names, decimal amount, and the legacy `departamento` copy of
/// the apartment id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeDocument {
    pub departamento_id: ApartmentId,
    pub departamento: ApartmentId,
    pub periodo: String,
    pub monto: f64,
    pub pagado: bool,
    pub fecha_pago: Option<NaiveDate>,
}

impl From<&ChargeRecord> for ChargeDocument {
    fn from(charge: &ChargeRecord) -> Self {
        Self {
            departamento_id: charge.apartment_id,
            departamento: charge.apartment_id,
            periodo: charge.period.clone(),
            monto: cents_to_decimal(charge.amount_cents),
            pagado: charge.paid,
            fecha_pago: charge.payment_date,
        }
    }
}

/// A generation target that was skipped because the charge already existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    pub departamento_id: ApartmentId,
    pub periodo: String,
}

impl From<&ChargeKey> for DuplicateEntry {
    fn from(key: &ChargeKey) -> Self {
        Self {
            departamento_id: key.apartment_id,
            periodo: key.period.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Month, Period};
    use serde_json::json;

    #[test]
    fn test_unpaid_document_shape() {
        let charge = ChargeRecord::new(101, Period::new(2024, Month::new(3).unwrap()));
        let value = serde_json::to_value(ChargeDocument::from(&charge)).unwrap();

        assert_eq!(
            value,
            json!({
                "departamento_id": 101,
                "departamento": 101,
                "periodo": "2024-03",
                "monto": 100.0,
                "pagado": false,
                "fecha_pago": null,
            })
        );
    }

    #[test]
    fn test_paid_document_carries_iso_date() {
        let mut charge = ChargeRecord::new(7, Period::new(2024, Month::new(12).unwrap()));
        charge.mark_paid(NaiveDate::from_ymd_opt(2024, 12, 5).unwrap());

        let value = serde_json::to_value(ChargeDocument::from(&charge)).unwrap();
        assert_eq!(value["pagado"], json!(true));
        assert_eq!(value["fecha_pago"], json!("2024-12-05"));
    }

    #[test]
    fn test_duplicate_entry_shape() {
        let entry = DuplicateEntry::from(&ChargeKey::new(101, "2024-01"));
        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value, json!({"departamento_id": 101, "periodo": "2024-01"}));
    }
}
