use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::application::{ChargeFilter, ChargeService, PaymentOutcome};
use crate::domain::{ApartmentId, ChargeDocument, ChargeKey, ChargeRecord, DuplicateEntry, Month};

use super::error::{
    ApiError, CHARGES_QUERY_FAILED, DELETE_FAILED, GENERATE_FAILED, PAYMENT_FAILED,
    PAYMENTS_QUERY_FAILED, UNPAID_QUERY_FAILED,
};
use super::extract::{JsonBody, QueryParams};

pub const NO_PAYMENTS_FOUND: &str = "No se encontraron pagos para los parámetros proporcionados.";
pub const NO_CHARGES_FOUND: &str = "No se encontraron gastos para los parámetros proporcionados.";
pub const NO_UNPAID_FOUND: &str =
    "No se encontraron gastos no pagados para los parámetros proporcionados.";

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateChargesRequest {
    #[serde(rename = "año")]
    pub year: i32,
    /// Omitted, null or 0 means every month of the year.
    #[serde(rename = "mes", default, deserialize_with = "deserialize_month")]
    pub month: Option<Month>,
    #[serde(rename = "departamentos")]
    pub apartments: Vec<ApartmentId>,
}

fn deserialize_month<'de, D>(deserializer: D) -> Result<Option<Month>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<u32>::deserialize(deserializer)? {
        None | Some(0) => Ok(None),
        Some(number) => Month::try_from(number)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateChargesResponse {
    pub mensaje: &'static str,
    pub gastos_generados: Vec<ChargeDocument>,
    pub duplicados: Vec<DuplicateEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub departamento_id: ApartmentId,
    pub periodo: String,
    pub fecha_pago: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PaymentResponse {
    Recorded {
        mensaje: &'static str,
        departamento_id: ApartmentId,
        periodo: String,
        fecha_pago: NaiveDate,
    },
    Duplicate {
        mensaje: &'static str,
        estado: &'static str,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct ChargeQuery {
    pub departamento_id: Option<ApartmentId>,
    pub periodo: Option<String>,
}

impl From<ChargeQuery> for ChargeFilter {
    fn from(query: ChargeQuery) -> Self {
        // `departamento_id=0` and an empty `periodo=` mean no filter
        let apartment_id = query.departamento_id.filter(|id| *id != 0);
        let period = query.periodo.filter(|p| !p.trim().is_empty());
        ChargeFilter::new(apartment_id, period)
    }
}

/// Create the charge ledger routes
pub fn create_charge_routes() -> Router<Arc<ChargeService>> {
    Router::new()
        .route("/generar-gastos/", post(generate_charges))
        .route("/pagar-gasto/", post(record_payment))
        .route("/ver-pagos/", get(list_paid_charges))
        .route("/ver-gastos/", get(list_all_charges))
        .route("/ver-gastos-no-pagados/", get(list_unpaid_charges))
        .route("/eliminar-todos/", delete(delete_all_charges))
}

/// Generate monthly charges for a set of apartments
pub async fn generate_charges(
    State(service): State<Arc<ChargeService>>,
    JsonBody(request): JsonBody<GenerateChargesRequest>,
) -> Result<Json<GenerateChargesResponse>, ApiError> {
    let result = service
        .generate_charges(request.year, request.month, &request.apartments)
        .await
        .map_err(ApiError::during(GENERATE_FAILED))?;

    Ok(Json(GenerateChargesResponse {
        mensaje: "Gastos generados exitosamente",
        gastos_generados: result.generated.iter().map(ChargeDocument::from).collect(),
        duplicados: result.duplicates.iter().map(DuplicateEntry::from).collect(),
    }))
}

/// Record the payment of one charge
pub async fn record_payment(
    State(service): State<Arc<ChargeService>>,
    JsonBody(request): JsonBody<PaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let key = ChargeKey::new(request.departamento_id, request.periodo.clone());

    let outcome = service
        .record_payment(&key, request.fecha_pago)
        .await
        .map_err(ApiError::during(PAYMENT_FAILED))?;

    let response = match outcome {
        PaymentOutcome::Recorded(_) => PaymentResponse::Recorded {
            mensaje: "Pago registrado correctamente",
            departamento_id: request.departamento_id,
            periodo: request.periodo,
            fecha_pago: request.fecha_pago,
        },
        PaymentOutcome::AlreadyPaid(_) => PaymentResponse::Duplicate {
            mensaje: "El gasto ya ha sido pagado",
            estado: "Pago duplicado",
        },
    };

    Ok(Json(response))
}

/// List paid charges
pub async fn list_paid_charges(
    State(service): State<Arc<ChargeService>>,
    QueryParams(query): QueryParams<ChargeQuery>,
) -> Result<Json<Value>, ApiError> {
    let charges = service
        .list_paid_charges(&query.into())
        .await
        .map_err(ApiError::during(PAYMENTS_QUERY_FAILED))?;

    Ok(Json(listing_body("pagos", &charges, NO_PAYMENTS_FOUND)))
}

/// List all charges
pub async fn list_all_charges(
    State(service): State<Arc<ChargeService>>,
    QueryParams(query): QueryParams<ChargeQuery>,
) -> Result<Json<Value>, ApiError> {
    let charges = service
        .list_all_charges(&query.into())
        .await
        .map_err(ApiError::during(CHARGES_QUERY_FAILED))?;

    Ok(Json(listing_body("gastos", &charges, NO_CHARGES_FOUND)))
}

/// List unpaid charges
pub async fn list_unpaid_charges(
    State(service): State<Arc<ChargeService>>,
    QueryParams(query): QueryParams<ChargeQuery>,
) -> Result<Json<Value>, ApiError> {
    let charges = service
        .list_unpaid_charges(&query.into())
        .await
        .map_err(ApiError::during(UNPAID_QUERY_FAILED))?;

    Ok(Json(listing_body("gastos", &charges, NO_UNPAID_FOUND)))
}

/// Delete every charge
pub async fn delete_all_charges(
    State(service): State<Arc<ChargeService>>,
) -> Result<Json<Value>, ApiError> {
    service
        .delete_all_charges()
        .await
        .map_err(ApiError::during(DELETE_FAILED))?;

    Ok(Json(json!({ "mensaje": "Todos los datos han sido eliminados" })))
}

/// `{key: [...]}` when there are results, otherwise `{mensaje: empty_message}`.
fn listing_body(key: &str, charges: &[ChargeRecord], empty_message: &str) -> Value {
    if charges.is_empty() {
        return json!({ "mensaje": empty_message });
    }

    let documents: Vec<ChargeDocument> = charges.iter().map(ChargeDocument::from).collect();
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), json!(documents));
    Value::Object(body)
}
