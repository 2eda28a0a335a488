mod common;

use anyhow::Result;
use common::{key, month, parse_date, test_service};
use condoledger::application::ChargeFilter;
use condoledger::domain::ChargeStatus;
use condoledger::io::Exporter;

#[tokio::test]
async fn test_export_csv() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service
        .generate_charges(2024, Some(month(1)), &[101, 102])
        .await?;
    service
        .record_payment(&key(101, "2024-01"), parse_date("2024-01-09"))
        .await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service)
        .export_charges_csv(&mut buffer, &ChargeFilter::default(), None)
        .await?;
    assert_eq!(count, 2);

    let csv = String::from_utf8(buffer)?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "departamento_id,departamento,periodo,monto,pagado,fecha_pago",
            "101,101,2024-01,100.00,true,2024-01-09",
            "102,102,2024-01,100.00,false,",
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_export_json_respects_status() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service.generate_charges(2024, None, &[101]).await?;
    service
        .record_payment(&key(101, "2024-04"), parse_date("2024-04-30"))
        .await?;

    let mut buffer = Vec::new();
    let snapshot = Exporter::new(&service)
        .export_charges_json(
            &mut buffer,
            &ChargeFilter::default(),
            Some(ChargeStatus::Unpaid),
        )
        .await?;
    assert_eq!(snapshot.charges.len(), 11);

    let value: serde_json::Value = serde_json::from_slice(&buffer)?;
    let charges = value["charges"].as_array().unwrap();
    assert_eq!(charges.len(), 11);
    assert!(charges.iter().all(|c| c["pagado"] == false));

    Ok(())
}
