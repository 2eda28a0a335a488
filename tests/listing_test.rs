mod common;

use anyhow::Result;
use common::{StandardBuilding, key, parse_date, test_service};
use condoledger::application::{ChargeFilter, ChargeService};
use condoledger::domain::ChargeRecord;
use std::collections::HashSet;

fn keys(charges: &[ChargeRecord]) -> HashSet<String> {
    charges.iter().map(|c| c.key().doc_key()).collect()
}

async fn pay_some(service: &ChargeService) -> Result<()> {
    for (apartment, period, date) in [
        (101, "2024-01", "2024-01-05"),
        (101, "2024-02", "2024-02-06"),
        (102, "2024-01", "2024-01-20"),
        (201, "2024-12", "2024-12-01"),
    ] {
        service
            .record_payment(&key(apartment, period), parse_date(date))
            .await?;
    }
    Ok(())
}

#[tokio::test]
async fn test_monthly_scenario() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.generate_charges(2024, None, &[101]).await?;
    service
        .record_payment(&key(101, "2024-03"), parse_date("2024-03-15"))
        .await?;

    let unpaid = service
        .list_unpaid_charges(&ChargeFilter::new(Some(101), None))
        .await?;
    assert_eq!(unpaid.len(), 11);
    assert!(unpaid.iter().all(|c| c.period != "2024-03"));
    assert!(unpaid.iter().all(|c| !c.paid));

    let paid = service
        .list_paid_charges(&ChargeFilter::new(Some(101), None))
        .await?;
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].period, "2024-03");
    assert_eq!(paid[0].payment_date, Some(parse_date("2024-03-15")));

    Ok(())
}

#[tokio::test]
async fn test_paid_and_unpaid_partition_all() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardBuilding::bill_year(&service, 2024).await?;
    pay_some(&service).await?;

    let filters = [
        ChargeFilter::default(),
        ChargeFilter::new(Some(101), None),
        ChargeFilter::new(None, Some("2024-01".into())),
        ChargeFilter::new(Some(102), Some("2024-01".into())),
        ChargeFilter::new(Some(999), None),
    ];

    for filter in &filters {
        let all = keys(&service.list_all_charges(filter).await?);
        let paid = keys(&service.list_paid_charges(filter).await?);
        let unpaid = keys(&service.list_unpaid_charges(filter).await?);

        assert!(paid.is_disjoint(&unpaid), "overlap for {:?}", filter);
        let union: HashSet<String> = paid.union(&unpaid).cloned().collect();
        assert_eq!(union, all, "gap for {:?}", filter);
    }

    Ok(())
}

#[tokio::test]
async fn test_filters_are_exact_matches() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardBuilding::bill_year(&service, 2024).await?;
    pay_some(&service).await?;

    let paid_jan = service
        .list_paid_charges(&ChargeFilter::new(None, Some("2024-01".into())))
        .await?;
    assert_eq!(
        keys(&paid_jan),
        HashSet::from(["101-2024-01".to_string(), "102-2024-01".to_string()])
    );

    // Period filters do not match by prefix
    let partial = service
        .list_all_charges(&ChargeFilter::new(None, Some("2024".into())))
        .await?;
    assert!(partial.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_listing_is_ordered_by_apartment_then_period() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service
        .generate_charges(2024, Some(common::month(2)), &[201, 101])
        .await?;
    service
        .generate_charges(2024, Some(common::month(1)), &[201, 101])
        .await?;

    let all = service.list_all_charges(&ChargeFilter::default()).await?;
    let order: Vec<String> = all.iter().map(|c| c.key().doc_key()).collect();
    assert_eq!(
        order,
        vec!["101-2024-01", "101-2024-02", "201-2024-01", "201-2024-02"]
    );

    Ok(())
}

#[tokio::test]
async fn test_delete_all_empties_the_ledger() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardBuilding::bill_year(&service, 2024).await?;
    pay_some(&service).await?;

    let deleted = service.delete_all_charges().await?;
    assert_eq!(deleted, 36);

    assert!(service
        .list_all_charges(&ChargeFilter::default())
        .await?
        .is_empty());

    // Deleting an empty ledger is fine
    assert_eq!(service.delete_all_charges().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_summary_totals() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardBuilding::bill_year(&service, 2024).await?;
    pay_some(&service).await?;

    let summary = service.summarize(&ChargeFilter::default()).await?;
    assert_eq!(summary.paid_count, 4);
    assert_eq!(summary.unpaid_count, 32);
    assert_eq!(summary.collected, 40000);
    assert_eq!(summary.outstanding, 320000);

    let apartment = service
        .summarize(&ChargeFilter::new(Some(101), None))
        .await?;
    assert_eq!(apartment.paid_count, 2);
    assert_eq!(apartment.unpaid_count, 10);
    assert_eq!(apartment.apartment_id, Some(101));

    let empty = service
        .summarize(&ChargeFilter::new(None, Some("1999-01".into())))
        .await?;
    assert_eq!(empty.total_count(), 0);
    assert_eq!(empty.collected, 0);

    Ok(())
}
