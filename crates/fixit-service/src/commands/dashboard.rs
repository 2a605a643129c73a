//! # Dashboard Command
//!
//! Loads one consistent ledger snapshot and reconciles it at the shop's
//! "now". A failed load is an error, never a dashboard full of zeroes.

use tracing::{debug, info};

use crate::error::ServiceResult;
use crate::ShopService;
use fixit_core::{compute_dashboard, Caller, DashboardStats, Operation, Period};

impl ShopService {
    /// Revenue, collections, expenditure and profit for `period`.
    pub async fn dashboard_stats(
        &self,
        caller: &Caller,
        period: Period,
    ) -> ServiceResult<DashboardStats> {
        debug!(?period, "dashboard_stats command");
        caller.authorize(Operation::ViewDashboard)?;

        let snapshot = self.db().ledger().snapshot().await?;
        let stats = compute_dashboard(&snapshot, self.clock().now(), self.timezone(), period)?;

        info!(
            today = %stats.today,
            today_revenue = %stats.today_revenue,
            period_revenue = %stats.period_revenue,
            pending = %stats.pending_collections,
            "Dashboard computed"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::error::ErrorCode;
    use crate::test_support::{maintenance, order_input, service_at, staff};
    use fixit_core::{
        Caller, ExpenditureInput, Money, NewRepairOrder, PaymentMode, Period, Sale, SaleInput,
    };

    #[tokio::test]
    async fn test_dashboard_reconciles_all_streams() {
        // 2026-10-16 12:00 IST
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 6, 30, 0).unwrap();
        let svc = service_at(now).await;

        let mut input = order_input("9000000001");
        input.payment_mode_advance = PaymentMode::Cash;
        input.payment_mode_balance = PaymentMode::Upi;
        let order = svc
            .create_order(
                &staff(),
                NewRepairOrder {
                    details: input,
                    security: None,
                },
            )
            .await
            .unwrap();
        svc.collect_balance(&staff(), &order.id, None).await.unwrap();

        svc.create_sale(
            &staff(),
            SaleInput {
                item_name: "Charger".into(),
                category: Some("Chargers".into()),
                quantity: 2,
                unit_price_paise: 50_000,
                payment_mode: PaymentMode::Card,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        svc.create_expenditure(
            &staff(),
            ExpenditureInput {
                category: "Parts".into(),
                amount_paise: 40_000,
                description: None,
                date: Some(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()),
            },
        )
        .await
        .unwrap();

        let stats = svc.dashboard_stats(&maintenance(), Period::Week).await.unwrap();

        // advance 500 + remainder 1000 + sale 1000
        assert_eq!(stats.today_revenue, Money::from_paise(250_000));
        assert_eq!(stats.total_revenue, Money::from_paise(250_000));
        assert_eq!(stats.today_expenditure, Money::from_paise(40_000));
        assert_eq!(stats.today_profit, Money::from_paise(210_000));
        assert_eq!(stats.pending_collections, Money::zero());
        assert_eq!(stats.active_repairs, 1);
        assert_eq!(stats.payment_modes_today.cash, Money::from_paise(50_000));
        assert_eq!(stats.payment_modes_today.upi, Money::from_paise(100_000));
        assert_eq!(stats.payment_modes_today.card, Money::from_paise(100_000));
        assert_eq!(stats.trend.len(), 7);
        assert_eq!(stats.trend[6].revenue, Money::from_paise(250_000));
    }

    #[tokio::test]
    async fn test_oversized_stored_totals_are_an_error() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 6, 30, 0).unwrap();
        let svc = service_at(now).await;

        // Rows written around validation, e.g. by an old import
        for i in 0..3 {
            svc.db()
                .sales()
                .insert(&Sale {
                    id: format!("s-{i}"),
                    item_name: "Bulk panels".into(),
                    category: "Parts".into(),
                    quantity: 1,
                    unit_price_paise: i64::MAX / 2,
                    total_price_paise: i64::MAX / 2,
                    payment_mode: PaymentMode::Cash,
                    customer_name: None,
                    customer_phone: None,
                    created_by: None,
                    created_at: now,
                })
                .await
                .unwrap();
        }

        let err = svc.dashboard_stats(&staff(), Period::Week).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);
    }

    #[tokio::test]
    async fn test_dashboard_requires_a_role() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 6, 30, 0).unwrap();
        let svc = service_at(now).await;
        let err = svc
            .dashboard_stats(&Caller::Anonymous, Period::Month)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_zeroed() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 6, 30, 0).unwrap();
        let svc = service_at(now).await;
        svc.db().close().await;

        let err = svc.dashboard_stats(&staff(), Period::Week).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
