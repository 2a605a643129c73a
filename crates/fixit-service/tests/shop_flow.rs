//! End-to-end behaviour of the shop core over an in-memory store.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use fixit_core::{
    Caller, CredentialUpdate, DeviceLock, FixedClock, LockMode, Money, NewRepairOrder,
    OrderFilter, OrderInput, OrderUpdate, PaymentMode, Period, Role, SaleInput, SecurityInput,
    Vault,
};
use fixit_db::{Database, DbConfig};
use fixit_service::{CollectOutcome, ErrorCode, ShopService};

const KEY: &str = "k3y-for-tests-only-32-bytes-long";
const IST: Tz = chrono_tz::Asia::Kolkata;

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

async fn store() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// A service over `db` whose clock is frozen at `now` in `tz`.
fn service(db: &Database, now: DateTime<Utc>, tz: Tz) -> ShopService {
    ShopService::new(
        db.clone(),
        Vault::from_secret(KEY).unwrap(),
        Arc::new(FixedClock::new(now, tz)),
    )
}

fn staff() -> Caller {
    Caller::new("staff-1", Role::Staff)
}

fn admin() -> Caller {
    Caller::new("admin-1", Role::Admin)
}

fn intake(advance_mode: PaymentMode, balance_mode: PaymentMode) -> NewRepairOrder {
    NewRepairOrder {
        details: OrderInput {
            customer_name: "Priya Nair".into(),
            customer_phone: "9811122233".into(),
            device_brand: "Apple".into(),
            device_model: "iPhone 12".into(),
            problem: "Battery drains fast".into(),
            estimated_cost_paise: 150_000,
            advance_paise: 50_000,
            payment_mode_advance: advance_mode,
            payment_mode_balance: balance_mode,
            ..Default::default()
        },
        security: None,
    }
}

#[tokio::test]
async fn evening_utc_order_counts_for_next_local_day() {
    let db = store().await;

    // 01:30 IST on the 16th
    let counter = service(&db, utc(2026, 10, 15, 20, 0), IST);
    counter
        .create_order(&staff(), intake(PaymentMode::Cash, PaymentMode::Cash))
        .await
        .unwrap();

    // 11:30 IST on the 16th
    let morning = service(&db, utc(2026, 10, 16, 6, 0), IST);
    let stats = morning.dashboard_stats(&staff(), Period::Week).await.unwrap();

    assert_eq!(stats.today.to_string(), "2026-10-16");
    assert_eq!(stats.today_revenue, Money::from_paise(50_000));
    assert_eq!(stats.payment_modes_today.cash, Money::from_paise(50_000));
    let last = stats.trend.last().unwrap();
    assert_eq!(last.date, stats.today);
    assert_eq!(last.revenue, Money::from_paise(50_000));

    // The same instant read in UTC lands on the 15th
    let utc_view = service(&db, utc(2026, 10, 16, 6, 0), chrono_tz::UTC);
    let stats = utc_view.dashboard_stats(&staff(), Period::Week).await.unwrap();
    assert_eq!(stats.today_revenue, Money::zero());
    assert_eq!(stats.trend[5].revenue, Money::from_paise(50_000));
}

#[tokio::test]
async fn advance_and_remainder_land_on_their_own_days() {
    let db = store().await;

    let intake_day = service(&db, utc(2026, 10, 14, 5, 0), IST);
    let order = intake_day
        .create_order(&staff(), intake(PaymentMode::Cash, PaymentMode::Upi))
        .await
        .unwrap();

    let pickup_day = service(&db, utc(2026, 10, 16, 9, 0), IST);
    let before = pickup_day.dashboard_stats(&staff(), Period::Week).await.unwrap();
    assert_eq!(before.pending_collections, Money::from_paise(100_000));
    assert_eq!(before.today_revenue, Money::zero());

    pickup_day
        .collect_balance(&staff(), &order.id, None)
        .await
        .unwrap();

    let after = pickup_day.dashboard_stats(&staff(), Period::Week).await.unwrap();
    assert_eq!(after.today_revenue, Money::from_paise(100_000));
    assert_eq!(after.period_revenue, Money::from_paise(150_000));
    assert_eq!(after.pending_collections, Money::zero());
    assert_eq!(after.payment_modes_today.upi, Money::from_paise(100_000));
    assert_eq!(after.payment_modes_period.cash, Money::from_paise(50_000));

    let repairs = after.categories.iter().find(|c| c.name == "Repairs").unwrap();
    assert_eq!(repairs.revenue, Money::from_paise(150_000));
}

#[tokio::test]
async fn racing_collections_realize_the_balance_once() {
    let db = store().await;
    let svc = service(&db, utc(2026, 10, 16, 6, 0), IST);
    let order = svc
        .create_order(&staff(), intake(PaymentMode::Cash, PaymentMode::Cash))
        .await
        .unwrap();

    let clerk = staff();
    let owner = admin();
    let (a, b) = tokio::join!(
        svc.collect_balance(&clerk, &order.id, None),
        svc.collect_balance(&owner, &order.id, None),
    );
    let mut outcomes = vec![a.unwrap(), b.unwrap()];
    outcomes.sort_by_key(|o| *o == CollectOutcome::AlreadyCollected);
    assert_eq!(
        outcomes,
        vec![CollectOutcome::Collected, CollectOutcome::AlreadyCollected]
    );

    let stats = svc.dashboard_stats(&staff(), Period::Week).await.unwrap();
    assert_eq!(stats.today_revenue, Money::from_paise(150_000));
}

#[tokio::test]
async fn replacing_pin_with_password_leaves_one_pair() {
    let db = store().await;
    let svc = service(&db, utc(2026, 10, 16, 6, 0), IST);

    let mut input = intake(PaymentMode::Cash, PaymentMode::Cash);
    input.security = Some(SecurityInput {
        mode: LockMode::Pin,
        value: "4321".into(),
    });
    let order = svc.create_order(&staff(), input).await.unwrap();

    svc.update_order(
        &staff(),
        &order.id,
        OrderUpdate {
            details: intake(PaymentMode::Cash, PaymentMode::Cash).details,
            credential: CredentialUpdate::Replace(Some(SecurityInput {
                mode: LockMode::Password,
                value: "open sesame".into(),
            })),
        },
    )
    .await
    .unwrap();

    let (pin, pattern, password): (Option<String>, Option<String>, Option<String>) =
        sqlx::query_as(
            "SELECT pin_cipher, pattern_cipher, password_cipher FROM repair_orders WHERE id = ?1",
        )
        .bind(&order.id)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert!(pin.is_none());
    assert!(pattern.is_none());
    assert!(password.is_some());

    let details = svc.get_order(&staff(), &order.id).await.unwrap();
    assert_eq!(details.lock, DeviceLock::Password("open sesame".into()));
}

#[tokio::test]
async fn wrong_key_degrades_to_empty_value() {
    let db = store().await;
    let svc = service(&db, utc(2026, 10, 16, 6, 0), IST);

    let mut input = intake(PaymentMode::Cash, PaymentMode::Cash);
    input.security = Some(SecurityInput {
        mode: LockMode::Pattern,
        value: "0-1-2-5-8".into(),
    });
    let order = svc.create_order(&staff(), input).await.unwrap();

    let rotated = ShopService::new(
        db.clone(),
        Vault::new([9u8; 32]),
        Arc::new(FixedClock::new(utc(2026, 10, 16, 6, 0), IST)),
    );
    let details = rotated.get_order(&staff(), &order.id).await.unwrap();
    assert_eq!(details.lock.mode(), Some(LockMode::Pattern));
    assert_ne!(details.lock, DeviceLock::Pattern("0-1-2-5-8".into()));
}

#[tokio::test]
async fn order_delete_takes_its_invoices_and_nothing_else() {
    let db = store().await;
    let svc = service(&db, utc(2026, 10, 16, 6, 0), IST);

    let doomed = svc
        .create_order(&staff(), intake(PaymentMode::Cash, PaymentMode::Cash))
        .await
        .unwrap();
    let kept = svc
        .create_order(&staff(), intake(PaymentMode::Cash, PaymentMode::Cash))
        .await
        .unwrap();
    svc.create_invoice(&staff(), &doomed.id).await.unwrap();
    svc.create_invoice(&staff(), &kept.id).await.unwrap();

    svc.delete_order(&admin(), &doomed.id).await.unwrap();

    let remaining = svc.list_invoices(&staff(), None).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].order_id, kept.id);

    let err = svc.delete_order(&admin(), &doomed.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(
        svc.list_orders(&staff(), OrderFilter::default()).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn maintenance_reads_but_never_writes() {
    let db = store().await;
    let svc = service(&db, utc(2026, 10, 16, 6, 0), IST);
    let ops = Caller::new("maint-1", Role::Maintenance);

    let err = svc
        .create_order(&ops, intake(PaymentMode::Cash, PaymentMode::Cash))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Unauthorized);

    let err = svc
        .create_sale(
            &ops,
            SaleInput {
                item_name: "Cable".into(),
                quantity: 1,
                unit_price_paise: 29_900,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Unauthorized);

    assert!(svc.dashboard_stats(&ops, Period::Month).await.is_ok());
    assert!(svc.list_staff(&ops).await.is_ok());
    assert!(svc.set_maintenance_mode(&ops, true).await.unwrap());
}

#[tokio::test]
async fn anonymous_caller_is_denied_everything() {
    let db = store().await;
    let svc = service(&db, utc(2026, 10, 16, 6, 0), IST);
    let order = svc
        .create_order(&staff(), intake(PaymentMode::Cash, PaymentMode::Cash))
        .await
        .unwrap();
    let nobody = Caller::Anonymous;

    let denied = [
        svc.create_order(&nobody, intake(PaymentMode::Cash, PaymentMode::Cash))
            .await
            .err(),
        svc.transition_order_status(&nobody, &order.id, "PENDING")
            .await
            .err(),
        svc.collect_balance(&nobody, &order.id, None).await.err(),
        svc.get_order(&nobody, &order.id).await.err(),
        svc.customer_history(&nobody, "9811122233", None).await.err(),
        svc.list_sales(&nobody, None).await.err(),
        svc.list_expenditures(&nobody).await.err(),
        svc.dashboard_stats(&nobody, Period::Week).await.err(),
        svc.create_invoice(&nobody, &order.id).await.err(),
        svc.list_staff(&nobody).await.err(),
        svc.maintenance_mode(&nobody).await.err(),
        svc.delete_order(&nobody, &order.id).await.err(),
    ];

    for (i, err) in denied.into_iter().enumerate() {
        let err = err.unwrap_or_else(|| panic!("call {i} was allowed"));
        assert_eq!(err.code, ErrorCode::Unauthorized, "call {i}");
    }

    // Nothing moved
    let details = svc.get_order(&staff(), &order.id).await.unwrap();
    assert!(details.order.balance_collected_at.is_none());
}
