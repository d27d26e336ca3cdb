//! Integration tests for the advance repository.

mod common;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use rstest::rstest;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use payroll_core::advance::{
    AdminDecision, AdminEdit, AdvanceError, AdvanceStatus, AdvanceType, CycleFilter,
    PeriodSettings, RequestFilter, SubmitAdvance,
};
use payroll_db::entities::{advance_periods, sea_orm_active_enums::UserRole};
use payroll_db::repositories::AdvanceRepository;
use payroll_shared::types::PageRequest;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
}

fn today() -> NaiveDate {
    date(11)
}

fn ask(advance_type: AdvanceType, amount: Decimal) -> SubmitAdvance {
    SubmitAdvance {
        advance_type,
        amount,
        notes: String::new(),
    }
}

async fn open_both(repo: &AdvanceRepository) {
    for advance_type in AdvanceType::ALL {
        repo.configure_period(
            advance_type,
            PeriodSettings {
                start_date: date(10),
                end_date: date(12),
                is_active: true,
            },
            today(),
        )
        .await
        .unwrap();
    }
}

#[tokio::test]
async fn test_periods_are_created_inactive() {
    let db = common::setup().await;
    let repo = AdvanceRepository::new(db);

    let periods = repo.periods(today()).await.unwrap();
    assert_eq!(periods.len(), 2);
    assert!(periods.iter().all(|p| !p.is_active));

    // a second call returns the same rows
    let again = repo.periods(today()).await.unwrap();
    assert_eq!(periods, again);
}

#[tokio::test]
async fn test_configure_keeps_one_active_period_per_type() {
    let db = common::setup().await;
    let repo = AdvanceRepository::new(db.clone());

    let settings = PeriodSettings {
        start_date: date(10),
        end_date: date(12),
        is_active: true,
    };
    let first = repo
        .configure_period(AdvanceType::First, settings, today())
        .await
        .unwrap();
    let again = repo
        .configure_period(AdvanceType::First, settings, today())
        .await
        .unwrap();
    assert_eq!(first.id, again.id);

    let active = advance_periods::Entity::find()
        .filter(advance_periods::Column::IsActive.eq(true))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(active, 1);

    let backwards = repo
        .configure_period(
            AdvanceType::Second,
            PeriodSettings {
                start_date: date(12),
                end_date: date(10),
                is_active: true,
            },
            today(),
        )
        .await;
    assert!(matches!(backwards, Err(AdvanceError::InvalidPeriodRange { .. })));
}

#[tokio::test]
async fn test_submit_rules() {
    let db = common::setup().await;
    let user = common::insert_user(&db, "1001", UserRole::User, Some(dec!(4000))).await;
    let broke = common::insert_user(&db, "1002", UserRole::User, None).await;
    let repo = AdvanceRepository::new(db);

    // nothing open yet
    let closed = repo.submit(user, today(), ask(AdvanceType::First, dec!(500))).await;
    assert!(matches!(closed, Err(AdvanceError::PeriodClosed { .. })));

    open_both(&repo).await;

    let request = repo
        .submit(user, today(), ask(AdvanceType::First, dec!(500)))
        .await
        .unwrap();
    assert_eq!(request.status, AdvanceStatus::UnderReview);
    assert!(!request.user_locked && !request.locked);

    let duplicate = repo.submit(user, today(), ask(AdvanceType::First, dec!(300))).await;
    assert!(matches!(duplicate, Err(AdvanceError::AlreadyRequested { .. })));

    let too_much = repo.submit(user, today(), ask(AdvanceType::Second, dec!(1000.5))).await;
    assert!(matches!(too_much, Err(AdvanceError::AmountAboveMaximum { .. })));

    let no_salary = repo.submit(broke, today(), ask(AdvanceType::First, dec!(200))).await;
    assert!(matches!(no_salary, Err(AdvanceError::NoBaseSalary)));

    let late = repo.submit(user, date(13), ask(AdvanceType::Second, dec!(200))).await;
    assert!(matches!(late, Err(AdvanceError::PeriodClosed { .. })));
}

#[rstest]
#[case::minimum(dec!(100), None)]
#[case::quarter_of_salary(dec!(1000), None)]
#[case::under_minimum(dec!(99.99), Some("below"))]
#[case::over_quarter(dec!(1000.01), Some("above"))]
#[tokio::test]
async fn test_submit_amount_bounds(#[case] amount: Decimal, #[case] rejected: Option<&str>) {
    let db = common::setup().await;
    let user = common::insert_user(&db, "1001", UserRole::User, Some(dec!(4000))).await;
    let repo = AdvanceRepository::new(db);
    open_both(&repo).await;

    let result = repo.submit(user, today(), ask(AdvanceType::First, amount)).await;
    match rejected {
        None => assert_eq!(result.unwrap().amount, amount),
        Some("below") => assert!(matches!(result, Err(AdvanceError::AmountBelowMinimum { .. }))),
        Some(_) => assert!(matches!(result, Err(AdvanceError::AmountAboveMaximum { .. }))),
    }
}

#[tokio::test]
async fn test_owner_edit_until_admin_proposes() {
    let db = common::setup().await;
    let user = common::insert_user(&db, "1001", UserRole::User, Some(dec!(4000))).await;
    let repo = AdvanceRepository::new(db);
    open_both(&repo).await;

    let request = repo
        .submit(user, today(), ask(AdvanceType::First, dec!(500)))
        .await
        .unwrap();

    let edited = repo
        .owner_update(request.id, user, dec!(250.5), Some("rent".to_string()))
        .await
        .unwrap();
    assert_eq!(edited.amount, dec!(250.5));
    assert_eq!(edited.notes, "rent");

    let stranger = repo.owner_update(request.id, Uuid::new_v4(), dec!(300), None).await;
    assert!(matches!(stranger, Err(AdvanceError::RequestNotFound(_))));

    let proposed = repo.propose(request.id, AdminDecision::Approved).await.unwrap();
    assert!(proposed.user_locked);
    assert_eq!(proposed.status, AdvanceStatus::UnderReview);

    let blocked = repo.owner_update(request.id, user, dec!(300), None).await;
    assert!(matches!(blocked, Err(AdvanceError::NotAllowedNow)));
    let blocked = repo.owner_delete(request.id, user).await;
    assert!(matches!(blocked, Err(AdvanceError::NotAllowedNow)));
}

#[tokio::test]
async fn test_owner_delete() {
    let db = common::setup().await;
    let user = common::insert_user(&db, "1001", UserRole::User, Some(dec!(4000))).await;
    let repo = AdvanceRepository::new(db);
    open_both(&repo).await;

    let request = repo
        .submit(user, today(), ask(AdvanceType::Second, dec!(400)))
        .await
        .unwrap();
    repo.owner_delete(request.id, user).await.unwrap();
    assert!(repo.list_own(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_finalize_is_all_or_nothing() {
    let db = common::setup().await;
    let a = common::insert_user(&db, "1001", UserRole::User, Some(dec!(4000))).await;
    let b = common::insert_user(&db, "1002", UserRole::User, Some(dec!(4000))).await;
    let repo = AdvanceRepository::new(db);
    open_both(&repo).await;

    let ra = repo.submit(a, today(), ask(AdvanceType::First, dec!(500))).await.unwrap();
    let rb = repo.submit(b, today(), ask(AdvanceType::First, dec!(500))).await.unwrap();
    repo.propose(ra.id, AdminDecision::Rejected).await.unwrap();

    let refused = repo.finalize().await;
    assert!(matches!(refused, Err(AdvanceError::UndecidedRequests { count: 1 })));
    let untouched = repo.list_own(a).await.unwrap();
    assert_eq!(untouched[0].status, AdvanceStatus::UnderReview);
    assert!(!untouched[0].locked);

    assert_eq!(repo.propose_rest(AdminDecision::Approved).await.unwrap(), 1);

    let plan = repo.finalize().await.unwrap();
    assert_eq!(plan.len(), 2);

    let a_final = repo.list_own(a).await.unwrap();
    assert_eq!(a_final[0].status, AdvanceStatus::Rejected);
    assert!(a_final[0].locked);
    let b_final = repo.list_own(b).await.unwrap();
    assert_eq!(b_final[0].id, rb.id);
    assert_eq!(b_final[0].status, AdvanceStatus::Approved);

    let edit = repo
        .admin_edit(
            rb.id,
            AdminEdit {
                amount: Some(dec!(200)),
                notes: None,
                decision: None,
            },
        )
        .await;
    assert!(matches!(edit, Err(AdvanceError::RequestLocked(_))));
    let propose = repo.propose(rb.id, AdminDecision::Rejected).await;
    assert!(matches!(propose, Err(AdvanceError::RequestLocked(_))));
}

#[tokio::test]
async fn test_admin_edit_clears_lock_with_decision() {
    let db = common::setup().await;
    let user = common::insert_user(&db, "1001", UserRole::User, Some(dec!(4000))).await;
    let repo = AdvanceRepository::new(db);
    open_both(&repo).await;

    let request = repo
        .submit(user, today(), ask(AdvanceType::First, dec!(500)))
        .await
        .unwrap();
    repo.propose(request.id, AdminDecision::Approved).await.unwrap();

    let cleared = repo
        .admin_edit(
            request.id,
            AdminEdit {
                amount: Some(dec!(600)),
                notes: Some("checked".to_string()),
                decision: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.amount, dec!(600));
    assert_eq!(cleared.admin_decision, None);
    assert!(!cleared.user_locked);

    // the employee can edit again
    repo.owner_update(request.id, user, dec!(450), None).await.unwrap();
}

#[tokio::test]
async fn test_admin_list_filters() {
    let db = common::setup().await;
    let done = common::insert_user(&db, "1001", UserRole::User, Some(dec!(4000))).await;
    let half = common::insert_user(&db, "1002", UserRole::User, Some(dec!(4000))).await;
    let repo = AdvanceRepository::new(db);
    open_both(&repo).await;

    for advance_type in AdvanceType::ALL {
        repo.submit(done, today(), ask(advance_type, dec!(300))).await.unwrap();
    }
    repo.submit(half, today(), ask(AdvanceType::First, dec!(300))).await.unwrap();
    repo.propose_rest(AdminDecision::Approved).await.unwrap();
    repo.finalize().await.unwrap();
    repo.submit(half, today(), ask(AdvanceType::Second, dec!(300))).await.unwrap();

    let page = PageRequest::default();
    let all = repo.admin_list(&RequestFilter::default(), &page).await.unwrap();
    assert_eq!(all.meta.total, 4);

    let pending = repo
        .admin_list(
            &RequestFilter {
                complete: Some(false),
                ..RequestFilter::default()
            },
            &page,
        )
        .await
        .unwrap();
    assert_eq!(pending.meta.total, 1);
    assert_eq!(pending.data[0].request.user_id, half);

    let cycle_done = repo
        .admin_list(
            &RequestFilter {
                cycle: Some(CycleFilter::Complete),
                ..RequestFilter::default()
            },
            &page,
        )
        .await
        .unwrap();
    assert_eq!(cycle_done.meta.total, 2);
    assert!(cycle_done.data.iter().all(|r| r.request.user_id == done));

    let cycle_open = repo
        .admin_list(
            &RequestFilter {
                cycle: Some(CycleFilter::Incomplete),
                advance_type: Some(AdvanceType::Second),
                ..RequestFilter::default()
            },
            &page,
        )
        .await
        .unwrap();
    assert_eq!(cycle_open.meta.total, 1);

    let searched = repo
        .admin_list(
            &RequestFilter {
                q: Some("1002".to_string()),
                ..RequestFilter::default()
            },
            &page,
        )
        .await
        .unwrap();
    assert_eq!(searched.meta.total, 2);
    assert!(searched.data.iter().all(|r| r.username == "1002"));
}

#[tokio::test]
async fn test_eligibility_view() {
    let db = common::setup().await;
    let user = common::insert_user(&db, "1001", UserRole::User, Some(dec!(4000))).await;
    let repo = AdvanceRepository::new(db);

    let closed = repo.eligibility(user, today()).await.unwrap();
    assert!(!closed.eligibility.eligible);
    assert_eq!(closed.eligibility.max_amount, Some(dec!(1000)));
    assert!(closed.open_types.is_empty());

    open_both(&repo).await;
    repo.submit(user, today(), ask(AdvanceType::First, dec!(500))).await.unwrap();

    let open = repo.eligibility(user, today()).await.unwrap();
    assert!(open.eligibility.eligible);
    assert_eq!(open.open_types, AdvanceType::ALL.to_vec());
    assert_eq!(open.requests.len(), 1);
}

#[tokio::test]
async fn test_monthly_reset_and_first_cleanup() {
    let db = common::setup().await;
    let user = common::insert_user(&db, "1001", UserRole::User, Some(dec!(4000))).await;
    let repo = AdvanceRepository::new(db);
    open_both(&repo).await;

    for advance_type in AdvanceType::ALL {
        repo.submit(user, today(), ask(advance_type, dec!(300))).await.unwrap();
    }

    assert_eq!(repo.delete_first_requests().await.unwrap(), 1);
    let left = repo.list_own(user).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].advance_type, AdvanceType::Second);

    let summary = repo.monthly_reset().await.unwrap();
    assert_eq!(summary.deleted_requests, 1);
    assert_eq!(summary.deactivated_periods, 2);
    assert!(repo.active_period(AdvanceType::First).await.unwrap().is_none());
}
