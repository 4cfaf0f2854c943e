//! End-to-end reconciliation tests against an in-memory SQLite database.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use finwise_core::budget::Month;
use finwise_core::report::{ReportBudget, ReportService, ReportTransaction};
use finwise_db::migration::{Migrator, MigratorTrait};
use finwise_db::repositories::{
    BudgetError, BudgetRepository, CreateTransactionInput, TransactionError,
    TransactionRepository, UpdateTransactionInput, UpsertMonthlyBudgetInput,
};
use finwise_db::UserRepository;

async fn setup() -> (DatabaseConnection, Uuid) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let user = UserRepository::new(db.clone())
        .create("alice@example.com", "$argon2id$fake-hash")
        .await
        .unwrap();

    (db, user.id)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn month(s: &str) -> Month {
    s.parse().unwrap()
}

async fn add_transaction(
    db: &DatabaseConnection,
    user_id: Uuid,
    amount: Decimal,
    category: &str,
    on: NaiveDate,
) -> Uuid {
    let repo = TransactionRepository::new(db.clone());
    let model = repo
        .create(CreateTransactionInput {
            user_id,
            amount,
            category: category.to_string(),
            date: on,
            description: None,
        })
        .await
        .unwrap();
    model.id
}

async fn add_budget(
    db: &DatabaseConnection,
    user_id: Uuid,
    category: &str,
    month_str: &str,
    amount: Decimal,
) -> Uuid {
    let repo = BudgetRepository::new(db.clone());
    let model = repo
        .upsert_monthly(UpsertMonthlyBudgetInput {
            user_id,
            category: category.to_string(),
            month: month(month_str),
            amount,
            start_date: None,
            end_date: None,
        })
        .await
        .unwrap();
    model.id
}

#[tokio::test]
async fn insert_then_reconcile_sets_exact_spent() {
    let (db, user_id) = setup().await;
    let budgets = BudgetRepository::new(db.clone());

    let budget_id = add_budget(&db, user_id, "Food", "2025-02", dec!(500)).await;
    add_transaction(&db, user_id, dec!(50), "Food", date(2025, 2, 27)).await;
    add_transaction(&db, user_id, dec!(20), "Food", date(2025, 2, 10)).await;

    let summary = budgets
        .reconcile(user_id, "Food", date(2025, 2, 27))
        .await
        .unwrap();
    assert_eq!(summary.updated, 1);

    let budget = budgets.find_for_user(user_id, budget_id).await.unwrap();
    assert_eq!(budget.spent, dec!(70));
    assert_eq!(budget.remaining, dec!(430));
}

#[tokio::test]
async fn reconcile_only_touches_windows_containing_the_date() {
    let (db, user_id) = setup().await;
    let budgets = BudgetRepository::new(db.clone());

    let january = add_budget(&db, user_id, "Food", "2025-01", dec!(300)).await;
    let february = add_budget(&db, user_id, "Food", "2025-02", dec!(500)).await;

    add_transaction(&db, user_id, dec!(50), "Food", date(2025, 2, 27)).await;
    let summary = budgets
        .reconcile(user_id, "Food", date(2025, 2, 27))
        .await
        .unwrap();
    assert_eq!(summary.updated, 1);

    let january = budgets.find_for_user(user_id, january).await.unwrap();
    let february = budgets.find_for_user(user_id, february).await.unwrap();
    assert_eq!(january.spent, dec!(0));
    assert_eq!(january.remaining, dec!(300));
    assert_eq!(february.spent, dec!(50));
    assert_eq!(february.remaining, dec!(450));
}

#[tokio::test]
async fn reconcile_ignores_other_categories_and_users() {
    let (db, user_id) = setup().await;
    let budgets = BudgetRepository::new(db.clone());

    let other_user = UserRepository::new(db.clone())
        .create("bob@example.com", "$argon2id$fake-hash")
        .await
        .unwrap();

    let food = add_budget(&db, user_id, "Food", "2025-02", dec!(500)).await;
    add_transaction(&db, user_id, dec!(30), "Transport", date(2025, 2, 5)).await;
    add_transaction(&db, other_user.id, dec!(80), "Food", date(2025, 2, 5)).await;
    add_transaction(&db, user_id, dec!(50), "Food", date(2025, 2, 5)).await;

    budgets
        .reconcile(user_id, "Food", date(2025, 2, 5))
        .await
        .unwrap();

    let food = budgets.find_for_user(user_id, food).await.unwrap();
    assert_eq!(food.spent, dec!(50));
}

#[tokio::test]
async fn delete_reduces_spent_by_exactly_the_deleted_amount() {
    let (db, user_id) = setup().await;
    let budgets = BudgetRepository::new(db.clone());
    let transactions = TransactionRepository::new(db.clone());

    let budget_id = add_budget(&db, user_id, "Food", "2025-02", dec!(500)).await;
    add_transaction(&db, user_id, dec!(20), "Food", date(2025, 2, 10)).await;
    let doomed = add_transaction(&db, user_id, dec!(50), "Food", date(2025, 2, 27)).await;

    budgets
        .reconcile(user_id, "Food", date(2025, 2, 27))
        .await
        .unwrap();
    let before = budgets.find_for_user(user_id, budget_id).await.unwrap();
    assert_eq!(before.spent, dec!(70));

    let deleted = transactions.delete(user_id, doomed).await.unwrap();
    budgets
        .reconcile(user_id, &deleted.category, deleted.date)
        .await
        .unwrap();

    let after = budgets.find_for_user(user_id, budget_id).await.unwrap();
    assert_eq!(after.spent, before.spent - deleted.amount);
    assert_eq!(after.spent, dec!(20));
    assert!(after.remaining <= after.amount);
}

#[tokio::test]
async fn update_moves_spend_between_categories() {
    let (db, user_id) = setup().await;
    let budgets = BudgetRepository::new(db.clone());
    let transactions = TransactionRepository::new(db.clone());

    let food = add_budget(&db, user_id, "Food", "2025-02", dec!(500)).await;
    let transport = add_budget(&db, user_id, "Transport", "2025-02", dec!(200)).await;
    let id = add_transaction(&db, user_id, dec!(50), "Food", date(2025, 2, 10)).await;
    budgets
        .reconcile(user_id, "Food", date(2025, 2, 10))
        .await
        .unwrap();

    let old = transactions.find_for_user(user_id, id).await.unwrap();
    let updated = transactions
        .update(
            user_id,
            id,
            UpdateTransactionInput {
                amount: dec!(50),
                category: "Transport".to_string(),
                date: date(2025, 2, 10),
                description: None,
            },
        )
        .await
        .unwrap();

    // Reconcile both the pre-image and post-image coordinates.
    budgets
        .reconcile(user_id, &old.category, old.date)
        .await
        .unwrap();
    budgets
        .reconcile(user_id, &updated.category, updated.date)
        .await
        .unwrap();

    let food = budgets.find_for_user(user_id, food).await.unwrap();
    let transport = budgets.find_for_user(user_id, transport).await.unwrap();
    assert_eq!(food.spent, dec!(0));
    assert_eq!(food.remaining, dec!(500));
    assert_eq!(transport.spent, dec!(50));
    assert_eq!(transport.remaining, dec!(150));
}

#[tokio::test]
async fn upsert_twice_is_additive() {
    let (db, user_id) = setup().await;
    let budgets = BudgetRepository::new(db.clone());

    let first = add_budget(&db, user_id, "Food", "2025-03", dec!(500)).await;
    let second = add_budget(&db, user_id, "Food", "2025-03", dec!(500)).await;
    assert_eq!(first, second);

    let all = budgets.list_for_user(user_id).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].amount, dec!(1000));
}

#[tokio::test]
async fn upsert_computes_spent_from_existing_transactions() {
    let (db, user_id) = setup().await;
    let budgets = BudgetRepository::new(db.clone());

    add_transaction(&db, user_id, dec!(70.5), "Food", date(2025, 3, 15)).await;
    let budget_id = add_budget(&db, user_id, "Food", "2025-03", dec!(500)).await;

    let budget = budgets.find_for_user(user_id, budget_id).await.unwrap();
    assert_eq!(budget.month, "2025-03");
    assert_eq!(budget.start_date, date(2025, 3, 1));
    assert_eq!(budget.end_date, date(2025, 3, 31));
    assert_eq!(budget.spent, dec!(70.5));
    assert_eq!(budget.remaining, dec!(429.5));
}

#[tokio::test]
async fn overspent_budget_floors_remaining_at_zero() {
    let (db, user_id) = setup().await;
    let budgets = BudgetRepository::new(db.clone());

    let budget_id = add_budget(&db, user_id, "Food", "2025-02", dec!(100)).await;
    add_transaction(&db, user_id, dec!(150), "Food", date(2025, 2, 14)).await;

    budgets
        .reconcile(user_id, "Food", date(2025, 2, 14))
        .await
        .unwrap();

    let budget = budgets.find_for_user(user_id, budget_id).await.unwrap();
    assert_eq!(budget.spent, dec!(150));
    assert_eq!(budget.remaining, dec!(0));
}

#[tokio::test]
async fn distinct_months_are_distinct_budgets() {
    let (db, user_id) = setup().await;
    let budgets = BudgetRepository::new(db.clone());

    add_budget(&db, user_id, "Food", "2025-01", dec!(300)).await;
    add_budget(&db, user_id, "Food", "2025-02", dec!(400)).await;

    let all = budgets.list_for_user(user_id).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].month, "2025-01");
    assert_eq!(all[1].month, "2025-02");
}

#[tokio::test]
async fn posting_into_unbudgeted_month_provisions_zero_budget() {
    let (db, user_id) = setup().await;
    let budgets = BudgetRepository::new(db.clone());

    add_budget(&db, user_id, "Food", "2025-01", dec!(300)).await;
    add_transaction(&db, user_id, dec!(25), "Food", date(2025, 3, 8)).await;

    let provisioned = budgets
        .ensure_month_budget(user_id, "Food", month("2025-03"))
        .await
        .unwrap()
        .expect("month should be provisioned");

    assert_eq!(provisioned.amount, dec!(0));
    assert_eq!(provisioned.month, "2025-03");
    assert_eq!(provisioned.spent, dec!(25));
    assert_eq!(provisioned.remaining, dec!(0));

    // Provisioning is idempotent.
    let again = budgets
        .ensure_month_budget(user_id, "Food", month("2025-03"))
        .await
        .unwrap();
    assert!(again.is_none());
}

#[tokio::test]
async fn never_budgeted_category_is_not_provisioned() {
    let (db, user_id) = setup().await;
    let budgets = BudgetRepository::new(db.clone());

    add_transaction(&db, user_id, dec!(25), "Gambling", date(2025, 3, 8)).await;

    let provisioned = budgets
        .ensure_month_budget(user_id, "Gambling", month("2025-03"))
        .await
        .unwrap();
    assert!(provisioned.is_none());
}

#[tokio::test]
async fn budget_delete_is_user_scoped() {
    let (db, user_id) = setup().await;
    let budgets = BudgetRepository::new(db.clone());

    let other_user = UserRepository::new(db.clone())
        .create("bob@example.com", "$argon2id$fake-hash")
        .await
        .unwrap();

    let budget_id = add_budget(&db, user_id, "Food", "2025-02", dec!(500)).await;

    let err = budgets
        .delete_for_user(other_user.id, budget_id)
        .await
        .unwrap_err();
    assert!(matches!(err, BudgetError::NotFound(_)));

    budgets.delete_for_user(user_id, budget_id).await.unwrap();
    assert!(budgets.list_for_user(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn transaction_lookup_is_user_scoped() {
    let (db, user_id) = setup().await;
    let transactions = TransactionRepository::new(db.clone());

    let other_user = UserRepository::new(db.clone())
        .create("bob@example.com", "$argon2id$fake-hash")
        .await
        .unwrap();

    let id = add_transaction(&db, user_id, dec!(50), "Food", date(2025, 2, 27)).await;

    let err = transactions
        .find_for_user(other_user.id, id)
        .await
        .unwrap_err();
    assert!(matches!(err, TransactionError::NotFound(_)));
}

#[tokio::test]
async fn range_query_feeds_the_spending_report() {
    let (db, user_id) = setup().await;
    let transactions = TransactionRepository::new(db.clone());
    let budgets = BudgetRepository::new(db.clone());

    add_transaction(&db, user_id, dec!(50), "Food", date(2025, 2, 27)).await;
    add_transaction(&db, user_id, dec!(999), "Food", date(2025, 3, 1)).await; // outside range
    add_budget(&db, user_id, "Food", "2025-03", dec!(500)).await;

    let in_range = transactions
        .list_in_range(user_id, date(2025, 1, 1), date(2025, 2, 27))
        .await
        .unwrap();
    assert_eq!(in_range.len(), 1);

    let rows: Vec<ReportTransaction> = in_range
        .into_iter()
        .map(|t| ReportTransaction {
            category: t.category,
            amount: t.amount,
        })
        .collect();
    let budget_rows: Vec<ReportBudget> = budgets
        .list_for_user(user_id)
        .await
        .unwrap()
        .into_iter()
        .map(|b| ReportBudget {
            category: b.category,
            month: b.month,
            amount: b.amount,
        })
        .collect();

    let report = ReportService::build_spending_report(&rows, &budget_rows).unwrap();
    assert_eq!(report.total_spending, dec!(50));
    assert_eq!(report.category_breakdown["Food"], dec!(50));
    // Budget performance uses report-range spend even though the budget's
    // own window is March.
    assert_eq!(report.budget_performance.len(), 1);
    assert_eq!(report.budget_performance[0].spent, dec!(50));
    assert_eq!(report.budget_performance[0].remaining, dec!(450));
}
