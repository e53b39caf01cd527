use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AccountKind, BudgetCmd, BudgetMonth, CreateTransactionCmd, Engine, EngineError, MoneyCents,
    NewAccountCmd, RegisterUserCmd, TransactionKind, UpdateTransactionCmd, User,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection, User) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let alice = engine
        .register_user(RegisterUserCmd::new("alice@example.com", "Alice", "password"))
        .await
        .unwrap();
    (engine, db, alice)
}

async fn engine_with_file_db() -> (Engine, String, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    (engine, url, path)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn cents(value: i64) -> MoneyCents {
    MoneyCents::new(value)
}

async fn account_with(engine: &Engine, user: &User, name: &str, balance: i64) -> Uuid {
    engine
        .create_account(
            NewAccountCmd::new(user.id, name, AccountKind::Checking).balance(cents(balance)),
        )
        .await
        .unwrap()
        .id
}

async fn food_budget(engine: &Engine, user: &User) -> Uuid {
    engine
        .create_budget(BudgetCmd::new(
            user.id,
            "food",
            cents(20_000),
            "2024-03".parse().unwrap(),
        ))
        .await
        .unwrap()
        .id
}

async fn balance(engine: &Engine, user: &User, account_id: Uuid) -> MoneyCents {
    engine.account(account_id, user.id).await.unwrap().balance
}

async fn spent(engine: &Engine, user: &User, budget_id: Uuid) -> MoneyCents {
    engine.budget(budget_id, user.id).await.unwrap().spent
}

async fn assert_consistent(engine: &Engine, user: &User, account_id: Uuid, opening: i64) {
    let audit = engine.audit_account(account_id, user.id).await.unwrap();
    assert_eq!(
        audit.stored_balance,
        cents(opening) + audit.transactions_effect,
        "balance drifted from transactions"
    );
}

#[tokio::test]
async fn expense_update_delete_walkthrough() {
    let (engine, _db, alice) = engine_with_db().await;
    let account_id = account_with(&engine, &alice, "Main", 10_000).await;
    let budget_id = food_budget(&engine, &alice).await;

    let created = engine
        .create_transaction(
            CreateTransactionCmd::new(
                alice.id,
                account_id,
                TransactionKind::Expense,
                cents(3_000),
                "food",
            )
            .date(date(2024, 3, 5)),
        )
        .await
        .unwrap();
    assert_eq!(created.account.balance, cents(7_000));
    assert_eq!(balance(&engine, &alice, account_id).await, cents(7_000));
    assert_eq!(spent(&engine, &alice, budget_id).await, cents(3_000));

    let updated = engine
        .update_transaction(UpdateTransactionCmd::new(
            created.transaction.id,
            alice.id,
            account_id,
            TransactionKind::Expense,
            cents(5_000),
            "food",
            date(2024, 3, 5),
        ))
        .await
        .unwrap();
    assert_eq!(updated.transaction.amount, cents(5_000));
    assert_eq!(updated.transaction.created_at, created.transaction.created_at);
    assert_eq!(updated.account.balance, cents(5_000));
    assert_eq!(spent(&engine, &alice, budget_id).await, cents(5_000));

    engine
        .delete_transaction(created.transaction.id, alice.id)
        .await
        .unwrap();
    assert_eq!(balance(&engine, &alice, account_id).await, cents(10_000));
    assert_eq!(spent(&engine, &alice, budget_id).await, MoneyCents::ZERO);
    assert!(matches!(
        engine.transaction(created.transaction.id, alice.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn expense_without_budget_only_moves_balance() {
    let (engine, _db, alice) = engine_with_db().await;
    let account_id = account_with(&engine, &alice, "Main", 10_000).await;
    let budget_id = food_budget(&engine, &alice).await;

    engine
        .create_transaction(
            CreateTransactionCmd::new(
                alice.id,
                account_id,
                TransactionKind::Expense,
                cents(4_000),
                "rent",
            )
            .date(date(2024, 3, 1)),
        )
        .await
        .unwrap();

    assert_eq!(balance(&engine, &alice, account_id).await, cents(6_000));
    assert_eq!(spent(&engine, &alice, budget_id).await, MoneyCents::ZERO);
    assert_eq!(engine.list_budgets(alice.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn income_never_touches_budgets() {
    let (engine, _db, alice) = engine_with_db().await;
    let account_id = account_with(&engine, &alice, "Savings", 0).await;
    let budget_id = food_budget(&engine, &alice).await;

    engine
        .create_transaction(
            CreateTransactionCmd::new(
                alice.id,
                account_id,
                TransactionKind::Income,
                cents(50_000),
                "food",
            )
            .date(date(2024, 3, 10)),
        )
        .await
        .unwrap();

    assert_eq!(balance(&engine, &alice, account_id).await, cents(50_000));
    assert_eq!(spent(&engine, &alice, budget_id).await, MoneyCents::ZERO);
}

#[tokio::test]
async fn transfer_is_stored_without_effects() {
    let (engine, _db, alice) = engine_with_db().await;
    let account_id = account_with(&engine, &alice, "Main", 10_000).await;
    let budget_id = food_budget(&engine, &alice).await;

    let created = engine
        .create_transaction(
            CreateTransactionCmd::new(
                alice.id,
                account_id,
                TransactionKind::Transfer,
                cents(2_500),
                "food",
            )
            .date(date(2024, 3, 10)),
        )
        .await
        .unwrap();

    assert_eq!(created.transaction.kind, TransactionKind::Transfer);
    assert_eq!(balance(&engine, &alice, account_id).await, cents(10_000));
    assert_eq!(spent(&engine, &alice, budget_id).await, MoneyCents::ZERO);
    assert_eq!(
        engine.list_transactions(alice.id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn update_to_identical_values_is_a_no_op() {
    let (engine, _db, alice) = engine_with_db().await;
    let account_id = account_with(&engine, &alice, "Main", 10_000).await;
    let budget_id = food_budget(&engine, &alice).await;

    let created = engine
        .create_transaction(
            CreateTransactionCmd::new(
                alice.id,
                account_id,
                TransactionKind::Expense,
                cents(1_234),
                "food",
            )
            .description("groceries")
            .date(date(2024, 3, 20)),
        )
        .await
        .unwrap();

    for _ in 0..3 {
        engine
            .update_transaction(
                UpdateTransactionCmd::new(
                    created.transaction.id,
                    alice.id,
                    account_id,
                    TransactionKind::Expense,
                    cents(1_234),
                    "food",
                    date(2024, 3, 20),
                )
                .description("groceries"),
            )
            .await
            .unwrap();
    }

    assert_eq!(balance(&engine, &alice, account_id).await, cents(8_766));
    assert_eq!(spent(&engine, &alice, budget_id).await, cents(1_234));
}

#[tokio::test]
async fn update_moves_effect_across_accounts_and_budgets() {
    let (engine, _db, alice) = engine_with_db().await;
    let main = account_with(&engine, &alice, "Main", 10_000).await;
    let card = account_with(&engine, &alice, "Card", 0).await;
    let food = food_budget(&engine, &alice).await;
    let april_transport = engine
        .create_budget(BudgetCmd::new(
            alice.id,
            "transport",
            cents(5_000),
            "2024-04".parse().unwrap(),
        ))
        .await
        .unwrap()
        .id;

    let created = engine
        .create_transaction(
            CreateTransactionCmd::new(alice.id, main, TransactionKind::Expense, cents(3_000), "food")
                .date(date(2024, 3, 5)),
        )
        .await
        .unwrap();

    let moved = engine
        .update_transaction(UpdateTransactionCmd::new(
            created.transaction.id,
            alice.id,
            card,
            TransactionKind::Expense,
            cents(1_500),
            "transport",
            date(2024, 4, 2),
        ))
        .await
        .unwrap();

    assert_eq!(moved.account.id, card);
    assert_eq!(balance(&engine, &alice, main).await, cents(10_000));
    assert_eq!(balance(&engine, &alice, card).await, cents(-1_500));
    assert_eq!(spent(&engine, &alice, food).await, MoneyCents::ZERO);
    assert_eq!(spent(&engine, &alice, april_transport).await, cents(1_500));
    assert_consistent(&engine, &alice, main, 10_000).await;
    assert_consistent(&engine, &alice, card, 0).await;
}

#[tokio::test]
async fn kind_change_flips_the_effect() {
    let (engine, _db, alice) = engine_with_db().await;
    let account_id = account_with(&engine, &alice, "Main", 10_000).await;
    let budget_id = food_budget(&engine, &alice).await;

    let created = engine
        .create_transaction(
            CreateTransactionCmd::new(
                alice.id,
                account_id,
                TransactionKind::Expense,
                cents(2_000),
                "food",
            )
            .date(date(2024, 3, 5)),
        )
        .await
        .unwrap();

    engine
        .update_transaction(UpdateTransactionCmd::new(
            created.transaction.id,
            alice.id,
            account_id,
            TransactionKind::Income,
            cents(2_000),
            "food",
            date(2024, 3, 5),
        ))
        .await
        .unwrap();

    assert_eq!(balance(&engine, &alice, account_id).await, cents(12_000));
    assert_eq!(spent(&engine, &alice, budget_id).await, MoneyCents::ZERO);
}

#[tokio::test]
async fn spent_never_drops_below_zero() {
    let (engine, _db, alice) = engine_with_db().await;
    let account_id = account_with(&engine, &alice, "Main", 10_000).await;

    // Expense recorded before the budget exists: not backfilled.
    let early = engine
        .create_transaction(
            CreateTransactionCmd::new(
                alice.id,
                account_id,
                TransactionKind::Expense,
                cents(3_000),
                "food",
            )
            .date(date(2024, 3, 2)),
        )
        .await
        .unwrap();
    let budget_id = food_budget(&engine, &alice).await;
    assert_eq!(spent(&engine, &alice, budget_id).await, MoneyCents::ZERO);

    engine
        .create_transaction(
            CreateTransactionCmd::new(
                alice.id,
                account_id,
                TransactionKind::Expense,
                cents(1_000),
                "food",
            )
            .date(date(2024, 3, 3)),
        )
        .await
        .unwrap();
    assert_eq!(spent(&engine, &alice, budget_id).await, cents(1_000));

    engine
        .delete_transaction(early.transaction.id, alice.id)
        .await
        .unwrap();
    assert_eq!(spent(&engine, &alice, budget_id).await, MoneyCents::ZERO);
    assert_eq!(balance(&engine, &alice, account_id).await, cents(9_000));
}

#[tokio::test]
async fn cached_spent_matches_recomputation() {
    let (engine, _db, alice) = engine_with_db().await;
    let account_id = account_with(&engine, &alice, "Main", 100_000).await;
    let budget_id = food_budget(&engine, &alice).await;

    let mut ids = Vec::new();
    for (amount, day, category) in [
        (1_000, 1, "food"),
        (2_500, 9, "food"),
        (700, 15, "rent"),
        (4_200, 31, "food"),
    ] {
        let created = engine
            .create_transaction(
                CreateTransactionCmd::new(
                    alice.id,
                    account_id,
                    TransactionKind::Expense,
                    cents(amount),
                    category,
                )
                .date(date(2024, 3, day)),
            )
            .await
            .unwrap();
        ids.push(created.transaction.id);
    }
    // Outside the budget month.
    engine
        .create_transaction(
            CreateTransactionCmd::new(
                alice.id,
                account_id,
                TransactionKind::Expense,
                cents(9_999),
                "food",
            )
            .date(date(2024, 4, 1)),
        )
        .await
        .unwrap();

    engine
        .update_transaction(UpdateTransactionCmd::new(
            ids[1],
            alice.id,
            account_id,
            TransactionKind::Expense,
            cents(300),
            "food",
            date(2024, 3, 9),
        ))
        .await
        .unwrap();
    engine.delete_transaction(ids[0], alice.id).await.unwrap();

    let audit = engine.audit_budget(budget_id, alice.id).await.unwrap();
    assert_eq!(audit.stored_spent, cents(4_500));
    assert!(audit.is_consistent());
    assert_consistent(&engine, &alice, account_id, 100_000).await;
}

#[tokio::test]
async fn rejects_invalid_input() {
    let (engine, _db, alice) = engine_with_db().await;
    let account_id = account_with(&engine, &alice, "Main", 0).await;

    let zero = engine
        .create_transaction(CreateTransactionCmd::new(
            alice.id,
            account_id,
            TransactionKind::Expense,
            MoneyCents::ZERO,
            "food",
        ))
        .await;
    assert!(matches!(zero, Err(EngineError::InvalidAmount(_))));

    let blank = engine
        .create_transaction(CreateTransactionCmd::new(
            alice.id,
            account_id,
            TransactionKind::Expense,
            cents(100),
            "  ",
        ))
        .await;
    assert!(matches!(blank, Err(EngineError::InvalidName(_))));

    let missing = engine
        .create_transaction(CreateTransactionCmd::new(
            alice.id,
            Uuid::new_v4(),
            TransactionKind::Expense,
            cents(100),
            "food",
        ))
        .await;
    assert!(matches!(missing, Err(EngineError::KeyNotFound(_))));

    assert!(engine.list_transactions(alice.id).await.unwrap().is_empty());
    assert_eq!(balance(&engine, &alice, account_id).await, MoneyCents::ZERO);
}

#[tokio::test]
async fn date_defaults_to_today() {
    let (engine, _db, alice) = engine_with_db().await;
    let account_id = account_with(&engine, &alice, "Main", 0).await;
    let created = engine
        .create_transaction(CreateTransactionCmd::new(
            alice.id,
            account_id,
            TransactionKind::Income,
            cents(100),
            "salary",
        ))
        .await
        .unwrap();
    assert_eq!(
        created.transaction.transaction_date,
        chrono::Utc::now().date_naive()
    );
    let current = BudgetMonth::current();
    assert_eq!(
        BudgetMonth::from_date(created.transaction.transaction_date),
        current
    );
}

#[tokio::test]
async fn failed_write_rolls_back_the_balance() {
    let (engine, db, alice) = engine_with_db().await;
    let account_id = account_with(&engine, &alice, "Main", 10_000).await;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "DROP TABLE transactions",
    ))
    .await
    .unwrap();

    let res = engine
        .create_transaction(
            CreateTransactionCmd::new(
                alice.id,
                account_id,
                TransactionKind::Expense,
                cents(3_000),
                "food",
            )
            .date(date(2024, 3, 5)),
        )
        .await;
    assert!(matches!(res, Err(EngineError::Database(_))));
    assert_eq!(balance(&engine, &alice, account_id).await, cents(10_000));
}

#[tokio::test]
async fn overflowing_balance_is_rejected() {
    let (engine, _db, alice) = engine_with_db().await;
    let account_id = account_with(&engine, &alice, "Main", i64::MAX - 5).await;

    let res = engine
        .create_transaction(CreateTransactionCmd::new(
            alice.id,
            account_id,
            TransactionKind::Income,
            cents(100),
            "salary",
        ))
        .await;
    assert!(matches!(res, Err(EngineError::InvalidAmount(_))));
    assert_eq!(balance(&engine, &alice, account_id).await, cents(i64::MAX - 5));
    assert!(engine.list_transactions(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn overflowing_spent_rolls_back_the_expense() {
    let (engine, _db, alice) = engine_with_db().await;
    let first = account_with(&engine, &alice, "First", i64::MAX).await;
    let second = account_with(&engine, &alice, "Second", i64::MAX).await;
    let budget_id = food_budget(&engine, &alice).await;

    engine
        .create_transaction(
            CreateTransactionCmd::new(
                alice.id,
                first,
                TransactionKind::Expense,
                cents(i64::MAX - 5),
                "food",
            )
            .date(date(2024, 3, 5)),
        )
        .await
        .unwrap();
    assert_eq!(spent(&engine, &alice, budget_id).await, cents(i64::MAX - 5));

    let res = engine
        .create_transaction(
            CreateTransactionCmd::new(alice.id, second, TransactionKind::Expense, cents(100), "food")
                .date(date(2024, 3, 6)),
        )
        .await;
    assert!(matches!(res, Err(EngineError::InvalidAmount(_))));
    assert_eq!(balance(&engine, &alice, second).await, cents(i64::MAX));
    assert_eq!(spent(&engine, &alice, budget_id).await, cents(i64::MAX - 5));
    assert_eq!(engine.list_transactions(alice.id).await.unwrap().len(), 1);

    assert!(matches!(
        engine.total_balance(alice.id).await,
        Err(EngineError::InvalidAmount(_))
    ));
}

#[tokio::test]
async fn listings_are_newest_first_and_range_inclusive() {
    let (engine, _db, alice) = engine_with_db().await;
    let main = account_with(&engine, &alice, "Main", 0).await;
    let cash = account_with(&engine, &alice, "Cash", 0).await;

    for (account, day) in [(main, 3), (cash, 10), (main, 20), (cash, 31)] {
        engine
            .create_transaction(
                CreateTransactionCmd::new(
                    alice.id,
                    account,
                    TransactionKind::Income,
                    cents(100),
                    "gift",
                )
                .date(date(2024, 3, day)),
            )
            .await
            .unwrap();
    }

    let all = engine.list_transactions(alice.id).await.unwrap();
    let days: Vec<_> = all
        .iter()
        .map(|t| t.transaction.transaction_date)
        .collect();
    assert_eq!(
        days,
        vec![date(2024, 3, 31), date(2024, 3, 20), date(2024, 3, 10), date(2024, 3, 3)]
    );

    let on_main = engine
        .list_transactions_for_account(main, alice.id)
        .await
        .unwrap();
    assert_eq!(on_main.len(), 2);
    assert!(on_main.iter().all(|t| t.account.name == "Main"));
    assert_eq!(on_main[0].account.balance, cents(200));

    let ranged = engine
        .list_transactions_in_range(alice.id, date(2024, 3, 10), date(2024, 3, 20))
        .await
        .unwrap();
    assert_eq!(ranged.len(), 2);

    let inverted = engine
        .list_transactions_in_range(alice.id, date(2024, 3, 20), date(2024, 3, 10))
        .await;
    assert!(matches!(inverted, Err(EngineError::InvalidDate(_))));
}

#[tokio::test]
async fn restart_engine_reads_same_state() {
    let (engine, url, path) = engine_with_file_db().await;
    let alice = engine
        .register_user(RegisterUserCmd::new("alice@example.com", "Alice", "password"))
        .await
        .unwrap();
    let account_id = account_with(&engine, &alice, "Main", 10_000).await;
    engine
        .create_transaction(
            CreateTransactionCmd::new(
                alice.id,
                account_id,
                TransactionKind::Expense,
                cents(2_500),
                "food",
            )
            .date(date(2024, 3, 5)),
        )
        .await
        .unwrap();
    drop(engine);

    let db = Database::connect(&url).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    assert_eq!(balance(&engine, &alice, account_id).await, cents(7_500));
    assert_eq!(engine.list_transactions(alice.id).await.unwrap().len(), 1);

    drop(engine);
    let _ = std::fs::remove_file(path);
}
