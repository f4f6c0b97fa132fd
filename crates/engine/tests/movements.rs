use chrono::{TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Engine, EngineError, Identity, MovementKind, MovementNew, MovementPatch, Role, UserNew,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .password_cost(4)
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn identity(engine: &Engine, name: &str, role: Role) -> Identity {
    let user = engine
        .create_user(UserNew {
            name: Some(name.to_string()),
            email: format!("{name}@example.com"),
            role,
            phone: None,
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    Identity::new(user.id.to_string(), user.role)
}

fn new_movement(concept: &str, amount_minor: i64, kind: MovementKind, month: u32) -> MovementNew {
    MovementNew {
        concept: concept.to_string(),
        amount_minor,
        kind,
        date: Utc.with_ymd_and_hms(2025, month, 1, 0, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn create_stamps_the_requester_as_owner() {
    let (engine, _db) = engine_with_db().await;
    let admin = identity(&engine, "ana", Role::Admin).await;

    let movement = engine
        .create_movement(
            new_movement("Salary", 245_000, MovementKind::Income, 3),
            &admin,
        )
        .await
        .unwrap();

    assert_eq!(movement.user_id, admin.user_id);
    assert_eq!(movement.user_name.as_deref(), Some("ana"));
    assert_eq!(movement.concept, "Salary");
    assert_eq!(engine.movement(movement.id).await.unwrap(), movement);
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let (engine, _db) = engine_with_db().await;
    let admin = identity(&engine, "ana", Role::Admin).await;

    let err = engine
        .create_movement(new_movement("Rent", 0, MovementKind::Expense, 3), &admin)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_movement(new_movement("   ", 100, MovementKind::Expense, 3), &admin)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidConcept(_)));

    assert!(engine.list_movements().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_is_most_recent_first() {
    let (engine, _db) = engine_with_db().await;
    let admin = identity(&engine, "ana", Role::Admin).await;

    for (concept, month) in [("jan", 1), ("mar", 3), ("feb", 2)] {
        engine
            .create_movement(new_movement(concept, 100, MovementKind::Income, month), &admin)
            .await
            .unwrap();
    }

    let concepts: Vec<_> = engine
        .list_movements()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.concept)
        .collect();
    assert_eq!(concepts, ["mar", "feb", "jan"]);
}

#[tokio::test]
async fn pages_are_bounded_and_report_the_full_total() {
    let (engine, _db) = engine_with_db().await;
    let admin = identity(&engine, "ana", Role::Admin).await;

    for month in 1..=12 {
        engine
            .create_movement(new_movement("m", 100, MovementKind::Expense, month), &admin)
            .await
            .unwrap();
    }

    let first = engine.list_movements_page(1, 5).await.unwrap();
    let last = engine.list_movements_page(3, 5).await.unwrap();
    let beyond = engine.list_movements_page(9, 5).await.unwrap();

    assert_eq!(first.items.len(), 5);
    assert_eq!(last.items.len(), 2);
    assert!(beyond.items.is_empty());
    assert_eq!((first.total, last.total, beyond.total), (12, 12, 12));
    assert!(first.items[0].date > first.items[4].date);
}

#[tokio::test]
async fn page_arguments_out_of_range_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    for (page, size) in [(0, 10), (1, 0), (1, 101)] {
        let err = engine.list_movements_page(page, size).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidPage(_)));
    }
}

#[tokio::test]
async fn owner_can_update_own_movement() {
    let (engine, _db) = engine_with_db().await;
    let admin = identity(&engine, "ana", Role::Admin).await;
    let bob = identity(&engine, "bob", Role::User).await;

    let created = engine
        .create_movement(new_movement("Groceries", 4_000, MovementKind::Expense, 3), &admin)
        .await
        .unwrap();
    let owner_as_user = Identity::new(created.user_id.clone(), Role::User);

    let updated = engine
        .update_movement(
            created.id,
            MovementPatch {
                amount_minor: Some(4_500),
                ..Default::default()
            },
            &owner_as_user,
        )
        .await
        .unwrap();
    assert_eq!(updated.amount_minor, 4_500);
    assert_eq!(updated.concept, "Groceries");
    assert_eq!(updated.user_id, admin.user_id);

    let err = engine
        .update_movement(created.id, MovementPatch::default(), &bob)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn non_owner_cannot_mutate_and_row_is_unchanged() {
    let (engine, _db) = engine_with_db().await;
    let admin = identity(&engine, "ana", Role::Admin).await;
    let bob = identity(&engine, "bob", Role::User).await;

    let created = engine
        .create_movement(new_movement("Rent", 85_000, MovementKind::Expense, 3), &admin)
        .await
        .unwrap();

    let err = engine
        .update_movement(
            created.id,
            MovementPatch {
                concept: Some("hijacked".to_string()),
                ..Default::default()
            },
            &bob,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine.delete_movement(created.id, &bob).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    assert_eq!(engine.movement(created.id).await.unwrap(), created);
}

#[tokio::test]
async fn missing_movement_is_not_found_for_every_role() {
    let (engine, _db) = engine_with_db().await;
    let admin = identity(&engine, "ana", Role::Admin).await;
    let bob = identity(&engine, "bob", Role::User).await;
    let missing = Uuid::new_v4();

    for who in [&admin, &bob] {
        let err = engine
            .update_movement(missing, MovementPatch::default(), who)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::KeyNotFound(_)));

        let err = engine.delete_movement(missing, who).await.unwrap_err();
        assert!(matches!(err, EngineError::KeyNotFound(_)));
    }

    let err = engine.movement(missing).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn admin_can_delete_any_movement() {
    let (engine, _db) = engine_with_db().await;
    let admin = identity(&engine, "ana", Role::Admin).await;
    let other_admin = identity(&engine, "carla", Role::Admin).await;

    let created = engine
        .create_movement(new_movement("Gym", 3_500, MovementKind::Expense, 4), &admin)
        .await
        .unwrap();

    engine.delete_movement(created.id, &other_admin).await.unwrap();

    let err = engine.movement(created.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine
        .delete_movement(created.id, &other_admin)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn report_covers_every_owner() {
    let (engine, _db) = engine_with_db().await;
    let admin = identity(&engine, "ana", Role::Admin).await;
    let other_admin = identity(&engine, "carla", Role::Admin).await;

    engine
        .create_movement(new_movement("Salary", 100, MovementKind::Income, 1), &admin)
        .await
        .unwrap();
    engine
        .create_movement(new_movement("Rent", 30, MovementKind::Expense, 3), &other_admin)
        .await
        .unwrap();
    engine
        .create_movement(new_movement("Food", 50, MovementKind::Expense, 3), &admin)
        .await
        .unwrap();

    let report = engine.report().await.unwrap();
    assert_eq!(report.balance.income, 100);
    assert_eq!(report.balance.expense, 80);
    assert_eq!(report.balance.balance, 20);

    let months: Vec<_> = report.chart_data.iter().map(|p| p.month.as_str()).collect();
    assert_eq!(months, ["2025-01", "2025-03"]);
    assert_eq!(report.chart_data[1].expense, 80);

    assert_eq!(engine.balance_report(None).await.unwrap(), report.balance);
    assert_eq!(engine.chart_report(None).await.unwrap(), report.chart_data);
}

#[tokio::test]
async fn pages_far_past_the_end_are_empty() {
    let (engine, _db) = engine_with_db().await;
    let admin = identity(&engine, "ana", Role::Admin).await;
    for month in 1..=3 {
        engine
            .create_movement(new_movement("m", 100, MovementKind::Expense, month), &admin)
            .await
            .unwrap();
    }

    for (page, page_size) in [
        (100_000_000_000_000_000, 100),
        (u64::MAX, 100),
        (u64::MAX, 1),
        (i64::MAX as u64 + 2, 1),
    ] {
        let listed = engine.list_movements_page(page, page_size).await.unwrap();
        assert!(listed.items.is_empty(), "page {page} size {page_size}");
        assert_eq!(listed.total, 3);
    }
}

#[tokio::test]
async fn smallest_and_largest_page_sizes_are_served() {
    let (engine, _db) = engine_with_db().await;
    let admin = identity(&engine, "ana", Role::Admin).await;
    for month in 1..=12 {
        let concept = format!("m{month}");
        engine
            .create_movement(new_movement(&concept, 100, MovementKind::Income, month), &admin)
            .await
            .unwrap();
    }

    let single = engine.list_movements_page(2, 1).await.unwrap();
    assert_eq!(single.items.len(), 1);
    assert_eq!(single.items[0].concept, "m11");

    let last_single = engine.list_movements_page(12, 1).await.unwrap();
    assert_eq!(last_single.items[0].concept, "m1");
    assert!(engine.list_movements_page(13, 1).await.unwrap().items.is_empty());

    let whole = engine.list_movements_page(1, 100).await.unwrap();
    assert_eq!(whole.items.len(), 12);
    assert_eq!(whole.total, 12);
    assert!(engine.list_movements_page(2, 100).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn report_totals_beyond_i64_stay_exact() {
    let (engine, _db) = engine_with_db().await;
    let admin = identity(&engine, "ana", Role::Admin).await;
    let big = i64::MAX / 2 + 1;

    for month in [1, 1] {
        engine
            .create_movement(new_movement("Windfall", big, MovementKind::Income, month), &admin)
            .await
            .unwrap();
    }
    engine
        .create_movement(new_movement("Yacht", i64::MAX, MovementKind::Expense, 2), &admin)
        .await
        .unwrap();

    let report = engine.report().await.unwrap();
    assert_eq!(report.balance.income, 2 * i128::from(big));
    assert_eq!(report.balance.income, i128::from(i64::MAX) + 1);
    assert_eq!(report.balance.expense, i128::from(i64::MAX));
    assert_eq!(report.balance.balance, 1);
    assert_eq!(report.chart_data[0].income, 2 * i128::from(big));
    assert_eq!(report.chart_data[1].expense, i128::from(i64::MAX));
}

#[tokio::test]
async fn replace_movements_swaps_the_whole_set() {
    let (engine, _db) = engine_with_db().await;
    let ana = identity(&engine, "ana", Role::Admin).await;
    let bob = identity(&engine, "bob", Role::User).await;
    for month in 1..=4 {
        engine
            .create_movement(new_movement("old", 100, MovementKind::Expense, month), &ana)
            .await
            .unwrap();
    }

    let removed = engine
        .replace_movements(vec![
            (new_movement("Salary", 245_000, MovementKind::Income, 5), ana.clone()),
            (new_movement("Rent", 85_000, MovementKind::Expense, 6), bob.clone()),
        ])
        .await
        .unwrap();
    assert_eq!(removed, 4);

    let stored = engine.list_movements().await.unwrap();
    let summary: Vec<_> = stored
        .iter()
        .map(|m| (m.concept.as_str(), m.user_id.as_str()))
        .collect();
    assert_eq!(
        summary,
        [("Rent", bob.user_id.as_str()), ("Salary", ana.user_id.as_str())]
    );
}

#[tokio::test]
async fn replace_movements_keeps_the_old_set_on_invalid_input() {
    let (engine, _db) = engine_with_db().await;
    let ana = identity(&engine, "ana", Role::Admin).await;
    engine
        .create_movement(new_movement("old", 100, MovementKind::Expense, 1), &ana)
        .await
        .unwrap();

    let err = engine
        .replace_movements(vec![
            (new_movement("Salary", 245_000, MovementKind::Income, 5), ana.clone()),
            (new_movement("Broken", 0, MovementKind::Expense, 6), ana.clone()),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let stored = engine.list_movements().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].concept, "old");
}
