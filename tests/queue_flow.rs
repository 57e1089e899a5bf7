use axum_barbershop_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::queue::{CompleteRequest, EnqueueRequest, MoveDirection, ProductLine},
    entity::{
        barbers::ActiveModel as BarberActive, items::ActiveModel as ItemActive,
        items::Entity as Items, queue_entries::Entity as QueueEntries,
        services::ActiveModel as ServiceActive, users::ActiveModel as UserActive,
    },
    error::AppError,
    fees::{FeeTable, PaymentMethod},
    middleware::auth::AuthUser,
    models::EntryStatus,
    notify::Notifier,
    routes::params::SnapshotQuery,
    services::{queue_service, settlement_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: customers join a barber's line, the admin reorders and
// settles visits, and every invariant the ledger promises holds up.
#[tokio::test]
async fn enqueue_reorder_and_settle_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let admin_id = create_user(&state, "admin", "admin@example.com").await?;
    let customer_a = create_user(&state, "customer", "a@example.com").await?;
    let customer_b = create_user(&state, "customer", "b@example.com").await?;
    let customer_c = create_user(&state, "customer", "c@example.com").await?;

    let barber_id = create_barber(&state, "Marcos", "active", "open").await?;
    let closed_barber_id = create_barber(&state, "Rafael", "active", "closed").await?;
    let inactive_barber_id = create_barber(&state, "Diego", "inactive", "open").await?;

    let haircut = create_service(&state, "Haircut", 4_500, 30).await?;
    let beard = create_service(&state, "Beard Trim", 2_500, 20).await?;

    let pomade = ItemActive {
        id: Set(Uuid::new_v4()),
        name: Set("Pomade".into()),
        price_cents: Set(3_000),
        stock: Set(3),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };
    let auth_a = AuthUser {
        user_id: customer_a,
        role: "customer".into(),
    };
    let auth_b = AuthUser {
        user_id: customer_b,
        role: "customer".into(),
    };
    let auth_c = AuthUser {
        user_id: customer_c,
        role: "customer".into(),
    };

    // A then B join the same line.
    let entry_a = queue_service::enqueue(
        &state,
        &auth_a,
        EnqueueRequest {
            barber_id,
            service_ids: vec![haircut],
            user_id: None,
        },
    )
    .await?
    .data
    .unwrap()
    .entry;
    let entry_b = queue_service::enqueue(
        &state,
        &auth_b,
        EnqueueRequest {
            barber_id,
            service_ids: vec![haircut, beard],
            user_id: None,
        },
    )
    .await?
    .data
    .unwrap()
    .entry;

    let snap = snapshot(&state, barber_id).await?;
    assert_eq!(snap.len(), 2);
    assert_eq!(snap[0].id, entry_a.id);
    assert_eq!((snap[0].position, snap[0].estimated_wait_minutes), (1, 0));
    assert_eq!(snap[1].id, entry_b.id);
    // B waits exactly A's requested time.
    assert_eq!((snap[1].position, snap[1].estimated_wait_minutes), (2, 30));

    // A is already waiting; a second admission anywhere is a conflict.
    let err = queue_service::enqueue(
        &state,
        &auth_a,
        EnqueueRequest {
            barber_id: closed_barber_id,
            service_ids: vec![haircut],
            user_id: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Closed or inactive barbers admit nobody.
    for bad_barber in [closed_barber_id, inactive_barber_id] {
        let err = queue_service::enqueue(
            &state,
            &auth_c,
            EnqueueRequest {
                barber_id: bad_barber,
                service_ids: vec![haircut],
                user_id: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    // Moving the last entry down is a boundary error and changes nothing.
    let err = queue_service::move_entry(&state, &admin, entry_b.id, MoveDirection::Down)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let snap = snapshot(&state, barber_id).await?;
    assert_eq!(snap[0].id, entry_a.id);
    assert_eq!(snap[1].id, entry_b.id);

    // Swap B to the front.
    queue_service::move_entry(&state, &admin, entry_b.id, MoveDirection::Up).await?;
    let snap = snapshot(&state, barber_id).await?;
    assert_eq!(snap[0].id, entry_b.id);
    assert_eq!((snap[0].position, snap[0].estimated_wait_minutes), (1, 0));
    assert_eq!(snap[1].id, entry_a.id);
    assert_eq!((snap[1].position, snap[1].estimated_wait_minutes), (2, 50));

    // Settle B: one queued service, one extra, two units of pomade, credit 2x.
    let settled = settlement_service::complete(
        &state,
        &admin,
        entry_b.id,
        CompleteRequest {
            service_ids: vec![haircut],
            extra_service_ids: vec![beard],
            products: vec![ProductLine {
                item_id: pomade.id,
                quantity: 2,
            }],
            payment_method: PaymentMethod::CreditCard,
            installments: Some(2),
        },
    )
    .await?
    .data
    .unwrap();

    // 4500 + 2500 + 2 * 3000 at 4.5%.
    assert_eq!(settled.history.gross_cents, 13_000);
    assert_eq!(settled.history.fee_cents, 585);
    assert_eq!(settled.history.net_cents, 12_415);
    assert_eq!(settled.history.installments, 2);

    // The persisted lines independently re-add to the gross.
    let recomputed: i64 = settled.services.iter().map(|s| s.price_cents).sum::<i64>()
        + settled
            .items
            .iter()
            .map(|i| i.unit_price_cents * i.quantity as i64)
            .sum::<i64>();
    assert_eq!(recomputed, settled.history.gross_cents);
    assert_eq!(settled.services.iter().filter(|s| s.is_extra).count(), 1);

    let stock = item_stock(&state, pomade.id).await?;
    assert_eq!(stock, 1);

    // Completing the same entry twice must not double-apply.
    let err = settlement_service::complete(
        &state,
        &admin,
        entry_b.id,
        CompleteRequest {
            service_ids: vec![haircut],
            extra_service_ids: vec![],
            products: vec![],
            payment_method: PaymentMethod::Cash,
            installments: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    // Over-drawing stock aborts the whole settlement: A stays waiting and
    // the shelf count is untouched.
    let err = settlement_service::complete(
        &state,
        &admin,
        entry_a.id,
        CompleteRequest {
            service_ids: vec![haircut],
            extra_service_ids: vec![],
            products: vec![ProductLine {
                item_id: pomade.id,
                quantity: 5,
            }],
            payment_method: PaymentMethod::Cash,
            installments: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(item_stock(&state, pomade.id).await?, 1);
    let entry = QueueEntries::find_by_id(entry_a.id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(entry.status, EntryStatus::Waiting.as_str());

    // Cash settles at face value.
    let settled = settlement_service::complete(
        &state,
        &admin,
        entry_a.id,
        CompleteRequest {
            service_ids: vec![haircut],
            extra_service_ids: vec![],
            products: vec![],
            payment_method: PaymentMethod::Cash,
            installments: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(settled.history.fee_cents, 0);
    assert_eq!(settled.history.net_cents, settled.history.gross_cents);

    // Cancel: once is fine, twice is a terminal-state error, unknown is 404.
    let entry_c = queue_service::enqueue(
        &state,
        &auth_c,
        EnqueueRequest {
            barber_id,
            service_ids: vec![haircut, beard],
            user_id: None,
        },
    )
    .await?
    .data
    .unwrap()
    .entry;

    // Pre-completion edit: trim one service, but never the last one.
    queue_service::remove_queued_service(&state, &admin, entry_c.id, beard).await?;
    let err = queue_service::remove_queued_service(&state, &admin, entry_c.id, haircut)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let snap = snapshot(&state, barber_id).await?;
    assert_eq!(snap[0].services.len(), 1);

    queue_service::cancel(&state, &auth_c, entry_c.id).await?;
    let err = queue_service::cancel(&state, &auth_c, entry_c.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    let err = queue_service::cancel(&state, &admin, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Cancelled entries never reach the ledger snapshot.
    let snap = snapshot(&state, barber_id).await?;
    assert!(snap.is_empty());

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    let pool = create_pool(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE history_items, history_services, histories, queue_services, queue_entries, items, services, barbers, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        fees: FeeTable::default(),
        notifier: Notifier::new(false),
    })
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        name: Set(email.split('@').next().unwrap_or("user").to_string()),
        phone: Set(None),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn create_barber(
    state: &AppState,
    name: &str,
    status: &str,
    queue_status: &str,
) -> anyhow::Result<Uuid> {
    let barber = BarberActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        status: Set(status.to_string()),
        queue_status: Set(queue_status.to_string()),
        commission_rate_bps: Set(4_000),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(barber.id)
}

async fn create_service(
    state: &AppState,
    name: &str,
    price_cents: i64,
    average_minutes: i32,
) -> anyhow::Result<Uuid> {
    let service = ServiceActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        price_cents: Set(price_cents),
        average_minutes: Set(average_minutes),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(service.id)
}

async fn snapshot(
    state: &AppState,
    barber_id: Uuid,
) -> anyhow::Result<Vec<axum_barbershop_api::dto::queue::SnapshotEntry>> {
    let resp = queue_service::snapshot(
        state,
        SnapshotQuery {
            barber_id: Some(barber_id),
        },
    )
    .await?;
    Ok(resp.data.unwrap().items)
}

async fn item_stock(state: &AppState, item_id: Uuid) -> anyhow::Result<i32> {
    let item = Items::find_by_id(item_id)
        .one(&state.orm)
        .await?
        .expect("item exists");
    Ok(item.stock)
}
