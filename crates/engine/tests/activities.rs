use engine::{EngineError, Money, NewExpenseCmd};
use uuid::Uuid;

mod common;

#[tokio::test]
async fn create_activity_is_idempotent_by_name() {
    let engine = common::engine().await;

    let first = engine
        .create_activity("Viaje a Málaga", Some("  summer trip "))
        .await
        .unwrap();
    assert!(first.was_created);
    assert_eq!(first.activity.description.as_deref(), Some("summer trip"));

    let second = engine
        .create_activity("viaje a malaga", None)
        .await
        .unwrap();
    assert!(!second.was_created);
    assert_eq!(second.activity.id, first.activity.id);
    assert_eq!(second.activity.name, "Viaje a Málaga");

    assert_eq!(engine.list_activities().await.unwrap().len(), 1);
    let found = engine.activity_by_name("VIAJE A MALAGA").await.unwrap();
    assert_eq!(found.map(|a| a.id), Some(first.activity.id));
    assert!(engine.activity_by_name("Other").await.unwrap().is_none());
}

#[tokio::test]
async fn create_activity_rejects_short_names() {
    let engine = common::engine().await;
    let err = engine.create_activity(" a ", None).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
    assert!(engine.list_activities().await.unwrap().is_empty());
}

#[tokio::test]
async fn roster_keeps_joining_order_and_ignores_duplicates() {
    let engine = common::engine().await;
    let trip = engine.create_activity("Trip", None).await.unwrap().activity;

    let ana = engine.add_user_to_activity(trip.id, "Ana").await.unwrap();
    let luis = engine.add_user_to_activity(trip.id, "Luis").await.unwrap();
    let again = engine.add_user_to_activity(trip.id, "ana").await.unwrap();
    assert_eq!(again.id, ana.id);

    let trip = engine.activity(trip.id).await.unwrap();
    assert_eq!(trip.participants, vec![ana.id, luis.id]);
    assert_eq!(engine.list_users().await.unwrap().len(), 2);

    engine
        .remove_user_from_activity(trip.id, ana.id)
        .await
        .unwrap();
    let carlos = engine.add_user_to_activity(trip.id, "Carlos").await.unwrap();
    let again = engine.add_user_to_activity(trip.id, "Ana").await.unwrap();
    assert_eq!(again.id, ana.id);

    let trip = engine.activity(trip.id).await.unwrap();
    assert_eq!(trip.participants, vec![luis.id, carlos.id, ana.id]);
}

#[tokio::test]
async fn join_unknown_activity_fails() {
    let engine = common::engine().await;
    let err = engine
        .add_user_to_activity(Uuid::new_v4(), "Ana")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    // Nothing is created when the activity is missing.
    assert!(engine.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_activity_removes_expenses() {
    let engine = common::engine().await;
    let trip = engine.create_activity("Trip", None).await.unwrap().activity;
    let other = engine.create_activity("Dinner", None).await.unwrap().activity;
    let ana = engine.add_user_to_activity(trip.id, "Ana").await.unwrap();
    let luis = engine.add_user_to_activity(trip.id, "Luis").await.unwrap();
    engine.add_user_to_activity(other.id, "Ana").await.unwrap();

    let expense = engine
        .create_expense(
            NewExpenseCmd::new(trip.id, "Hotel", Money::new(100_00), ana.id).participant(luis.id),
        )
        .await
        .unwrap();
    engine
        .create_expense(NewExpenseCmd::new(other.id, "Pizza", Money::new(20_00), ana.id))
        .await
        .unwrap();

    engine.delete_activity(trip.id).await.unwrap();

    assert!(matches!(
        engine.activity(trip.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.expense(expense.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert_eq!(engine.activity_expenses(other.id).await.unwrap().len(), 1);
    // Users survive their activities.
    assert_eq!(engine.list_users().await.unwrap().len(), 2);
    // Luis no longer has expenses and can go.
    engine.delete_user(luis.id).await.unwrap();
}

#[tokio::test]
async fn reset_clears_everything() {
    let engine = common::engine().await;
    let trip = engine.create_activity("Trip", None).await.unwrap().activity;
    let ana = engine.add_user_to_activity(trip.id, "Ana").await.unwrap();
    engine
        .create_expense(NewExpenseCmd::new(trip.id, "Taxi", Money::new(12_00), ana.id))
        .await
        .unwrap();

    engine.reset().await.unwrap();

    assert!(engine.list_users().await.unwrap().is_empty());
    assert!(engine.list_activities().await.unwrap().is_empty());
    assert!(engine.user_expenses(ana.id).await.unwrap().is_empty());
}
