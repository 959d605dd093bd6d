use crate::modules::live_roster::session::SessionOptions;
use crate::modules::live_roster::use_cases::errors::ActionKind;
use crate::modules::live_roster::use_cases::search_products::handler::SearchOutcome;
use crate::modules::live_roster::use_cases::sync_room_events::backoff::ReconnectPolicy;
use crate::modules::live_roster::use_cases::sync_room_events::supervisor::ConnectionState;
use crate::shared::core::primitives::RoomId;
use crate::shared::infrastructure::backend::in_memory::InMemoryRosterBackend;
use crate::shared::infrastructure::backend::wire::entry_json;
use crate::shared::infrastructure::realtime::ControlMessage;
use crate::shared::infrastructure::realtime::frames::{PRODUCT_ADDED, PRODUCT_PINNED, push_frame};
use crate::shared::infrastructure::realtime::in_memory::InMemoryRealtime;
use crate::tests::fixtures::entries::{
    LAMP_ENTRY_ID, LAMP_PRODUCT_ID, OTHER_ROOM_ID, PRODUCT_ID, ROOM_ID, RosterEntryBuilder, T2,
};
use crate::tests::fixtures::session::SessionHarness;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn added_frame(room_id: &str, entry_id: &str) -> String {
    let entry = RosterEntryBuilder::new()
        .entry_id(entry_id)
        .added_at(T2)
        .build();
    push_frame(
        PRODUCT_ADDED,
        json!({ "roomId": room_id, "entry": entry_json(&entry) }),
    )
}

fn pinned_frame(entry_id: &str) -> String {
    push_frame(PRODUCT_PINNED, json!({ "roomId": ROOM_ID, "entryId": entry_id }))
}

#[tokio::test]
async fn adds_a_product_only_when_the_push_arrives() {
    let hub = InMemoryRealtime::new();
    let backend = Arc::new(InMemoryRosterBackend::new());
    backend
        .seed_products(vec![RosterEntryBuilder::new().build().product])
        .await;
    let harness =
        SessionHarness::mount_on(backend.clone(), hub.clone(), SessionHarness::fast_options())
            .await;
    harness
        .wait_for_sync(|status| status.state == ConnectionState::Joined)
        .await;
    harness
        .wait_for_roster(|view| view.status.synced_joins >= 1)
        .await;

    harness.session.add_product(PRODUCT_ID).await.unwrap();

    assert!(harness.session.roster().is_empty());
    let stored = backend.room(ROOM_ID).await;
    assert_eq!(stored.len(), 1);

    hub.publish(push_frame(
        PRODUCT_ADDED,
        json!({ "roomId": ROOM_ID, "entry": entry_json(&stored[0]) }),
    ))
    .await;

    let view = harness
        .wait_for_roster(|view| !view.roster.is_empty())
        .await;
    assert_eq!(view.roster.entries()[0].product.name, "Ceramic Mug");
    assert!(!view.status.is_pending(ActionKind::Add));
    harness.session.close().await;
}

#[tokio::test]
async fn keeps_a_single_pin_across_the_roster() {
    let harness = SessionHarness::mount(SessionHarness::fast_options()).await;

    harness.session.pin(LAMP_ENTRY_ID).await.unwrap();
    harness
        .wait_for_roster(|view| view.roster.pinned().is_some())
        .await;

    harness.session.add_product(PRODUCT_ID).await.unwrap();
    harness
        .wait_for_roster(|view| view.roster.find(PRODUCT_ID).is_some())
        .await;
    harness.session.pin(PRODUCT_ID).await.unwrap();
    let view = harness
        .wait_for_roster(|view| {
            view.roster
                .pinned()
                .is_some_and(|entry| entry.product_id() == PRODUCT_ID)
        })
        .await;

    assert_eq!(
        view.roster
            .entries()
            .iter()
            .filter(|entry| entry.is_pinned)
            .count(),
        1
    );
    assert_eq!(view.roster.entries()[0].product_id(), PRODUCT_ID);

    harness.session.unpin(PRODUCT_ID).await.unwrap();
    harness
        .wait_for_roster(|view| view.roster.pinned().is_none())
        .await;
    harness.session.close().await;
}

#[tokio::test]
async fn removes_an_entry_through_its_product_reference() {
    let harness = SessionHarness::mount(SessionHarness::fast_options()).await;
    let lamp = harness.session.roster().entries()[0].clone();

    harness.session.remove_product(&lamp).await.unwrap();

    harness
        .wait_for_roster(|view| view.roster.is_empty())
        .await;
    assert!(harness.backend.room(ROOM_ID).await.is_empty());
    harness.session.close().await;
}

#[tokio::test]
async fn ignores_pushes_for_other_rooms_and_duplicates() {
    let harness = SessionHarness::mount(SessionHarness::fast_options()).await;

    harness.hub.publish(added_frame(OTHER_ROOM_ID, "entry-foreign")).await;
    harness.hub.publish(added_frame(ROOM_ID, "entry-mug")).await;
    harness.hub.publish(added_frame(ROOM_ID, "entry-mug")).await;
    // Frames are routed in order, so the pin marks the end of the batch.
    harness.hub.publish(pinned_frame(LAMP_ENTRY_ID)).await;

    let view = harness
        .wait_for_roster(|view| view.roster.pinned().is_some())
        .await;
    assert_eq!(view.roster.entry_ids(), vec![LAMP_ENTRY_ID, "entry-mug"]);
    assert!(view.roster.find("entry-foreign").is_none());
    harness.session.close().await;
}

#[tokio::test]
async fn resyncs_the_roster_after_rejoining() {
    let options = SessionOptions {
        reconnect: ReconnectPolicy {
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            surface_after_attempts: 5,
            stable_after: Duration::from_secs(5),
        },
        ..SessionHarness::fast_options()
    };
    let harness = SessionHarness::mount(options).await;
    let fetches_before = harness.roster_fetches().await;

    harness.hub.fail_next_connects(2).await;
    // Changes made while disconnected never reach this client as pushes.
    harness.backend.seed_room(ROOM_ID, Vec::new()).await;
    harness.hub.drop_connections().await;

    harness.wait_for_sync(|status| status.joins >= 2).await;
    let view = harness
        .wait_for_roster(|view| view.status.synced_joins >= 2)
        .await;
    assert!(view.roster.is_empty());

    let room = RoomId::parse(ROOM_ID).unwrap();
    let joins = harness
        .hub
        .sent()
        .await
        .into_iter()
        .filter(|message| *message == ControlMessage::join(&room))
        .count();
    assert_eq!(joins, 2);
    assert_eq!(harness.roster_fetches().await, fetches_before + 1);
    assert!(harness.notifier.delivered().is_empty());
    harness.session.close().await;
}

#[tokio::test]
async fn leaves_the_room_and_ignores_late_updates_after_close() {
    let harness = SessionHarness::mount(SessionHarness::fast_options()).await;
    let room = RoomId::parse(ROOM_ID).unwrap();

    harness.session.close().await;
    harness.session.close().await;

    assert_eq!(harness.hub.sent().await.last(), Some(&ControlMessage::leave(&room)));
    assert_eq!(harness.hub.closed().await, 1);
    assert_eq!(harness.session.connection_state(), ConnectionState::Closed);

    harness.backend.seed_room(ROOM_ID, Vec::new()).await;
    let _ = harness.session.refresh().await;
    assert_eq!(harness.session.roster().entry_ids(), vec![LAMP_ENTRY_ID]);
}

#[tokio::test]
async fn searches_the_catalog_through_the_session() {
    let harness = SessionHarness::mount(SessionHarness::fast_options()).await;
    let results = harness.session.search_results();

    let outcome = harness.session.search("lamp").await.unwrap();

    match outcome {
        SearchOutcome::Applied(products) => {
            assert_eq!(products.len(), 1);
            assert_eq!(products[0].product_id, LAMP_PRODUCT_ID);
        }
        other => panic!("expected applied results, got {other:?}"),
    }
    assert_eq!(results.borrow().query, "lamp");
    assert_eq!(harness.session.search("").await.unwrap(), SearchOutcome::Cleared);
    assert!(results.borrow().products.is_empty());
    harness.session.close().await;
}
