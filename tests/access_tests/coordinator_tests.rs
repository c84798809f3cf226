//! Tests for the access request flow
//!
//! These tests verify:
//! - Approve / deny round trips and slot clearing
//! - Single-slot overwrite (last requester wins)
//! - Verdicts with nothing pending are dropped
//! - Disconnects never resolve a pending request
//! - PendingSlot primitives

use std::sync::Arc;
use std::thread;

use crossbeam::channel::Receiver;
use keyward::access::{AccessState, PendingRequest, PendingSlot, Resolution};
use keyward::clients::{ClientHandle, ClientId, ClientRegistry};
use keyward::protocol::{ServerMessage, Verdict};
use keyward::store::OwnershipStore;

// =============================================================================
// Helper Functions
// =============================================================================

struct Fixture {
    registry: Arc<ClientRegistry>,
    store: OwnershipStore,
    owner: ClientId,
    owner_rx: Receiver<ServerMessage>,
}

fn connect(registry: &ClientRegistry) -> (ClientId, Receiver<ServerMessage>) {
    let (handle, rx) = ClientHandle::channel(registry.next_id(), "test-peer", 256);
    let id = handle.id();
    registry.register(handle, Vec::new()).unwrap();
    rx.try_recv().unwrap(); // snapshot
    (id, rx)
}

fn drain(rx: &Receiver<ServerMessage>) -> Vec<ServerMessage> {
    rx.try_iter().collect()
}

/// A store with `car = toyota` owned by a fresh client
fn setup_with_car() -> Fixture {
    let registry = Arc::new(ClientRegistry::new());
    let store = OwnershipStore::new(Arc::clone(&registry));
    let (owner, owner_rx) = connect(&registry);
    store.add("car", "toyota", owner).unwrap();
    drain(&owner_rx);

    Fixture {
        registry,
        store,
        owner,
        owner_rx,
    }
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_approve_delivers_value() {
    let f = setup_with_car();
    let (requester, requester_rx) = connect(&f.registry);

    f.store.get("car", requester).unwrap();
    assert_eq!(
        drain(&f.owner_rx),
        vec![ServerMessage::AccessRequested { key: "car".into() }]
    );

    let resolution = f.store.resolve("car", Verdict::Approve);

    assert_eq!(
        resolution,
        Resolution::Delivered { requester, verdict: Verdict::Approve }
    );
    assert_eq!(
        drain(&requester_rx),
        vec![ServerMessage::Approved { value: "toyota".into() }]
    );
    assert_eq!(f.store.access_state("car"), Some(AccessState::Idle));
}

#[test]
fn test_deny_delivers_denial() {
    let f = setup_with_car();
    let (requester, requester_rx) = connect(&f.registry);

    f.store.get("car", requester).unwrap();
    let resolution = f.store.resolve("car", Verdict::Deny);

    assert_eq!(
        resolution,
        Resolution::Delivered { requester, verdict: Verdict::Deny }
    );
    assert_eq!(drain(&requester_rx), vec![ServerMessage::Denied]);
    assert_eq!(f.store.access_state("car"), Some(AccessState::Idle));
}

#[test]
fn test_second_verdict_is_dropped() {
    let f = setup_with_car();
    let (requester, requester_rx) = connect(&f.registry);

    f.store.get("car", requester).unwrap();
    f.store.resolve("car", Verdict::Deny);
    let second = f.store.resolve("car", Verdict::Approve);

    assert_eq!(second, Resolution::NoPendingRequest);
    assert_eq!(drain(&requester_rx), vec![ServerMessage::Denied]);
}

#[test]
fn test_verdict_without_request_is_dropped() {
    let f = setup_with_car();
    let (_other, other_rx) = connect(&f.registry);

    assert_eq!(
        f.store.resolve("car", Verdict::Approve),
        Resolution::NoPendingRequest
    );
    assert!(drain(&other_rx).is_empty());
    assert!(drain(&f.owner_rx).is_empty());
}

#[test]
fn test_verdict_for_missing_key_is_dropped() {
    let f = setup_with_car();

    assert_eq!(
        f.store.resolve("ghost", Verdict::Approve),
        Resolution::NoPendingRequest
    );
}

// =============================================================================
// Single Slot Tests
// =============================================================================

#[test]
fn test_second_requester_overwrites_first() {
    let f = setup_with_car();
    let (r1, r1_rx) = connect(&f.registry);
    let (r2, r2_rx) = connect(&f.registry);

    f.store.get("car", r1).unwrap();
    f.store.get("car", r2).unwrap();

    // The owner is asked twice
    assert_eq!(drain(&f.owner_rx).len(), 2);
    assert_eq!(
        f.store.access_state("car"),
        Some(AccessState::AwaitingOwnerDecision { requester: r2 })
    );

    f.store.resolve("car", Verdict::Approve);

    assert!(drain(&r1_rx).is_empty());
    assert_eq!(
        drain(&r2_rx),
        vec![ServerMessage::Approved { value: "toyota".into() }]
    );
    assert_eq!(f.store.access_state("car"), Some(AccessState::Idle));
}

#[test]
fn test_pending_requests_are_per_key() {
    let f = setup_with_car();
    f.store.add("bike", "bmx", f.owner).unwrap();
    let (r1, r1_rx) = connect(&f.registry);
    let (r2, r2_rx) = connect(&f.registry);

    f.store.get("car", r1).unwrap();
    f.store.get("bike", r2).unwrap();
    f.store.resolve("bike", Verdict::Approve);

    assert!(drain(&r1_rx).is_empty());
    assert_eq!(
        drain(&r2_rx),
        vec![ServerMessage::Approved { value: "bmx".into() }]
    );
    assert_eq!(
        f.store.access_state("car"),
        Some(AccessState::AwaitingOwnerDecision { requester: r1 })
    );
}

// =============================================================================
// Disconnect Tests
// =============================================================================

#[test]
fn test_requester_disconnect_leaves_slot_pending() {
    let f = setup_with_car();
    let (requester, _rx) = connect(&f.registry);

    f.store.get("car", requester).unwrap();
    f.registry.unregister(requester);

    assert_eq!(
        f.store.access_state("car"),
        Some(AccessState::AwaitingOwnerDecision { requester })
    );

    // The verdict still consumes the slot, but has nobody to reach
    assert_eq!(
        f.store.resolve("car", Verdict::Approve),
        Resolution::RequesterGone { requester }
    );
    assert_eq!(f.store.access_state("car"), Some(AccessState::Idle));
}

#[test]
fn test_owner_disconnect_leaves_slot_pending() {
    let f = setup_with_car();
    let (requester, requester_rx) = connect(&f.registry);
    let Fixture { registry, store, owner, owner_rx } = f;

    drop(owner_rx);
    registry.unregister(owner);
    store.get("car", requester).unwrap();

    assert_eq!(
        store.access_state("car"),
        Some(AccessState::AwaitingOwnerDecision { requester })
    );
    assert!(drain(&requester_rx).is_empty());
}

// =============================================================================
// PendingSlot Tests
// =============================================================================

#[test]
fn test_slot_replace_and_take() {
    let registry = ClientRegistry::new();
    let a = registry.next_id();
    let b = registry.next_id();
    let slot = PendingSlot::new();

    assert_eq!(slot.state(), AccessState::Idle);
    assert_eq!(slot.replace(a), None);
    assert_eq!(slot.replace(b), Some(PendingRequest { requester: a }));
    assert_eq!(slot.peek(), Some(PendingRequest { requester: b }));
    assert_eq!(slot.take(), Some(PendingRequest { requester: b }));
    assert_eq!(slot.take(), None);
}

#[test]
fn test_concurrent_requests_leave_one_pending() {
    let f = setup_with_car();
    let store = Arc::new(f.store);
    let mut handles = vec![];

    for _ in 0..8 {
        let store = Arc::clone(&store);
        let registry = Arc::clone(&f.registry);
        handles.push(thread::spawn(move || {
            let (requester, _rx) = connect(&registry);
            for _ in 0..20 {
                store.get("car", requester).unwrap();
            }
            requester
        }));
    }

    let requesters: Vec<ClientId> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    match store.access_state("car") {
        Some(AccessState::AwaitingOwnerDecision { requester }) => {
            assert!(requesters.contains(&requester));
        }
        other => panic!("Expected a pending request, got {:?}", other),
    }

    assert!(matches!(
        store.resolve("car", Verdict::Deny),
        Resolution::RequesterGone { .. } | Resolution::Delivered { .. }
    ));
    assert_eq!(store.access_state("car"), Some(AccessState::Idle));
}
