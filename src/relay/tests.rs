use super::*;
use crate::event::{EventTemplate, Keys, TAG_PUBKEY};
use crate::pet::{ActivePet, Creature, Entity};
use chrono::Utc;
use futures::StreamExt;
use std::time::Duration;

fn note_at(author: &Keys, content: &str, created_at: u64) -> Event {
    author
        .sign(EventTemplate {
            created_at,
            kind: 1,
            tags: vec![],
            content: content.to_string(),
        })
        .unwrap()
}

fn relay_with_pet(energy: f64) -> (TotemRelay, Arc<Entity>, Keys) {
    let owner = Keys::generate();
    let totem = Arc::new(Totem::default());
    let pet = totem.register(Entity::Pet(ActivePet::new(
        Keys::generate(),
        owner.public_key(),
        "Rex",
        Utc::now(),
    )));
    pet.creature().vitals().update(|s| s.energy = energy);

    let relay = TotemRelay::new(
        RelayInfo::default(),
        totem,
        Arc::new(MemoryDatabase::new()),
    );
    (relay, pet, owner)
}

async fn energy_settles(pet: &Entity, expected: f64) -> bool {
    for _ in 0..100 {
        if (pet.creature().state().energy - expected).abs() < 1e-9 {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn test_memory_database_query_newest_first_with_limit() {
    let db = MemoryDatabase::new();
    let author = Keys::generate();
    for (i, ts) in [100u64, 300, 200].iter().enumerate() {
        db.save(&note_at(&author, &format!("n{}", i), *ts)).await.unwrap();
    }

    let all: Vec<Event> = db.query(&Filter::new()).await.unwrap().collect().await;
    let stamps: Vec<u64> = all.iter().map(|e| e.created_at).collect();
    assert_eq!(stamps, vec![300, 200, 100]);

    let limited: Vec<Event> = db.query(&Filter::new().limit(2)).await.unwrap().collect().await;
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].created_at, 300);

    assert_eq!(db.count(&Filter::new()).await.unwrap(), 3);
    assert_eq!(db.count(&Filter::new().kinds(vec![7])).await.unwrap(), 0);
}

#[tokio::test]
async fn test_memory_database_delete_by_id() {
    let db = MemoryDatabase::new();
    let event = note_at(&Keys::generate(), "bye", 100);
    db.save(&event).await.unwrap();
    assert_eq!(db.len(), 1);

    db.delete(&event).await.unwrap();
    assert!(db.is_empty());

    // Deleting twice is harmless
    db.delete(&event).await.unwrap();
}

#[tokio::test]
async fn test_store_saves_then_feeds() {
    let (relay, pet, owner) = relay_with_pet(40.0);
    let event = note_at(&owner, "hi", 100);

    relay.handle_store(event.clone()).await.unwrap();

    assert_eq!(relay.database().count(&Filter::new()).await.unwrap(), 1);
    assert!(energy_settles(&pet, 50.2).await);
}

#[tokio::test]
async fn test_delete_removes_then_notifies() {
    let (relay, pet, owner) = relay_with_pet(40.0);
    let event = note_at(&owner, &"x".repeat(200), 100);
    relay.database().save(&event).await.unwrap();

    relay.handle_delete(event).await.unwrap();

    assert_eq!(relay.database().count(&Filter::new()).await.unwrap(), 0);
    assert!(energy_settles(&pet, 42.0).await);
}

#[tokio::test]
async fn test_query_is_shaped_by_tired_pets() {
    let (relay, pet, owner) = relay_with_pet(20.0);
    for ts in 0..25 {
        relay.database().save(&note_at(&owner, "n", 1000 + ts)).await.unwrap();
    }

    let events: Vec<Event> = relay.handle_query(Filter::new()).await.unwrap().collect().await;
    assert_eq!(events.len(), 10);
    assert!((pet.creature().state().energy - 19.9).abs() < 1e-9);

    assert_eq!(relay.handle_count(Filter::new()).await.unwrap(), 10);
    assert_eq!(relay.handle_count(Filter::new().limit(20)).await.unwrap(), 20);
}

#[tokio::test]
async fn test_rested_pets_leave_queries_alone() {
    let (relay, _pet, owner) = relay_with_pet(90.0);
    for ts in 0..25 {
        relay.database().save(&note_at(&owner, "n", 1000 + ts)).await.unwrap();
    }

    assert_eq!(relay.handle_count(Filter::new()).await.unwrap(), 25);
}

#[test]
fn test_reject_hook_reports_reason() {
    let (relay, pet, owner) = relay_with_pet(100.0);
    pet.creature().vitals().update(|s| s.happiness = 10.0);

    let long = owner
        .sign(EventTemplate::new(1, "x".repeat(300)).tag(TAG_PUBKEY, pet.id()))
        .unwrap();
    let (reject, reason) = relay.handle_reject(&long);
    assert!(reject);
    assert!(reason.starts_with("Rex is grumpy"));

    let (reject, reason) = relay.handle_reject(&note_at(&owner, "short", 1));
    assert!(!reject);
    assert!(reason.is_empty());
}

#[test]
fn test_relay_info_defaults() {
    let info = RelayInfo::default();
    assert_eq!(info.software, "totem");
    assert!(!info.version.is_empty());

    let parsed: RelayInfo = serde_json::from_str(r#"{"name": "Den"}"#).unwrap();
    assert_eq!(parsed.name, "Den");
    assert_eq!(parsed.software, "totem");
}
