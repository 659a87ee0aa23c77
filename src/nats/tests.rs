use super::*;
use crate::event::{EventTemplate, Filter, Keys};
use crate::pet::{ActivePet, Creature, Entity};
use crate::relay::{MemoryDatabase, RelayInfo, TotemRelay};
use crate::totem::Totem;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

fn relay() -> TotemRelay {
    TotemRelay::new(
        RelayInfo::default(),
        Arc::new(Totem::default()),
        Arc::new(MemoryDatabase::new()),
    )
}

#[test]
fn test_hook_subjects() {
    let config = NatsConfig {
        url: "nats://localhost:4222".to_string(),
        subject_prefix: "den.relay".to_string(),
    };

    assert_eq!(config.subject(Hook::Store.suffix()), "den.relay.store");
    assert_eq!(config.subject(Hook::PUBLISH_SUFFIX), "den.relay.publish");
    assert_eq!(Hook::from_subject("den.relay", "den.relay.count"), Some(Hook::Count));
    assert_eq!(Hook::from_subject("den.relay", "den.relay.publish"), None);
    assert_eq!(Hook::from_subject("den.relay", "den.relayx.store"), None);
    assert_eq!(Hook::from_subject("den.relay", "other.store"), None);
}

#[test]
fn test_default_prefix() {
    assert_eq!(NatsConfig::default().subject_prefix, "totem.relay");
}

#[tokio::test]
async fn test_store_then_query_through_dispatch() {
    let relay = relay();
    let event = Keys::generate().sign(EventTemplate::new(1, "hello")).unwrap();

    let reply = dispatch(&relay, Hook::Store, &serde_json::to_vec(&event).unwrap()).await;
    assert_eq!(reply, json!({"ok": true}));

    let filter = serde_json::to_vec(&Filter::new().kinds(vec![1])).unwrap();
    let reply = dispatch(&relay, Hook::Query, &filter).await;
    let events: Vec<crate::event::Event> = serde_json::from_value(reply).unwrap();
    assert_eq!(events, vec![event]);

    let reply = dispatch(&relay, Hook::Count, b"{}").await;
    assert_eq!(reply, json!({"count": 1}));
}

#[tokio::test]
async fn test_reject_through_dispatch() {
    let relay = relay();
    let owner = Keys::generate();
    let pet = relay.totem().register(Entity::Pet(ActivePet::new(
        Keys::generate(),
        owner.public_key(),
        "Rex",
        Utc::now(),
    )));
    pet.creature().vitals().update(|s| s.happiness = 20.0);

    let long = owner.sign(EventTemplate::new(1, "y".repeat(400))).unwrap();
    let reply = dispatch(&relay, Hook::Reject, &serde_json::to_vec(&long).unwrap()).await;

    assert_eq!(reply["reject"], true);
    assert_eq!(reply["reason"], "Rex is grumpy, dislikes long messages");
}

#[tokio::test]
async fn test_malformed_payload_gets_error_reply() {
    let relay = relay();

    let reply = dispatch(&relay, Hook::Store, b"not json").await;
    assert!(reply["error"].as_str().unwrap().contains("Malformed payload"));

    let reply = dispatch(&relay, Hook::Count, b"\"text\"").await;
    assert!(reply.get("error").is_some());
}
