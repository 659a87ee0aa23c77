use super::*;

fn text_note(content: &str) -> EventTemplate {
    EventTemplate {
        created_at: 1_707_668_400,
        kind: 1,
        tags: vec![],
        content: content.to_string(),
    }
}

#[test]
fn test_signed_event_verifies() {
    let keys = Keys::generate();
    let event = keys.sign(text_note("hello pet")).unwrap();

    assert_eq!(event.pubkey, keys.public_key());
    assert_eq!(event.id.len(), 64);
    assert_eq!(event.sig.len(), 128);
    assert!(event.verify().is_ok());
}

#[test]
fn test_tampered_content_fails_verification() {
    let keys = Keys::generate();
    let mut event = keys.sign(text_note("hello pet")).unwrap();
    event.content = "hello pot".to_string();

    assert!(matches!(
        event.verify(),
        Err(ValidationError::IdMismatch { .. })
    ));
}

#[test]
fn test_foreign_signature_fails_verification() {
    let alice = Keys::generate();
    let bob = Keys::generate();
    let mut event = alice.sign(text_note("from alice")).unwrap();
    let forged = bob.sign(text_note("from alice")).unwrap();

    // Keep alice's id/pubkey but splice in bob's signature
    event.sig = forged.sig;
    assert_eq!(event.verify(), Err(ValidationError::SignatureMismatch));
}

#[test]
fn test_structure_rejects_uppercase_pubkey() {
    let keys = Keys::generate();
    let mut event = keys.sign(text_note("x")).unwrap();
    event.pubkey = event.pubkey.to_uppercase();

    assert!(matches!(
        validate_structure(&event),
        Err(ValidationError::InvalidPubkey(_))
    ));
}

#[test]
fn test_keys_from_secret_hex_is_deterministic() {
    let secret = "0000000000000000000000000000000000000000000000000000000000000003";
    let a = Keys::from_secret_hex(secret).unwrap();
    let b = Keys::from_secret_hex(secret).unwrap();

    assert_eq!(a.public_key(), b.public_key());
    // BIP-340 test vector 0 public key
    assert_eq!(
        a.public_key(),
        "f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9"
    );
}

#[test]
fn test_keys_from_secret_hex_rejects_garbage() {
    assert!(matches!(
        Keys::from_secret_hex("not-hex"),
        Err(SignError::InvalidKey(_))
    ));
    assert!(Keys::from_secret_hex(&"0".repeat(64)).is_err());
}

#[test]
fn test_generated_keys_are_unique() {
    let a = Keys::generate();
    let b = Keys::generate();
    assert_ne!(a.public_key(), b.public_key());
}

#[test]
fn test_debug_hides_secret() {
    let keys = Keys::from_secret_hex(
        "0000000000000000000000000000000000000000000000000000000000000003",
    )
    .unwrap();
    let rendered = format!("{:?}", keys);
    assert!(rendered.contains(keys.public_key()));
    assert!(!rendered.contains("0000000000000000000000000000000000000000000000000000000000000003"));
}

#[test]
fn test_compute_id_matches_nip01_serialization() {
    let id = compute_id(&"a".repeat(64), 1, 1, &[], "").unwrap();
    let expected = {
        use sha2::{Digest, Sha256};
        let canonical = format!("[0,\"{}\",1,1,[],\"\"]", "a".repeat(64));
        hex::encode(Sha256::digest(canonical.as_bytes()))
    };
    assert_eq!(id, expected);
}

#[test]
fn test_tag_helpers() {
    let keys = Keys::generate();
    let event = keys
        .sign(
            text_note("tagged")
                .tag("p", "pet-one")
                .tag("p", "pet-two")
                .tag("c", "execute-tool"),
        )
        .unwrap();

    assert_eq!(event.tag_value("p"), Some("pet-one"));
    assert_eq!(event.tag_values("p").collect::<Vec<_>>(), vec!["pet-one", "pet-two"]);
    assert!(event.has_tag("c", "execute-tool"));
    assert!(!event.has_tag("c", "other"));
    assert_eq!(event.tag_value("missing"), None);
}

#[test]
fn test_event_json_shape() {
    let keys = Keys::generate();
    let event = keys.sign(text_note("json")).unwrap();
    let value = serde_json::to_value(&event).unwrap();

    for field in ["id", "pubkey", "created_at", "kind", "tags", "content", "sig"] {
        assert!(value.get(field).is_some(), "missing field {}", field);
    }
    let back: Event = serde_json::from_value(value).unwrap();
    assert_eq!(back, event);
}

#[test]
fn test_filter_matching() {
    let keys = Keys::generate();
    let event = keys
        .sign(EventTemplate {
            created_at: 100,
            kind: KIND_PET_STATUS,
            tags: vec![vec!["d".to_string(), "pet/status".to_string()]],
            content: String::new(),
        })
        .unwrap();

    assert!(Filter::new().matches(&event));
    assert!(Filter::new().kinds([KIND_PET_STATUS]).matches(&event));
    assert!(!Filter::new().kinds([KIND_METADATA]).matches(&event));
    assert!(Filter::new().authors([&keys.public_key()[..8]]).matches(&event));
    assert!(Filter::new().tag("d", ["pet/status"]).matches(&event));
    assert!(!Filter::new().tag("#d", ["other"]).matches(&event));

    let mut window = Filter::new();
    window.since = Some(100);
    assert!(!window.matches(&event), "since is exclusive");
    window.since = Some(99);
    window.until = Some(100);
    assert!(window.matches(&event), "until is inclusive");
}

#[test]
fn test_filter_json_round_trip_keeps_tag_queries() {
    let json = r##"{"kinds":[1],"limit":5,"#p":["abc"]}"##;
    let filter: Filter = serde_json::from_str(json).unwrap();

    assert_eq!(filter.kinds, Some(vec![1]));
    assert_eq!(filter.limit, Some(5));
    assert_eq!(filter.tags.get("#p"), Some(&vec!["abc".to_string()]));
    assert!(filter.authors.is_none());
}

#[test]
fn test_filter_accepts_search_queries() {
    let json = r##"{"kinds":[1],"search":"rex","#p":["abc"]}"##;
    let filter: Filter = serde_json::from_str(json).unwrap();

    assert_eq!(filter.search.as_deref(), Some("rex"));
    assert_eq!(filter.tags.len(), 1);
    assert!(!filter.tags.contains_key("search"));
}
