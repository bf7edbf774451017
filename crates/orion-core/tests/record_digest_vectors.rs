//! # Record Digest Vectors
//!
//! Fixed vectors for the canonical-bytes → SHA-256 → base64url pipeline.
//! A change in any of these values changes every storage key an existing
//! node has written, so the expected strings are hardcoded.

use orion_core::{sha256_digest, CanonicalBytes, Digest, TransactionPair};

fn key_of(data: &impl serde::Serialize) -> Digest {
    let cb = CanonicalBytes::new(data).expect("canonicalization should succeed");
    sha256_digest(&cb).to_key()
}

#[test]
fn deadbeef_pair_vector() {
    let pair = TransactionPair::new("A", "B", "deadbeef");

    let cb = CanonicalBytes::new(&pair).unwrap();
    assert_eq!(
        std::str::from_utf8(cb.as_bytes()).unwrap(),
        r#"{"from":"A","payload":"deadbeef","to":"B"}"#
    );
    assert_eq!(
        sha256_digest(&cb).to_hex(),
        "cefc348a040692d5faff19bba2cc76adda5df84b3611497026851a2772c23495"
    );
    assert_eq!(
        key_of(&pair).as_str(),
        "zvw0igQGktX6_xm7osx2rdpd-Es2EUlwJoUaJ3LCNJU"
    );
}

#[test]
fn cafebabe_pair_vector() {
    let pair = TransactionPair::new("A", "B", "cafebabe");
    assert_eq!(
        key_of(&pair).as_str(),
        "w-daDIqAmHnpXAsboQ3L7GsfxTvmRPjqIrO8XGvwCjw"
    );
}

#[test]
fn empty_object_vector() {
    assert_eq!(
        key_of(&serde_json::json!({})).as_str(),
        "RBNvo1WzZ4oRRq0W9-hknpT7T8If536DEMBg9hyq_4o"
    );
}

#[test]
fn field_order_does_not_change_the_key() {
    let pair = TransactionPair::new("A", "B", "deadbeef");
    let reordered = serde_json::json!({"payload": "deadbeef", "to": "B", "from": "A"});
    assert_eq!(key_of(&pair), key_of(&reordered));
}

#[test]
fn distinct_payloads_have_distinct_keys() {
    let a = TransactionPair::new("A", "B", "deadbeef");
    let b = TransactionPair::new("A", "B", "cafebabe");
    let c = TransactionPair::new("B", "A", "deadbeef");
    assert_ne!(key_of(&a), key_of(&b));
    assert_ne!(key_of(&a), key_of(&c));
}
