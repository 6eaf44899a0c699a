#![no_main]

use arbitrary::Arbitrary;
use combinator_auth::hmac_signature;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    secret: String,
    body: String,
    timestamp: u64,
}

fuzz_target!(|input: Input| {
    let timestamp = input.timestamp.to_string();
    let Ok(signature) = hmac_signature(&input.secret, &input.body, &timestamp) else {
        return;
    };

    assert_eq!(signature.len(), 43);
    assert!(signature
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
    assert_eq!(
        hmac_signature(&input.secret, &input.body, &timestamp).unwrap(),
        signature
    );
});
