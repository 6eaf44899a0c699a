#![no_main]

use combinator_auth::{
    CredentialRecord, CredentialStore, KeyValueStore, MemoryStore, Session, SigningScheme,
    STORAGE_KEY,
};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    for scheme in [SigningScheme::Hmac, SigningScheme::Rsa] {
        // Anything that parses must survive a write/read cycle unchanged
        if let Ok(record) = CredentialRecord::from_json(s, scheme) {
            let json = record.to_json(scheme);
            let reparsed = CredentialRecord::from_json(&json, scheme).unwrap();
            assert_eq!(reparsed, record);
        }

        // Loading arbitrary stored bytes never panics, and a rejected
        // record leaves the existing session alone
        let backend = Arc::new(MemoryStore::new());
        let store = CredentialStore::new(backend.clone(), scheme);
        store.save("fuzz-user", "fuzz-token", "sk_fuzz".into());
        let before = store.session();

        backend.set(STORAGE_KEY, s).unwrap();
        if !store.load() {
            assert_eq!(store.session(), before);
        }

        let _ = store.stored_secret("fuzz-user");
        store.clear();
        assert_eq!(store.session(), Session::anonymous());
    }
});
