#![no_main]

use combinator_auth::{encoding::pem_to_der, RsaSigner, Session, SigningScheme};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // Stripping and decoding never panics
    let _ = pem_to_der(&text);

    // Key import rejects garbage with an error
    let _ = RsaSigner::import_key(&text);

    // A failed import through the signer is always a signing failure
    let session = Session::new("fuzz-user", "fuzz-token", Some(text.as_ref().into()));
    match SigningScheme::Rsa.signer().sign("{}", &session) {
        Ok(Some(headers)) => assert_eq!(headers.len(), 1),
        Ok(None) => assert!(text.is_empty()),
        Err(e) => assert!(e.is_signing_failure()),
    }
});
