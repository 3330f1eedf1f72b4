//! Fuzz target for host key and signature blob decoding
//!
//! Tests that arbitrary blobs never panic the decoder or the verifier.

#![no_main]

use arbitrary::Arbitrary;
use curvekex_core::HostKey;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct BlobInput {
    host_key: Vec<u8>,
    signature: Vec<u8>,
    data: Vec<u8>,
}

fuzz_target!(|input: BlobInput| {
    if let Ok(host_key) = HostKey::from_blob(&input.host_key) {
        // A decoded key re-exposes exactly the bytes it was built from
        assert_eq!(host_key.blob(), input.host_key.as_slice());
        let _ = host_key.verify(&input.signature, &input.data);
        let _ = host_key.fingerprint();
    }
});
