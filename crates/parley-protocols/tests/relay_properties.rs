//! Property-based tests for the hash relay verdict.

use bytes::Bytes;
use parley_protocols::relay::{self, Payload, RelayConfig, RelayKeys, SINK, SOURCE, Verdict};
use proptest::prelude::*;

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(future)
}

fn config(payload: Vec<u8>) -> RelayConfig {
    RelayConfig { payload: Payload::Bytes(Bytes::from(payload)), ..RelayConfig::default() }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: an untouched payload of any content is judged valid
    #[test]
    fn prop_untouched_payload_valid(payload in prop::collection::vec(any::<u8>(), 0..4096)) {
        let report = run(relay::run(&config(payload), &RelayKeys::generate()))?;

        prop_assert_eq!(report.verdict, Verdict::Valid);
    }

    /// Property: flipping any single bit of the bulk payload is detected
    #[test]
    fn prop_any_bulk_bit_flip_invalid(
        payload in prop::collection::vec(any::<u8>(), 1..4096),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let index = position.index(payload.len());
        let mut env = relay::environment(&config(payload), &RelayKeys::generate())?;
        env.intercept(SOURCE, SINK, move |message: Bytes| {
            let mut bytes = message.to_vec();
            bytes[index] ^= 1 << bit;
            Bytes::from(bytes)
        })?;

        let report = run(relay::collect(env))?;

        prop_assert_eq!(report.verdict, Verdict::Invalid);
    }
}
