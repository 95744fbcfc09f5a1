#![no_main]

use libfuzzer_sys::fuzz_target;
use simqueue_client::protocol::{normalize_status, parse_player, parse_players, parse_simulators};
use simqueue_client::view_model::derive;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    // Status normalization is total: any JSON yields a status.
    let active = normalize_status(value.clone()).into_items();
    let _ = parse_players(value.clone());
    let _ = parse_player(value.clone());

    // Derivation must partition whatever the wire parsers produce.
    if let Ok(simulators) = parse_simulators(value) {
        for simulator in &simulators {
            let view = derive(&simulator.entries, &active);
            assert_eq!(view.len(), simulator.entries.len());
        }
    }
});
