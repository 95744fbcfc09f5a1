#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Push frames arrive as text; invalid UTF-8 never reaches the parser.
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(message) = simqueue_client::protocol::PushMessage::parse(text) {
            let _ = message.kind.as_str();
        }
    }
});
