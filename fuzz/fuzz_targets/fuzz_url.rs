#![no_main]

use libfuzzer_sys::fuzz_target;
use odata_adapt::{HiddenFields, MemoryQuery, QueryApplier, parse_url};

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(query) = parse_url(s) else {
        return;
    };

    let policy = HiddenFields::new().hide("item", ["secret"]);
    let rows = MemoryQuery::new(Vec::new());
    if let Ok(adapted) = QueryApplier::new(&policy, "item").apply(query, rows) {
        assert!(adapted.rows().is_empty());
    }
});
