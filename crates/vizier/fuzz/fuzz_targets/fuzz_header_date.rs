//! Fuzz target for column header date parsing and time-series detection.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vizier::FieldType;
use vizier::inference::{detect_time_series, parse_header_date};

fuzz_target!(|headers: Vec<String>| {
    for h in &headers {
        let _ = parse_header_date(h);
    }

    let types = vec![FieldType::Integer; headers.len()];
    if let Some(ts) = detect_time_series(&headers, &types) {
        assert!(ts.start.index < ts.end.index);
        assert_eq!(ts.time_series.num_elements, ts.end.index - ts.start.index + 1);
    }
});
