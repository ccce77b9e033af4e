#![no_main]
use ipasn::loader::load_from_reader;
use ipasn::{Delimiter, OverlapPolicy};
use libfuzzer_sys::fuzz_target;
use std::net::{IpAddr, Ipv4Addr};

fuzz_target!(|data: &[u8]| {
    // Arbitrary database text must never panic; bad rows are only counted
    for delimiter in [Delimiter::Comma, Delimiter::Tab] {
        if let Ok(db) = load_from_reader(data, delimiter, OverlapPolicy::Allow) {
            assert_eq!(db.len(), db.stats().accepted());
            for record in db.ipv4().records() {
                assert!(record.start <= record.end);
                let start = IpAddr::V4(Ipv4Addr::from(record.start));
                assert!(db.lookup_ip(start).is_found());
            }
        }
    }
});
