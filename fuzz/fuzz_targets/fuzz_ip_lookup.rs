#![no_main]
use ipasn::AsnDatabase;
use libfuzzer_sys::fuzz_target;
use std::net::IpAddr;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let mut builder = AsnDatabase::builder();
        let _ = builder.add_row(["1.0.0.0", "1.0.0.255", "13335", "US", "CLOUDFLARENET"]);
        let _ = builder.add_row(["10.0.0.0", "10.255.255.255", "0", "None"]);
        let _ = builder.add_row(["2001:db8::", "2001:db8::ffff", "64500"]);
        let db = builder.build().expect("static rows build");

        // Unparseable text is a miss, never a panic
        let info = db.lookup_str(s);
        if let Ok(ip) = s.trim().parse::<IpAddr>() {
            assert_eq!(info, db.lookup_ip(ip));
        } else {
            assert!(!info.is_found());
        }
    }
});
