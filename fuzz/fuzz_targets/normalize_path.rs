#![no_main]

use libfuzzer_sys::fuzz_target;
use ironsbom_catalog::source::{join_link_target, normalize_path};

fuzz_target!(|data: &[u8]| {
    if let Ok(path) = std::str::from_utf8(data) {
        let normalized = normalize_path(path);
        assert!(normalized.starts_with('/'));
        assert_eq!(normalize_path(&normalized), normalized, "normalization must be idempotent");

        let (link, target) = path.split_once('\0').unwrap_or((path, ""));
        let joined = join_link_target(link, target);
        assert_eq!(normalize_path(&joined), joined);
    }
});
