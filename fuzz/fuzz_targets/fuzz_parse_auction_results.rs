#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(records) = sdac_elia::feed::parse_auction_results(data) {
        let mut table = sdac_elia::prices::PriceTable::new();
        let added = table.extend(records.iter().copied());
        assert!(added <= records.len());
        assert_eq!(table.len(), added);
    }
});
