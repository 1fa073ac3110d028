#![no_main]

use hostbridge::host::signature::Signature;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(sig) = Signature::parse(text) {
        let reparsed = Signature::parse(&sig.to_string()).expect("display output parses");
        assert_eq!(sig, reparsed);
    }
});
