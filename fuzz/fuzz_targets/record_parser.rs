#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use logharbor_core::filter::RecordFilter;
use logharbor_core::record::LogRecord;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    line: Vec<u8>,
    host: Option<String>,
    message: Option<String>,
}

fuzz_target!(|input: FuzzInput| {
    // 어떤 바이트열이든 8개 필드 레코드가 되어야 한다
    let record = LogRecord::parse_bytes(&input.line);

    let filter = RecordFilter {
        host: input.host,
        message: input.message,
        ..Default::default()
    };
    let _ = filter.matches(&record);
});
