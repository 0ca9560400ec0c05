#![no_main]

use libfuzzer_sys::fuzz_target;

use logharbor_log_pipeline::{LinesResponse, Request};

fuzz_target!(|data: &[u8]| {
    // 요청은 항상 해석되고 (모르면 Unknown), 응답은 Ok 또는 Err
    let request = Request::decode(data);
    let _ = request.token();
    let _ = LinesResponse::decode(data);
});
