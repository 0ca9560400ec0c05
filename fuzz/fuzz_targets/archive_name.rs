#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use logharbor_core::archive_name;
use logharbor_core::timestamp;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    file_name: String,
    first: String,
    last: String,
    offset_minutes: i16,
}

fuzz_target!(|input: FuzzInput| {
    let _ = archive_name::parse_range(&input.file_name, "messages");
    let _ = timestamp::normalize(&input.first, i32::from(input.offset_minutes));

    // 만든 이름은 다시 해석할 수 있거나, 해석 실패가 에러로 보고되어야 한다
    let name = archive_name::rotated_file_name("messages", &input.first, &input.last);
    let _ = archive_name::parse_range(&format!("{name}.gz"), "messages");
});
