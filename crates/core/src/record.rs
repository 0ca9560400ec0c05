//! 로그 레코드 — 파이프 구분 8필드 라인 파서
//!
//! syslog 데몬이 기록하는 라이브 로그 파일의 한 줄은 다음 형식입니다.
//!
//! ```text
//! timestamp|reserved|host|facility|severity|program|pid|message
//! ```
//!
//! 필드는 항상 8개입니다. 구분자가 부족한 라인은 뒤쪽 필드를 빈 문자열로 채우고,
//! 메시지 안에 포함된 `|`는 마지막 필드에 그대로 남습니다.
//! 패딩은 파싱 경계에서만 수행하며, 이후 레코드는 변경되지 않습니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 레코드 필드 구분자
pub const FIELD_DELIMITER: char = '|';

/// 레코드 필드 개수
pub const FIELD_COUNT: usize = 8;

/// 파싱된 로그 레코드
///
/// `timestamp`가 유일한 정렬 키입니다. `reserved` 필드는 위치 호환성을 위해서만
/// 유지되며 의미를 부여하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogRecord {
    /// ISO-8601 타임스탬프 문자열
    pub timestamp: String,
    /// 예약 필드 (미사용)
    pub reserved: String,
    /// 호스트명
    pub host: String,
    /// syslog 퍼실리티
    pub facility: String,
    /// 심각도
    pub severity: String,
    /// 프로그램명
    pub program: String,
    /// 프로세스 ID (문자열 그대로 보존)
    pub pid: String,
    /// 메시지 본문
    pub message: String,
}

impl LogRecord {
    /// 원시 라인 한 줄을 레코드로 파싱합니다.
    ///
    /// 끝의 개행(`\n`, `\r\n`)은 제거됩니다. 실패하지 않으며,
    /// 구분자가 부족하면 누락된 뒤쪽 필드는 빈 문자열이 됩니다.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut parts = line.splitn(FIELD_COUNT, FIELD_DELIMITER);
        let mut next = || parts.next().unwrap_or_default().to_owned();

        Self {
            timestamp: next(),
            reserved: next(),
            host: next(),
            facility: next(),
            severity: next(),
            program: next(),
            pid: next(),
            message: next(),
        }
    }

    /// 원시 바이트 라인을 파싱합니다. 잘못된 UTF-8 바이트는 대체 문자로 바뀝니다.
    pub fn parse_bytes(line: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(line))
    }

    /// 에러 메시지를 담은 합성 레코드를 생성합니다.
    ///
    /// 읽기 실패나 IPC 실패를 호출자에게 정상적인 응답 형태로 전달할 때 사용합니다.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            timestamp: "Error".to_owned(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// 필드를 고정 순서의 배열로 반환합니다.
    pub fn fields(&self) -> [&str; FIELD_COUNT] {
        [
            &self.timestamp,
            &self.reserved,
            &self.host,
            &self.facility,
            &self.severity,
            &self.program,
            &self.pid,
            &self.message,
        ]
    }

    /// 동일한 구분자로 다시 직렬화합니다 (개행 없음).
    pub fn to_line(&self) -> String {
        self.fields().join("|")
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}.{} {}[{}]: {}",
            self.timestamp,
            self.host,
            self.facility,
            self.severity,
            self.program,
            self.pid,
            self.message,
        )
    }
}

/// 라인의 첫 번째 필드(타임스탬프)를 반환합니다.
///
/// 구분자가 없는 라인은 레코드로 취급하지 않으므로 `None`을 반환합니다.
pub fn leading_timestamp(line: &str) -> Option<&str> {
    line.split_once(FIELD_DELIMITER)
        .map(|(ts, _)| ts.trim())
        .filter(|ts| !ts.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "2024-01-01T00:00:00|x|hostA|auth|INFO|sshd|123|login ok";

    #[test]
    fn parse_full_line() {
        let rec = LogRecord::parse(FULL);
        assert_eq!(rec.timestamp, "2024-01-01T00:00:00");
        assert_eq!(rec.reserved, "x");
        assert_eq!(rec.host, "hostA");
        assert_eq!(rec.facility, "auth");
        assert_eq!(rec.severity, "INFO");
        assert_eq!(rec.program, "sshd");
        assert_eq!(rec.pid, "123");
        assert_eq!(rec.message, "login ok");
    }

    #[test]
    fn reserialize_reproduces_fields() {
        let rec = LogRecord::parse(FULL);
        assert_eq!(rec.to_line(), FULL);
        assert_eq!(LogRecord::parse(&rec.to_line()), rec);
    }

    #[test]
    fn short_line_is_padded() {
        let rec = LogRecord::parse("2024-01-01T00:00:00||hostA\n");
        assert_eq!(rec.host, "hostA");
        assert_eq!(rec.facility, "");
        assert_eq!(rec.message, "");
        assert_eq!(rec.fields().len(), FIELD_COUNT);
    }

    #[test]
    fn message_keeps_extra_delimiters() {
        let rec = LogRecord::parse("t|r|h|f|s|p|1|a|b|c");
        assert_eq!(rec.message, "a|b|c");
    }

    #[test]
    fn crlf_is_stripped() {
        let rec = LogRecord::parse("t|r|h|f|s|p|1|msg\r\n");
        assert_eq!(rec.message, "msg");
    }

    #[test]
    fn invalid_utf8_is_tolerated() {
        let rec = LogRecord::parse_bytes(b"t|r|h|f|s|p|1|bad \xff byte");
        assert!(rec.message.starts_with("bad "));
        assert!(rec.message.ends_with(" byte"));
    }

    #[test]
    fn empty_line_yields_empty_record() {
        let rec = LogRecord::parse("");
        assert_eq!(rec, LogRecord::default());
    }

    #[test]
    fn error_record_shape() {
        let rec = LogRecord::error("boom");
        assert_eq!(rec.timestamp, "Error");
        assert_eq!(rec.message, "boom");
        assert_eq!(rec.host, "");
    }

    #[test]
    fn leading_timestamp_extraction() {
        assert_eq!(leading_timestamp(FULL), Some("2024-01-01T00:00:00"));
        assert_eq!(leading_timestamp("no delimiter here"), None);
        assert_eq!(leading_timestamp(" |x"), None);
    }

    #[test]
    fn serde_uses_named_fields() {
        let rec = LogRecord::parse(FULL);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["host"], "hostA");
        assert_eq!(json["message"], "login ok");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parse_always_yields_eight_fields(line in ".*") {
                let rec = LogRecord::parse(&line);
                prop_assert_eq!(rec.fields().len(), FIELD_COUNT);
            }

            #[test]
            fn full_lines_reserialize_exactly(
                fields in proptest::collection::vec("[^|\r\n]*", FIELD_COUNT - 1),
                message in "[^\r\n]*",
            ) {
                let line = format!("{}|{message}", fields.join("|"));
                prop_assert_eq!(LogRecord::parse(&line).to_line(), line);
            }

            #[test]
            fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
                let rec = LogRecord::parse_bytes(&bytes);
                prop_assert_eq!(rec.fields().len(), FIELD_COUNT);
            }
        }
    }
}
