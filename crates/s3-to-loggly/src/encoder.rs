//! JSON lines encoding of parsed records

use s3_to_loggly_common::{Result, TranscodeError};
use serde_jsonlines::JsonLinesWriter;

use crate::record::AccessLogRecord;

/// Encode records as newline-delimited JSON
///
/// Each record becomes one compact JSON object terminated by `\n`, keys in
/// column order. No records encode to the empty string.
pub fn encode_json_lines(records: &[AccessLogRecord]) -> Result<String> {
    let mut buffer = Vec::new();
    {
        let mut writer = JsonLinesWriter::new(&mut buffer);
        writer
            .write_all(records)
            .and_then(|()| writer.flush())
            .map_err(|e| TranscodeError::format(format!("Failed to encode records: {}", e)))?;
    }

    String::from_utf8(buffer)
        .map_err(|e| TranscodeError::format(format!("Encoded payload is not UTF-8: {}", e)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::record::{parse_access_log, COLUMNS};

    const LINE: &str = r#"https 2024-01-01T00:00:01.000000Z app/edge/abc 10.1.2.3:51234 10.0.0.7:8080 0.001 0.045 0.000 502 - 812 4120 "POST https://api.example.com:443/v1/items?q=a%20b HTTP/2.0" "Mozilla/5.0 (X11; Linux x86_64)" ECDHE-RSA-AES128-GCM-SHA256 TLSv1.2 arn:aws:elasticloadbalancing:eu-west-1:123456789012:targetgroup/api/0123456789abcdef "Root=1-65920001-0123456789abcdef01234567""#;

    #[test]
    fn test_empty_records_encode_to_empty_string() {
        assert_eq!(encode_json_lines(&[]).unwrap(), "");
    }

    #[test]
    fn test_one_line_per_record_in_column_order() {
        let records = parse_access_log(&format!("{LINE}\n{LINE}\n")).unwrap();
        let payload = encode_json_lines(&records).unwrap();

        let lines: Vec<&str> = payload.split_terminator('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(payload.ends_with('\n'));
        assert!(lines[0].starts_with(r#"{"type":"https","timestamp":"2024-01-01T00:00:01.000000Z","#));

        let positions: Vec<usize> = COLUMNS
            .iter()
            .map(|name| lines[0].find(&format!("\"{}\":", name)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_values_are_preserved_verbatim() {
        let records = parse_access_log(LINE).unwrap();
        let payload = encode_json_lines(&records).unwrap();
        let value: serde_json::Value = serde_json::from_str(payload.trim_end()).unwrap();

        assert_eq!(value["target_status_code"], "-");
        assert_eq!(value["request_processing_time"], "0.001");
        assert_eq!(
            value["request"],
            "POST https://api.example.com:443/v1/items?q=a%20b HTTP/2.0"
        );
        assert_eq!(value["client:port"], "10.1.2.3:51234");
    }

    #[test]
    fn test_deterministic() {
        let records = parse_access_log(LINE).unwrap();
        assert_eq!(
            encode_json_lines(&records).unwrap(),
            encode_json_lines(&records).unwrap()
        );
    }
}
