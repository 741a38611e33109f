//! Line-oriented, tab-separated record encoding.
//!
//! The per-record wire format (`encode_record`/`decode_record`) is the
//! binding format: a single record's value bytes, independent of whatever
//! key a backend stores them under.
//!
//! ```text
//! VERSION\t<u64>
//! I\t<field>\t<int>
//! S\t<field>\t<string>
//! ```
//!
//! `FileStorage` needs to persist a whole table to one file rather than one
//! value per external key, so it uses `encode_table`/`decode_table`, an
//! internal extension of the same per-record format that prefixes each
//! record with a `KEY\t<key>` line and separates records with a blank line,
//! written in key-sorted order so two encodings of the same table are
//! byte-identical. Tab, backslash, and newline bytes inside a key, field
//! name, or string value are escaped as `\t`, `\\`, `\n` in both formats so
//! the tab-separated structure stays unambiguous.

use ccbench_core::{Record, Value};

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('\\') => out.push('\\'),
                Some('t') => out.push('\t'),
                Some('n') => out.push('\n'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Encodes a single record's value bytes: line-oriented, tab-separated,
/// escaped. First line `VERSION\t<u64>`, then one `I\t<field>\t<int>` or
/// `S\t<field>\t<string>` line per field in field-name-sorted order. The key
/// itself is not part of these bytes — it is the external key a persistent
/// backend stores this value under (e.g. a RocksDB key), not a line in the
/// encoding.
pub fn encode_record(record: &Record) -> String {
    let mut out = String::new();
    out.push_str("VERSION\t");
    out.push_str(&record.version.to_string());
    out.push('\n');

    let mut fields: Vec<(&String, &Value)> = record.fields.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));
    for (field, value) in fields {
        match value {
            Value::Int(i) => {
                out.push_str("I\t");
                out.push_str(&escape(field));
                out.push('\t');
                out.push_str(&i.to_string());
                out.push('\n');
            }
            Value::Str(s) => {
                out.push_str("S\t");
                out.push_str(&escape(field));
                out.push('\t');
                out.push_str(&escape(s));
                out.push('\n');
            }
        }
    }
    out
}

/// Inverse of [`encode_record`].
pub fn decode_record(content: &str) -> Result<Record, String> {
    let mut lines = content.lines().enumerate();

    let (_, first) = lines
        .next()
        .ok_or_else(|| "empty record: missing VERSION line".to_string())?;
    let mut parts = first.splitn(2, '\t');
    let tag = parts.next().unwrap_or("");
    if tag != "VERSION" {
        return Err(format!("line 1: expected VERSION, found tag {tag:?}"));
    }
    let version: u64 = parts
        .next()
        .ok_or_else(|| "line 1: VERSION missing value".to_string())?
        .parse()
        .map_err(|_| "line 1: bad VERSION value".to_string())?;

    let mut record = Record::new(version);
    for (lineno, line) in lines {
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(3, '\t');
        let tag = parts
            .next()
            .ok_or_else(|| format!("line {}: empty tag", lineno + 1))?;
        match tag {
            "I" => {
                let field = parts
                    .next()
                    .ok_or_else(|| format!("line {}: I missing field", lineno + 1))?;
                let val = parts
                    .next()
                    .ok_or_else(|| format!("line {}: I missing value", lineno + 1))?;
                let n: i64 = val
                    .parse()
                    .map_err(|_| format!("line {}: bad int {val:?}", lineno + 1))?;
                record.set_int(unescape(field), n);
            }
            "S" => {
                let field = parts
                    .next()
                    .ok_or_else(|| format!("line {}: S missing field", lineno + 1))?;
                let val = parts
                    .next()
                    .ok_or_else(|| format!("line {}: S missing value", lineno + 1))?;
                record.set_str(unescape(field), unescape(val));
            }
            other => return Err(format!("line {}: unknown tag {other:?}", lineno + 1)),
        }
    }
    Ok(record)
}

pub fn encode_table(rows: &[(String, Record)]) -> String {
    let mut sorted: Vec<&(String, Record)> = rows.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = String::new();
    for (key, record) in sorted {
        out.push_str("KEY\t");
        out.push_str(&escape(key));
        out.push('\n');
        out.push_str(&encode_record(record));
        out.push('\n');
    }
    out
}

pub fn decode_table(content: &str) -> Result<Vec<(String, Record)>, String> {
    let mut rows = Vec::new();
    let mut cur_key: Option<String> = None;
    let mut cur_record: Option<Record> = None;

    macro_rules! flush {
        () => {
            if let (Some(k), Some(r)) = (cur_key.take(), cur_record.take()) {
                rows.push((k, r));
            }
        };
    }

    for (lineno, line) in content.lines().enumerate() {
        if line.is_empty() {
            flush!();
            continue;
        }
        let mut parts = line.splitn(3, '\t');
        let tag = parts
            .next()
            .ok_or_else(|| format!("line {}: empty tag", lineno + 1))?;
        match tag {
            "KEY" => {
                flush!();
                let key = parts
                    .next()
                    .ok_or_else(|| format!("line {}: KEY missing value", lineno + 1))?;
                cur_key = Some(unescape(key));
                cur_record = Some(Record::new(0));
            }
            "VERSION" => {
                let v = parts
                    .next()
                    .ok_or_else(|| format!("line {}: VERSION missing value", lineno + 1))?;
                let version: u64 = v
                    .parse()
                    .map_err(|_| format!("line {}: bad version {v:?}", lineno + 1))?;
                cur_record
                    .as_mut()
                    .ok_or_else(|| format!("line {}: VERSION before KEY", lineno + 1))?
                    .version = version;
            }
            "I" => {
                let field = parts
                    .next()
                    .ok_or_else(|| format!("line {}: I missing field", lineno + 1))?;
                let val = parts
                    .next()
                    .ok_or_else(|| format!("line {}: I missing value", lineno + 1))?;
                let n: i64 = val
                    .parse()
                    .map_err(|_| format!("line {}: bad int {val:?}", lineno + 1))?;
                cur_record
                    .as_mut()
                    .ok_or_else(|| format!("line {}: I before KEY", lineno + 1))?
                    .set_int(unescape(field), n);
            }
            "S" => {
                let field = parts
                    .next()
                    .ok_or_else(|| format!("line {}: S missing field", lineno + 1))?;
                let val = parts
                    .next()
                    .ok_or_else(|| format!("line {}: S missing value", lineno + 1))?;
                cur_record
                    .as_mut()
                    .ok_or_else(|| format!("line {}: S before KEY", lineno + 1))?
                    .set_str(unescape(field), unescape(val));
            }
            other => return Err(format!("line {}: unknown tag {other:?}", lineno + 1)),
        }
    }
    flush!();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn record_encoding_has_no_key_line() {
        let mut r = Record::new(3);
        r.set_int("balance", 100);
        let encoded = encode_record(&r);
        assert!(encoded.starts_with("VERSION\t3\n"));
        assert!(!encoded.contains("KEY\t"));
    }

    #[test]
    fn round_trips_single_record() {
        let mut r = Record::new(5);
        r.set_int("balance", -7);
        r.set_str("name", "a\tb\\c\nd");
        let decoded = decode_record(&encode_record(&r)).unwrap();
        assert_eq!(decoded.version, 5);
        assert_eq!(decoded.get_int("balance"), Some(-7));
        assert_eq!(decoded.get_str("name"), Some("a\tb\\c\nd"));
    }

    #[test]
    fn record_decode_rejects_missing_version_line() {
        assert!(decode_record("I\tbalance\t5\n").is_err());
    }

    #[test]
    fn round_trips_empty_table() {
        let encoded = encode_table(&[]);
        assert_eq!(decode_table(&encoded).unwrap(), vec![]);
    }

    #[test]
    fn round_trips_mixed_fields() {
        let mut r = Record::new(3);
        r.set_int("balance", -7);
        r.set_str("name", "a\tb\\c\nd");
        let rows = vec![("K_1".to_string(), r)];
        let encoded = encode_table(&rows);
        let decoded = decode_table(&encoded).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].0, "K_1");
        assert_eq!(decoded[0].1.version, 3);
        assert_eq!(decoded[0].1.get_int("balance"), Some(-7));
        assert_eq!(decoded[0].1.get_str("name"), Some("a\tb\\c\nd"));
    }

    #[test]
    fn encoding_is_sorted_by_key() {
        let rows = vec![
            ("b".to_string(), Record::new(1)),
            ("a".to_string(), Record::new(1)),
        ];
        let encoded = encode_table(&rows);
        let a_pos = encoded.find("KEY\ta").unwrap();
        let b_pos = encoded.find("KEY\tb").unwrap();
        assert!(a_pos < b_pos);
    }

    proptest! {
        #[test]
        fn round_trip_is_identity(
            key in "[A-Za-z_][A-Za-z0-9_]{0,8}",
            version in 0u64..1000,
            field in "[a-z]{1,8}",
            n in -1000i64..1000,
        ) {
            let mut r = Record::new(version);
            r.set_int(field.clone(), n);
            let rows = vec![(key.clone(), r)];
            let decoded = decode_table(&encode_table(&rows)).unwrap();
            prop_assert_eq!(decoded.len(), 1);
            prop_assert_eq!(&decoded[0].0, &key);
            prop_assert_eq!(decoded[0].1.version, version);
            prop_assert_eq!(decoded[0].1.get_int(&field), Some(n));
        }

        #[test]
        fn record_round_trip_is_identity(
            version in 0u64..1000,
            field in "[a-z]{1,8}",
            n in -1000i64..1000,
        ) {
            let mut r = Record::new(version);
            r.set_int(field.clone(), n);
            let decoded = decode_record(&encode_record(&r)).unwrap();
            prop_assert_eq!(decoded.version, version);
            prop_assert_eq!(decoded.get_int(&field), Some(n));
        }
    }
}
