//! Line-oriented grammars for bulk-load input files and workload
//! description files.
//!
//! Both grammars share the same comment and whitespace conventions: lines
//! whose first non-blank character starts `#` or `//` are ignored, leading
//! and trailing whitespace is trimmed before matching, and keywords
//! (`INSERT`, `KEY`, `VALUE`, `END`, `WORKLOAD`, `TRANSACTION`, `INPUTS`)
//! are matched case-insensitively.

use ccbench_core::{Error, Record};

fn is_comment_or_blank(line: &str) -> bool {
    let t = line.trim();
    t.is_empty() || t.starts_with('#') || t.starts_with("//")
}

fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let t = line.trim_start();
    if t.len() >= keyword.len() && t[..keyword.len()].eq_ignore_ascii_case(keyword) {
        Some(t[keyword.len()..].trim_start())
    } else {
        None
    }
}

/// Parses the `INSERT` / `KEY: ... VALUE: {...}` / `END` bulk-load grammar.
///
/// Later `KEY` lines for the same key overwrite earlier ones (last-key-wins)
/// rather than merging fields, matching the semantics of repeated `put`
/// calls against `Storage`.
pub fn parse_input_file(path: &str, content: &str) -> Result<Vec<(String, Record)>, Error> {
    let mut rows: Vec<(String, Record)> = Vec::new();
    let mut in_block = false;

    for (lineno, raw_line) in content.lines().enumerate() {
        let line_no = lineno + 1;
        if is_comment_or_blank(raw_line) {
            continue;
        }
        let line = raw_line.trim();

        if !in_block {
            if strip_keyword(line, "INSERT").is_some() {
                in_block = true;
                continue;
            }
            return Err(Error::parse(
                path,
                format!("line {line_no}: expected INSERT, found {line:?}"),
            ));
        }

        if line.eq_ignore_ascii_case("END") {
            in_block = false;
            continue;
        }

        let (key, record) = parse_insert_line(path, line_no, line)?;
        if let Some(existing) = rows.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = record;
        } else {
            rows.push((key, record));
        }
    }

    if in_block {
        return Err(Error::parse(path, "unterminated INSERT block (missing END)"));
    }
    if rows.is_empty() {
        return Err(Error::parse(path, format!("{path}: no KEY lines found in INSERT block")));
    }
    Ok(rows)
}

fn parse_insert_line(path: &str, line_no: usize, line: &str) -> Result<(String, Record), Error> {
    let after_key = strip_keyword(line, "KEY")
        .and_then(|s| s.strip_prefix(':'))
        .ok_or_else(|| Error::parse(path, format!("line {line_no}: expected KEY: <key>, ...")))?;

    let value_kw_pos = find_keyword_ci(after_key, "VALUE")
        .ok_or_else(|| Error::parse(path, format!("line {line_no}: missing VALUE")))?;

    let key = after_key[..value_kw_pos]
        .trim()
        .trim_end_matches(',')
        .trim();
    if key.is_empty() {
        return Err(Error::parse(path, format!("line {line_no}: empty key")));
    }

    let after_value = after_key[value_kw_pos + "VALUE".len()..]
        .trim_start()
        .strip_prefix(':')
        .ok_or_else(|| Error::parse(path, format!("line {line_no}: expected VALUE: {{...}}")))?
        .trim();

    let braces = after_value
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| Error::parse(path, format!("line {line_no}: VALUE must be {{...}}")))?;

    let mut record = Record::new(0);
    for field in split_top_level_commas(braces) {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        let (name, value) = field
            .split_once(':')
            .ok_or_else(|| Error::parse(path, format!("line {line_no}: bad field {field:?}")))?;
        let name = name.trim();
        let value = value.trim();
        if let Some(s) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            record.set_str(name, s);
        } else {
            let n: i64 = value
                .parse()
                .map_err(|_| Error::parse(path, format!("line {line_no}: bad int {value:?}")))?;
            record.set_int(name, n);
        }
    }

    Ok((key.to_string(), record))
}

fn find_keyword_ci(haystack: &str, keyword: &str) -> Option<usize> {
    let lower_haystack = haystack.to_ascii_lowercase();
    let lower_kw = keyword.to_ascii_lowercase();
    lower_haystack.find(&lower_kw)
}

fn split_top_level_commas(s: &str) -> Vec<&str> {
    // No nested braces appear in this grammar, so a plain comma split is
    // sufficient; quoted commas inside string values are not supported.
    s.split(',').collect()
}

/// One transaction template declared in a workload file: the arity of its
/// `INPUTS` list, used only as a startup sanity check against the
/// compiled-in template registry — the workload file is nameless and cannot
/// redefine transaction bodies, it only states how many keys each template
/// consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateArity {
    pub inputs: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadFileSpec {
    pub templates: Vec<TemplateArity>,
}

/// Parses the `WORKLOAD` / `TRANSACTION (INPUTS: VAR1, VAR2, ...)` / `END`
/// grammar. Neither `WORKLOAD` nor `TRANSACTION` carries a name; which
/// compiled workload this file is checked against comes from
/// `--workload_name`, passed separately to `check_template_count`.
pub fn parse_workload_file(path: &str, content: &str) -> Result<WorkloadFileSpec, Error> {
    let mut templates = Vec::new();
    let mut in_block = false;

    for (lineno, raw_line) in content.lines().enumerate() {
        let line_no = lineno + 1;
        if is_comment_or_blank(raw_line) {
            continue;
        }
        let line = raw_line.trim();

        if !in_block {
            if strip_keyword(line, "WORKLOAD").is_some() {
                in_block = true;
                continue;
            }
            return Err(Error::parse(
                path,
                format!("line {line_no}: expected WORKLOAD, found {line:?}"),
            ));
        }

        if line.eq_ignore_ascii_case("END") {
            in_block = false;
            continue;
        }

        templates.push(parse_transaction_line(path, line_no, line)?);
    }

    if in_block {
        return Err(Error::parse(path, "unterminated WORKLOAD block (missing END)"));
    }
    if templates.is_empty() {
        return Err(Error::parse(path, "workload declares no transactions"));
    }
    Ok(WorkloadFileSpec { templates })
}

/// Arity is the count of comma-separated `INPUTS` tokens, not a literal
/// integer: `TRANSACTION (INPUTS: VAR1, VAR2)` has arity 2. The tokens
/// themselves are placeholders and carry no meaning beyond their count.
fn parse_transaction_line(path: &str, line_no: usize, line: &str) -> Result<TemplateArity, Error> {
    let rest = strip_keyword(line, "TRANSACTION")
        .ok_or_else(|| Error::parse(path, format!("line {line_no}: expected TRANSACTION (INPUTS: ...)")))?;

    let rest = rest.trim_start();
    let after_paren = rest
        .strip_prefix('(')
        .ok_or_else(|| Error::parse(path, format!("line {line_no}: missing (INPUTS: ...)")))?;
    let closing = after_paren
        .find(')')
        .ok_or_else(|| Error::parse(path, format!("line {line_no}: unterminated (...)")))?;
    let inner = &after_paren[..closing];

    let inputs_str = strip_keyword(inner.trim_start(), "INPUTS")
        .and_then(|s| s.strip_prefix(':'))
        .ok_or_else(|| Error::parse(path, format!("line {line_no}: expected INPUTS: VAR1, VAR2, ...")))?
        .trim();
    if inputs_str.is_empty() {
        return Err(Error::parse(path, format!("line {line_no}: INPUTS list is empty")));
    }

    let inputs = inputs_str.split(',').count();
    Ok(TemplateArity { inputs })
}

/// Startup check: `w1` must declare exactly one transaction template, `w2`
/// must declare exactly two. `workload_name` comes from `--workload_name`,
/// never from the workload file itself (the file has no name to compare).
pub fn check_template_count(spec: &WorkloadFileSpec, workload_name: &str) -> Result<(), Error> {
    let expected = match workload_name {
        "w1" => 1,
        "w2" => 2,
        other => {
            return Err(Error::config(format!("unknown workload name {other:?}")));
        }
    };
    if spec.templates.len() != expected {
        return Err(Error::config(format!(
            "workload {workload_name} expects {expected} transaction template(s), found {}",
            spec.templates.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_insert_block() {
        let content = "# comment\nINSERT\nKEY: A_1, VALUE: {balance: 100}\nKEY: A_2, VALUE: {balance: 50, name: \"bob\"}\nEND\n";
        let rows = parse_input_file("t.txt", content).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "A_1");
        assert_eq!(rows[0].1.get_int("balance"), Some(100));
        assert_eq!(rows[1].1.get_str("name"), Some("bob"));
    }

    #[test]
    fn last_key_wins_on_duplicate() {
        let content = "INSERT\nKEY: A_1, VALUE: {balance: 1}\nKEY: A_1, VALUE: {balance: 2}\nEND\n";
        let rows = parse_input_file("t.txt", content).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1.get_int("balance"), Some(2));
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let content = "insert\nkey: A_1, value: {balance: 5}\nend\n";
        let rows = parse_input_file("t.txt", content).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn missing_end_is_an_error() {
        let content = "INSERT\nKEY: A_1, VALUE: {balance: 5}\n";
        assert!(parse_input_file("t.txt", content).is_err());
    }

    #[test]
    fn double_slash_comments_are_ignored() {
        let content = "// top comment\nINSERT\n// inner comment\nKEY: A_1, VALUE: {balance: 5}\nEND\n";
        let rows = parse_input_file("t.txt", content).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn insert_block_with_no_key_lines_is_an_error() {
        let content = "INSERT\nEND\n";
        let err = parse_input_file("t.txt", content).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn parses_literal_spec_grammar_and_checks_arity() {
        let content = "WORKLOAD\nTRANSACTION (INPUTS: VAR1, VAR2)\nEND\n";
        let spec = parse_workload_file("w.txt", content).unwrap();
        assert_eq!(spec.templates.len(), 1);
        assert_eq!(spec.templates[0].inputs, 2);
        assert!(check_template_count(&spec, "w1").is_ok());
    }

    #[test]
    fn w1_with_wrong_template_count_fails_check() {
        let content =
            "WORKLOAD\nTRANSACTION (INPUTS: VAR1, VAR2)\nTRANSACTION (INPUTS: VAR1)\nEND\n";
        let spec = parse_workload_file("w.txt", content).unwrap();
        assert!(check_template_count(&spec, "w1").is_err());
    }

    #[test]
    fn w2_requires_exactly_two_templates() {
        let content = "WORKLOAD\nTRANSACTION (INPUTS: VAR1, VAR2, VAR3, VAR4)\nTRANSACTION (INPUTS: VAR1, VAR2, VAR3)\nEND\n";
        let spec = parse_workload_file("w.txt", content).unwrap();
        assert_eq!(spec.templates[0].inputs, 4);
        assert_eq!(spec.templates[1].inputs, 3);
        assert!(check_template_count(&spec, "w2").is_ok());
    }

    #[test]
    fn unknown_workload_name_is_rejected() {
        let content = "WORKLOAD\nTRANSACTION (INPUTS: VAR1)\nEND\n";
        let spec = parse_workload_file("w.txt", content).unwrap();
        assert!(check_template_count(&spec, "w3").is_err());
    }
}
