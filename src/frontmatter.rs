//! `+++`-delimited frontmatter parser.
//!
//! Content files may start with a block of `key = value` lines between two
//! `+++` delimiters. Only the subset of TOML the corpus actually uses is
//! understood: flat pairs, one level of `[section]` tables, quoted strings,
//! bare booleans and integers, and single-line JSON-like arrays.
//!
//! Parsing never fails. Lines that do not fit the grammar are dropped, and a
//! missing or unterminated block yields an empty [`Frontmatter`] with the
//! original text as the body.

/// Marker line opening and closing a frontmatter block.
pub const DELIMITER: &str = "+++";

/// A typed frontmatter value.
#[derive(Debug, Clone, PartialEq)]
pub enum FrontmatterValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Array(Vec<serde_json::Value>),
    Table(Frontmatter),
}

impl FrontmatterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FrontmatterValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Scalar value rendered as text. Tables have no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            FrontmatterValue::String(s) => Some(s.clone()),
            FrontmatterValue::Boolean(b) => Some(b.to_string()),
            FrontmatterValue::Integer(i) => Some(i.to_string()),
            FrontmatterValue::Array(items) => serde_json::to_string(items).ok(),
            FrontmatterValue::Table(_) => None,
        }
    }

    /// False for empty strings, `false`, `0`, and empty arrays or tables.
    pub fn is_truthy(&self) -> bool {
        match self {
            FrontmatterValue::String(s) => !s.is_empty(),
            FrontmatterValue::Boolean(b) => *b,
            FrontmatterValue::Integer(i) => *i != 0,
            FrontmatterValue::Array(items) => !items.is_empty(),
            FrontmatterValue::Table(t) => !t.is_empty(),
        }
    }
}

/// Insertion-ordered key/value mapping with at most one level of nesting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    entries: Vec<(String, FrontmatterValue)>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FrontmatterValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or overwrite. An overwritten key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: FrontmatterValue) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// A top-level scalar rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(FrontmatterValue::to_text)
    }

    /// A nested `[name]` table.
    pub fn table(&self, name: &str) -> Option<&Frontmatter> {
        match self.get(name) {
            Some(FrontmatterValue::Table(t)) => Some(t),
            _ => None,
        }
    }

    /// True when `key` is present with a non-empty value.
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(FrontmatterValue::is_truthy)
    }
}

/// Split raw file text into its frontmatter and trimmed body.
pub fn parse(raw: &str) -> (Frontmatter, String) {
    let Some(rest) = raw.strip_prefix(DELIMITER) else {
        return (Frontmatter::new(), raw.to_string());
    };
    let Some((block, body)) = rest.split_once(DELIMITER) else {
        return (Frontmatter::new(), raw.to_string());
    };
    (parse_block(block.trim()), body.trim().to_string())
}

fn parse_block(block: &str) -> Frontmatter {
    let mut frontmatter = Frontmatter::new();
    let mut current_table: Option<String> = None;

    for line in block.split('\n') {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
            let name = &line[1..line.len() - 1];
            if !matches!(frontmatter.get(name), Some(FrontmatterValue::Table(_))) {
                frontmatter.insert(name, FrontmatterValue::Table(Frontmatter::new()));
            }
            current_table = Some(name.to_string());
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = parse_value(value.trim());

        match &current_table {
            Some(name) => {
                if let Some(FrontmatterValue::Table(table)) = frontmatter.get_mut(name) {
                    table.insert(key, value);
                }
            }
            None => frontmatter.insert(key, value),
        }
    }

    frontmatter
}

fn parse_value(value: &str) -> FrontmatterValue {
    if let Some(inner) = unquote(value, '"').or_else(|| unquote(value, '\'')) {
        return FrontmatterValue::String(inner.to_string());
    }

    if value.starts_with('[') {
        return match serde_json::from_str::<Vec<serde_json::Value>>(&value.replace('\'', "\"")) {
            Ok(items) => FrontmatterValue::Array(items),
            Err(_) => FrontmatterValue::String(value.to_string()),
        };
    }

    match value {
        "true" => return FrontmatterValue::Boolean(true),
        "false" => return FrontmatterValue::Boolean(false),
        _ => {}
    }

    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = value.parse::<i64>() {
            return FrontmatterValue::Integer(n);
        }
    }

    FrontmatterValue::String(value.to_string())
}

/// Strip a matching pair of quotes. A lone quote character unquotes to "".
fn unquote(value: &str, quote: char) -> Option<&str> {
    if !(value.starts_with(quote) && value.ends_with(quote)) {
        return None;
    }
    if value.len() < 2 {
        return Some("");
    }
    Some(&value[1..value.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(value: &str) -> FrontmatterValue {
        FrontmatterValue::String(value.to_string())
    }

    #[test]
    fn text_without_delimiter_is_all_body() {
        let raw = "# Heading\n\nSome text = not frontmatter\n";
        let (fm, body) = parse(raw);
        assert!(fm.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn unterminated_block_is_all_body() {
        let raw = "+++\ntitle = \"Open\"\n\nno closing marker";
        let (fm, body) = parse(raw);
        assert!(fm.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn quoted_title_is_unquoted() {
        let (fm, body) = parse("+++\ntitle = \"Elohim\"\n+++\n\nBody text.\n");
        assert_eq!(fm.get("title"), Some(&s("Elohim")));
        assert_eq!(body, "Body text.");
    }

    #[test]
    fn values_are_typed() {
        let raw = r#"+++
title = 'Single quoted'
draft = false
featured = true
weight = 42
tags = ['a', "b"]
broken = [not json
slug = the-slug
empty = ""
+++
"#;
        let (fm, _) = parse(raw);
        assert_eq!(fm.get("title"), Some(&s("Single quoted")));
        assert_eq!(fm.get("draft"), Some(&FrontmatterValue::Boolean(false)));
        assert_eq!(fm.get("featured"), Some(&FrontmatterValue::Boolean(true)));
        assert_eq!(fm.get("weight"), Some(&FrontmatterValue::Integer(42)));
        assert_eq!(
            fm.get("tags"),
            Some(&FrontmatterValue::Array(vec![json!("a"), json!("b")]))
        );
        assert_eq!(fm.get("broken"), Some(&s("[not json")));
        assert_eq!(fm.get("slug"), Some(&s("the-slug")));
        assert_eq!(fm.get("empty"), Some(&s("")));
        assert!(!fm.has_value("empty"));
    }

    #[test]
    fn oversized_integer_stays_text() {
        let (fm, _) = parse("+++\nbig = 99999999999999999999999\n+++\n");
        assert_eq!(fm.get("big"), Some(&s("99999999999999999999999")));
    }

    #[test]
    fn section_headers_nest_one_level() {
        let raw = r#"+++
title = "Timeline"
template = "timeline-page.html"

[extra]
# comment inside a table
order = 3
image = "/images/x.png"

[taxonomies]
tags = ["history"]
+++
Body"#;
        let (fm, body) = parse(raw);
        assert_eq!(body, "Body");
        assert_eq!(
            fm.keys().collect::<Vec<_>>(),
            vec!["title", "template", "extra", "taxonomies"]
        );
        let extra = fm.table("extra").unwrap();
        assert_eq!(extra.get("order"), Some(&FrontmatterValue::Integer(3)));
        assert_eq!(extra.get("image"), Some(&s("/images/x.png")));
        assert!(!fm.contains_key("order"));
        let tax = fm.table("taxonomies").unwrap();
        assert_eq!(
            tax.get("tags"),
            Some(&FrontmatterValue::Array(vec![json!("history")]))
        );
    }

    #[test]
    fn reopened_table_keeps_earlier_keys() {
        let raw = "+++\n[extra]\na = 1\n[other]\nx = 2\n[extra]\nb = 3\n+++\n";
        let (fm, _) = parse(raw);
        let extra = fm.table("extra").unwrap();
        assert_eq!(extra.len(), 2);
        assert_eq!(fm.len(), 2);
    }

    #[test]
    fn malformed_lines_are_ignored() {
        let raw = "+++\ntitle = \"Ok\"\nthis line has no equals\n  \n# note\n+++\n";
        let (fm, _) = parse(raw);
        assert_eq!(fm.len(), 1);
        assert_eq!(fm.text("title").as_deref(), Some("Ok"));
    }

    #[test]
    fn value_may_contain_equals() {
        let (fm, _) = parse("+++\nquery = \"a=b\"\nraw = x = y\n+++\n");
        assert_eq!(fm.get("query"), Some(&s("a=b")));
        assert_eq!(fm.get("raw"), Some(&s("x = y")));
    }

    #[test]
    fn empty_block_is_empty_mapping() {
        let (fm, body) = parse("+++\n+++\nJust body");
        assert!(fm.is_empty());
        assert_eq!(body, "Just body");
    }

    #[test]
    fn reparse_is_idempotent() {
        let lines = "title = \"Round trip\"\ndescription = \"A page\"\nweight = 7\n[extra]\nflag = true";
        let body = "Body paragraph.\n\nSecond paragraph.";
        let raw = format!("{DELIMITER}\n{lines}\n{DELIMITER}\n{body}");

        let (first, first_body) = parse(&raw);
        let again = format!("{DELIMITER}\n{lines}\n{DELIMITER}\n{first_body}");
        let (second, second_body) = parse(&again);

        assert_eq!(first, second);
        assert_eq!(first_body, second_body);
        assert_eq!(first_body, body);
    }

    #[test]
    fn text_renders_scalars() {
        let (fm, _) = parse("+++\nweight = 5\nflag = true\nlist = [1, 2]\n[t]\nk = 1\n+++\n");
        assert_eq!(fm.text("weight").as_deref(), Some("5"));
        assert_eq!(fm.text("flag").as_deref(), Some("true"));
        assert_eq!(fm.text("list").as_deref(), Some("[1,2]"));
        assert_eq!(fm.text("t"), None);
    }
}
