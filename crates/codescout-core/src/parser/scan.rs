//! Position and block utilities shared by the language parsers.
//!
//! All offsets are byte offsets into the full file text. Parsers that scan a
//! container body work on a [`Region`] and translate hits back to file offsets
//! with [`Region::absolute`] before computing line numbers, so line numbers
//! are always file-relative.
//!
//! Brace and keyword counting here is purely lexical: delimiters inside
//! strings and comments are counted like any other.

use regex::{Captures, Regex};

use crate::definition::{CodeDefinition, DefinitionKind};

/// 1-based line number of `position` in `text`.
///
/// Equals one plus the number of newlines before `position`. Positions past
/// the end are clamped.
pub fn line_number_at(text: &str, position: usize) -> usize {
    let end = position.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Offset just past the delimiter that closes the first block opened at or
/// after `start`.
///
/// Depth starts at zero, goes up on `open` and down on `close`; the scan
/// returns as soon as a `close` brings it back to zero. An unterminated block
/// runs to the end of the text. Both delimiters must be ASCII.
pub fn find_block_end(text: &str, start: usize, open: u8, close: u8) -> usize {
    let bytes = text.as_bytes();
    let mut depth: i64 = 0;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return i + 1;
            }
        }
    }

    text.len()
}

/// Earliest start of any pattern match at or after `position`, or the end of
/// the text when nothing matches.
pub fn find_next_definition(text: &str, position: usize, patterns: &[&Regex]) -> usize {
    let position = position.min(text.len());
    patterns
        .iter()
        .filter_map(|re| re.find_at(text, position).map(|m| m.start()))
        .min()
        .unwrap_or(text.len())
}

/// First participating capture group of `pattern` matched within
/// `text[..position]`, trimmed.
pub fn extract_docstring(text: &str, pattern: &Regex, position: usize) -> Option<String> {
    let head = &text[..position.min(text.len())];
    let caps = pattern.captures(head)?;
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Net count of `{` minus `}` in `text`.
pub fn brace_balance(text: &str) -> i64 {
    text.bytes().fold(0, |depth, b| match b {
        b'{' => depth + 1,
        b'}' => depth - 1,
        _ => depth,
    })
}

/// Whether `position` lies inside an unclosed brace block.
///
/// Heuristic: any `{` in scope counts, including those of object literals,
/// closures and string contents.
pub fn is_inside_block(text: &str, position: usize) -> bool {
    brace_balance(&text[..position.min(text.len())]) > 0
}

/// Offset of the `{` opening a declaration body that starts at `from`, if the
/// brace comes before any `;`.
pub fn body_open(text: &str, from: usize) -> Option<usize> {
    for (i, b) in text.bytes().enumerate().skip(from) {
        match b {
            b'{' => return Some(i),
            b';' => return None,
            _ => {}
        }
    }
    None
}

/// First `{` or `;` at or after `from` that is not nested in parentheses or
/// brackets, with the byte found.
pub fn terminator(text: &str, from: usize) -> Option<(usize, u8)> {
    let mut depth: i64 = 0;
    for (i, b) in text.bytes().enumerate().skip(from) {
        match b {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            b'{' | b';' if depth <= 0 => return Some((i, b)),
            _ => {}
        }
    }
    None
}

/// Offset just past the first `;` at or after `from` that is not nested in
/// any bracket pair, or the end of the text.
pub fn statement_end(text: &str, from: usize) -> usize {
    let mut depth: i64 = 0;
    for (i, b) in text.bytes().enumerate().skip(from) {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b';' if depth <= 0 => return i + 1,
            _ => {}
        }
    }
    text.len()
}

/// Offset of the first `needle` byte at or after `from`.
pub fn find_byte(text: &str, from: usize, needle: u8) -> Option<usize> {
    text.as_bytes()
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
}

/// Start offset of the line containing `position`.
pub fn line_start(text: &str, position: usize) -> usize {
    let position = position.min(text.len());
    text[..position].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Offset of the newline ending the line containing `position`, or the end
/// of the text.
pub fn line_end(text: &str, position: usize) -> usize {
    find_byte(text, position, b'\n').unwrap_or(text.len())
}

/// End of a `= expression` body that starts at `from`.
///
/// Leading whitespace is skipped. A `{` opens a block that ends at its match;
/// otherwise the expression stops at the end of the line, after a `;`, or
/// before a `}` closing the enclosing block, whichever comes first.
pub fn expression_end(text: &str, from: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = from.min(bytes.len());
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= bytes.len() {
        return text.len();
    }
    if bytes[i] == b'{' {
        return find_block_end(text, i, b'{', b'}');
    }

    let mut depth: i64 = 0;
    for (j, &b) in bytes.iter().enumerate().skip(i) {
        match b {
            b'\n' => return j,
            b';' if depth <= 0 => return j + 1,
            b'{' => depth += 1,
            b'}' if depth <= 0 => return j,
            b'}' => depth -= 1,
            _ => {}
        }
    }
    text.len()
}

/// How a declaration header in a newline-terminated language ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderEnd {
    /// Body block opened by the `{` at this offset.
    Block(usize),
    /// Expression body introduced by the `=` at this offset.
    Expression(usize),
    /// No body; the declaration ends at this offset.
    Bare(usize),
}

/// Find where a Kotlin, Swift or Scala declaration header starting at `from`
/// ends.
///
/// Parentheses and brackets are skipped. A `}` outside them closes the
/// enclosing block and ends the header. A newline outside them ends the
/// header unless the line ends with `,` or `:` or the next line continues
/// it (`{`, `:`, `where`, `extends`, `with`).
pub fn header_end(text: &str, from: usize) -> HeaderEnd {
    let bytes = text.as_bytes();
    let mut depth: i64 = 0;
    let mut i = from.min(bytes.len());

    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            b'{' if depth <= 0 => return HeaderEnd::Block(i),
            b';' if depth <= 0 => return HeaderEnd::Bare(i + 1),
            b'}' if depth <= 0 => return HeaderEnd::Bare(i),
            b'=' if depth <= 0 && !is_comparison(bytes, i) => return HeaderEnd::Expression(i),
            b'\n' if depth <= 0 => {
                let before = text[from..i].trim_end();
                let next = text[i + 1..].trim_start();
                let continues = before.ends_with(',')
                    || before.ends_with(':')
                    || next.starts_with('{')
                    || next.starts_with(':')
                    || starts_with_word(next, "where")
                    || starts_with_word(next, "extends")
                    || starts_with_word(next, "with");
                if !continues {
                    return HeaderEnd::Bare(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    HeaderEnd::Bare(text.len())
}

fn is_comparison(bytes: &[u8], i: usize) -> bool {
    let prev = i.checked_sub(1).map(|p| bytes[p]);
    let next = bytes.get(i + 1).copied();
    matches!(prev, Some(b'=' | b'!' | b'<' | b'>')) || matches!(next, Some(b'=' | b'>'))
}

/// Whether `text` starts with `word` followed by a non-identifier character.
pub fn starts_with_word(text: &str, word: &str) -> bool {
    text.strip_prefix(word)
        .map(|rest| {
            rest.chars()
                .next()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '_'))
        })
        .unwrap_or(false)
}

/// End offset of the declaration whose header starts at `from`, following
/// [`header_end`].
pub fn declaration_end(text: &str, from: usize) -> usize {
    match header_end(text, from) {
        HeaderEnd::Block(open) => find_block_end(text, open, b'{', b'}'),
        HeaderEnd::Expression(eq) => expression_end(text, eq + 1),
        HeaderEnd::Bare(end) => end,
    }
}

/// Offset where the header text of a declaration starting at `from` stops:
/// before its `{`, its `=`, or at its bare end.
pub fn header_text_end(text: &str, from: usize) -> usize {
    match header_end(text, from) {
        HeaderEnd::Block(at) | HeaderEnd::Expression(at) => at,
        HeaderEnd::Bare(end) => end,
    }
}

/// Move `position` up past whole lines that start with one of `prefixes`
/// (attributes, annotations, decorators).
pub fn skip_attribute_lines(text: &str, position: usize, prefixes: &[&str]) -> usize {
    let mut start = line_start(text, position);
    while start > 0 {
        let prev = line_start(text, start - 1);
        let line = text[prev..start].trim();
        if prefixes.iter().any(|p| line.starts_with(p)) {
            start = prev;
        } else {
            break;
        }
    }
    start
}

/// Text of a `/** ... */` comment that ends right before `position`.
///
/// Only whitespace with at most one newline may separate the comment from
/// the construct. Leading `*` gutters are stripped from each line.
pub fn block_doc_before(text: &str, position: usize) -> Option<String> {
    let head = &text[..position.min(text.len())];
    let trimmed = head.trim_end();
    let gap = &head[trimmed.len()..];
    if gap.matches('\n').count() > 1 || !trimmed.ends_with("*/") {
        return None;
    }

    let open = trimmed.rfind("/**")?;
    let close = trimmed.len() - 2;
    if open + 3 > close {
        return None;
    }
    let body = &trimmed[open + 3..close];
    if body.contains("*/") {
        return None;
    }

    let cleaned = body
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .collect::<Vec<_>>()
        .join("\n");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Contiguous line comments directly above the line containing `position`.
///
/// Lines starting with `marker` are collected (repeated marker characters
/// are stripped too); lines starting with one of `skip` are passed over;
/// anything else stops the scan.
pub fn line_comments_before(
    text: &str,
    position: usize,
    marker: &str,
    skip: &[&str],
) -> Option<String> {
    let marker_char = marker.chars().next()?;
    let mut collected = Vec::new();
    let mut end = line_start(text, position);

    while end > 0 {
        let start = line_start(text, end - 1);
        let line = text[start..end].trim();
        end = start;

        if let Some(rest) = line.strip_prefix(marker) {
            collected.push(rest.trim_start_matches(marker_char).trim());
        } else if !line.is_empty() && skip.iter().any(|p| line.starts_with(p)) {
            continue;
        } else {
            break;
        }
    }

    if collected.is_empty() {
        return None;
    }
    collected.reverse();
    let joined = collected.join("\n");
    let joined = joined.trim();
    (!joined.is_empty()).then(|| joined.to_string())
}

/// Block doc comment if present, otherwise contiguous line comments.
pub fn doc_before(text: &str, position: usize, marker: &str, skip: &[&str]) -> Option<String> {
    let anchor = skip_attribute_lines(text, position, skip);
    block_doc_before(text, anchor).or_else(|| line_comments_before(text, position, marker, skip))
}

/// Precomputed line starts for fast offset to line translation.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    /// 1-based line containing `position`.
    pub fn line_at(&self, position: usize) -> usize {
        self.starts.partition_point(|&s| s <= position).max(1)
    }
}

/// A slice of the file together with its absolute start offset.
#[derive(Debug, Clone, Copy)]
pub struct Region<'a> {
    pub text: &'a str,
    pub offset: usize,
}

impl<'a> Region<'a> {
    pub fn new(content: &'a str, start: usize, end: usize) -> Self {
        let end = end.min(content.len());
        let start = start.min(end);
        Self {
            text: &content[start..end],
            offset: start,
        }
    }

    /// Translate a region-relative offset to a file offset.
    pub fn absolute(&self, relative: usize) -> usize {
        self.offset + relative
    }

    /// Brace depth at a region-relative offset, counted from the region start.
    pub fn depth_at(&self, relative: usize) -> i64 {
        brace_balance(&self.text[..relative.min(self.text.len())])
    }

    /// Whether the region-relative offset sits directly in the first brace
    /// body of the region.
    pub fn is_member_position(&self, relative: usize) -> bool {
        self.depth_at(relative) == 1
    }
}

/// File text plus path and line index, used to build definitions.
pub struct Source<'a> {
    pub text: &'a str,
    pub path: &'a str,
    lines: LineIndex,
}

impl<'a> Source<'a> {
    pub fn new(text: &'a str, path: &'a str) -> Self {
        Self {
            text,
            path,
            lines: LineIndex::new(text),
        }
    }

    /// 1-based line of an absolute offset.
    pub fn line_at(&self, position: usize) -> usize {
        self.lines.line_at(position)
    }

    /// Start and end lines of `text[start..end]`, ignoring surrounding
    /// whitespace.
    pub fn line_span(&self, start: usize, end: usize) -> (usize, usize) {
        let end = end.min(self.text.len()).max(start);
        let slice = &self.text[start..end];
        let lead = slice.len() - slice.trim_start().len();
        let first = start + lead;
        let last = first + slice.trim().len();
        let start_line = self.line_at(first);
        let end_line = if last > first {
            self.line_at(last - 1)
        } else {
            start_line
        };
        (start_line, end_line.max(start_line))
    }

    /// Build a definition spanning `start..end` with the given header text.
    pub fn define(
        &self,
        name: impl Into<String>,
        kind: DefinitionKind,
        start: usize,
        end: usize,
        signature: &str,
    ) -> CodeDefinition {
        let (start_line, end_line) = self.line_span(start, end);
        CodeDefinition::new(name, kind, self.path, start_line, end_line, signature)
    }
}

/// A definition together with its absolute byte range.
#[derive(Debug, Clone)]
pub struct Located {
    pub def: CodeDefinition,
    pub start: usize,
    pub end: usize,
}

impl Located {
    pub fn new(def: CodeDefinition, start: usize, end: usize) -> Self {
        Self { def, start, end }
    }

    /// Whether `position` lies strictly inside this definition's range.
    pub fn contains(&self, position: usize) -> bool {
        self.start < position && position < self.end
    }
}

/// Offset of the first character of a match past leading whitespace and
/// any statement delimiter (`{`, `;`, `}`) the pattern anchored on.
pub fn match_start(m: &regex::Match<'_>) -> usize {
    let text = m.as_str();
    let rest = text.trim_start_matches(|c: char| c.is_whitespace() || is_delimiter(c));
    m.start() + (text.len() - rest.len())
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '{' | ';' | '}')
}

/// Every match of a member `pattern` in `text`.
///
/// Member patterns anchor on a line start or a statement delimiter. When a
/// match ends on a delimiter, the next search starts on it so the following
/// member on the same line can anchor there.
pub fn member_captures<'t>(pattern: &Regex, text: &'t str) -> Vec<Captures<'t>> {
    let mut found = Vec::new();
    let mut at = 0;

    while at <= text.len() {
        let Some(caps) = pattern.captures_at(text, at) else {
            break;
        };
        let Some(m) = caps.get(0) else {
            break;
        };
        let last = m.end().saturating_sub(1);
        at = if last > m.start() && is_delimiter(char::from(text.as_bytes()[last])) {
            last
        } else {
            m.end().max(m.start() + 1)
        };
        found.push(caps);
    }

    found
}

/// Index of the innermost item in `items` whose range strictly encloses
/// `position`.
pub fn innermost_enclosing(items: &[Located], position: usize) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.contains(position))
        .min_by_key(|(_, item)| item.end - item.start)
        .map(|(i, _)| i)
}

/// Where a declaration sits relative to a set of containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Directly in the body of the container at this index.
    Member(usize),
    /// Outside every container and every brace block.
    TopLevel,
    /// Inside some other block, such as a function body.
    Nested,
}

/// Classify `position` against `containers` by brace depth.
pub fn placement(text: &str, containers: &[Located], position: usize) -> Placement {
    match innermost_enclosing(containers, position) {
        Some(owner) => {
            let region = Region::new(text, containers[owner].start, containers[owner].end);
            if region.is_member_position(position - region.offset) {
                Placement::Member(owner)
            } else {
                Placement::Nested
            }
        }
        None if is_inside_block(text, position) => Placement::Nested,
        None => Placement::TopLevel,
    }
}

/// Link containers nested inside other containers.
///
/// The innermost container whose range encloses another container's start
/// becomes its parent, and lists it among its children.
pub fn link_nested(containers: &mut [Located]) {
    let links: Vec<(usize, usize)> = (0..containers.len())
        .filter_map(|idx| {
            let start = containers[idx].start;
            containers
                .iter()
                .enumerate()
                .filter(|(other, c)| {
                    *other != idx && c.start < start && containers[idx].end <= c.end
                })
                .min_by_key(|(_, c)| c.end - c.start)
                .map(|(parent, _)| (idx, parent))
        })
        .collect();

    for (child, parent) in links {
        let parent_name = containers[parent].def.name.clone();
        let child_name = containers[child].def.name.clone();
        containers[child].def.parent = Some(parent_name);
        containers[parent].def.add_child(child_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_number_at() {
        let text = "a\nb\nc";
        assert_eq!(line_number_at(text, 0), 1);
        assert_eq!(line_number_at(text, 2), 2);
        assert_eq!(line_number_at(text, 4), 3);
        assert_eq!(line_number_at(text, 100), 3);
    }

    #[test]
    fn test_line_index_agrees_with_line_number_at() {
        let text = "fn a() {\n}\n\nfn b() {}\n";
        let index = LineIndex::new(text);
        for pos in 0..=text.len() {
            assert_eq!(index.line_at(pos), line_number_at(text, pos), "pos {}", pos);
        }
    }

    #[test]
    fn test_find_block_end_nested() {
        let text = "fn a() { if x { y } }";
        let end = find_block_end(text, 0, b'{', b'}');
        assert_eq!(end, text.len());
        assert_eq!(&text[..end], text);

        let text = "{ a } tail";
        assert_eq!(find_block_end(text, 0, b'{', b'}'), 5);
    }

    #[test]
    fn test_find_block_end_unterminated() {
        let text = "fn a() { if x {";
        assert_eq!(find_block_end(text, 0, b'{', b'}'), text.len());
    }

    #[test]
    fn test_find_next_definition() {
        let fn_re = Regex::new(r"\bfn\s+\w+").unwrap();
        let struct_re = Regex::new(r"\bstruct\s+\w+").unwrap();
        let text = "fn a() {}\nstruct B;\nfn c() {}";
        assert_eq!(find_next_definition(text, 1, &[&fn_re, &struct_re]), 10);
        assert_eq!(find_next_definition(text, 25, &[&fn_re, &struct_re]), text.len());
    }

    #[test]
    fn test_extract_docstring_first_group() {
        let re = Regex::new(r#"(?s)\A\s*(?:"""(.*?)"""|'''(.*?)''')"#).unwrap();
        let body = "\n    '''Say hi.'''\n    pass\n";
        assert_eq!(
            extract_docstring(body, &re, body.len()),
            Some("Say hi.".to_string())
        );
        assert_eq!(extract_docstring("pass", &re, 4), None);
    }

    #[test]
    fn test_is_inside_block() {
        let text = "impl A { fn b() {} }\nfn c() {}";
        assert!(is_inside_block(text, text.find("fn b").unwrap()));
        assert!(!is_inside_block(text, text.find("fn c").unwrap()));
    }

    #[test]
    fn test_inside_block_misfires_on_object_literal() {
        // Unclosed object literal braces count as a block.
        let text = "const cfg = {\n  a: 1,\nfunction late() {}";
        assert!(is_inside_block(text, text.find("function").unwrap()));
    }

    #[test]
    fn test_body_open_stops_at_semicolon() {
        assert_eq!(body_open("struct A;\nstruct B {}", 0), None);
        assert_eq!(body_open("struct A {}", 0), Some(9));
    }

    #[test]
    fn test_terminator_skips_brackets() {
        let text = "fn f(x: [u8; 4]) -> u8 { 0 }";
        assert_eq!(terminator(text, 4), Some((23, b'{')));
        assert_eq!(terminator("fn g(&self);", 4), Some((11, b';')));
        assert_eq!(terminator("fn h(", 4), None);
    }

    #[test]
    fn test_statement_end_skips_blocks() {
        let text = "const X: u8 = { let a = 1; a };\nnext";
        assert_eq!(&text[..statement_end(text, 0)], "const X: u8 = { let a = 1; a };");
        assert_eq!(statement_end("type A = B", 0), 10);
    }

    #[test]
    fn test_expression_end() {
        let text = "val x = 1 + 2\nval y = 3";
        assert_eq!(&text[..expression_end(text, 7)], "val x = 1 + 2");
        let text = "x = { a }; rest";
        assert_eq!(&text[..expression_end(text, 3)], "x = { a }");
        let text = "x = 1; y";
        assert_eq!(&text[..expression_end(text, 3)], "x = 1;");
        assert_eq!(expression_end("x =   ", 3), 6);
    }

    #[test]
    fn test_header_end_variants() {
        let text = "class Foo(val x: Int) {\n}";
        assert_eq!(header_end(text, 0), HeaderEnd::Block(22));

        let text = "fun sq(x: Int) = x * x\n";
        assert_eq!(header_end(text, 0), HeaderEnd::Expression(15));

        let text = "data class P(val x: Int)\nclass Q {}";
        assert_eq!(header_end(text, 0), HeaderEnd::Bare(24));

        let text = "class A(\n  x: Int\n) : B,\n  C {\n}";
        assert!(matches!(header_end(text, 0), HeaderEnd::Block(_)));

        let text = "fun f(a: Int = 1) {}";
        assert_eq!(header_end(text, 0), HeaderEnd::Block(18));
    }

    #[test]
    fn test_headers_stop_at_enclosing_close() {
        let text = "protocol P { func f() }";
        let from = text.find("f()").unwrap() + 1;
        assert_eq!(&text[..header_text_end(text, from)], "protocol P { func f() ");

        let text = "object O { val v = if (a) { 1 } else 2 }";
        let from = text.find('=').unwrap() + 1;
        assert_eq!(&text[..expression_end(text, from)], "object O { val v = if (a) { 1 } else 2 ");
    }

    #[test]
    fn test_member_captures_share_delimiters() {
        let re = Regex::new(r"(?m)(?:^|[{;}])[ \t]*int\s+(\w+)\(\);").unwrap();
        let text = "interface I { int a();int b(); }";
        let found = member_captures(&re, text);
        let names: Vec<_> = found.iter().map(|caps| &caps[1]).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(re.captures_iter(text).count(), 1);

        let m = found[1].get(0).unwrap();
        assert_eq!(&text[match_start(&m)..m.end()], "int b();");
    }

    #[test]
    fn test_block_doc_before() {
        let text = "/**\n * Adds numbers.\n * Fast.\n */\nint add(int a) {}";
        let pos = text.find("int add").unwrap();
        assert_eq!(
            block_doc_before(text, pos),
            Some("Adds numbers.\nFast.".to_string())
        );
    }

    #[test]
    fn test_block_doc_requires_adjacency() {
        let text = "/** far */\n\n\nint add() {}";
        assert_eq!(block_doc_before(text, text.find("int").unwrap()), None);

        let text = "/** a */ int x; /* plain */\nint add() {}";
        assert_eq!(block_doc_before(text, text.find("int add").unwrap()), None);
    }

    #[test]
    fn test_line_comments_before_skips_attributes() {
        let text = "/// Point in space.\n/// Two dims.\n#[derive(Debug)]\npub struct P;";
        let pos = text.find("pub struct").unwrap();
        assert_eq!(
            line_comments_before(text, pos, "///", &["#["]),
            Some("Point in space.\nTwo dims.".to_string())
        );
    }

    #[test]
    fn test_line_comments_stop_at_code() {
        let text = "// old\nx := 1\n// Add sums.\nfunc Add() {}";
        let pos = text.find("func").unwrap();
        assert_eq!(
            line_comments_before(text, pos, "//", &[]),
            Some("Add sums.".to_string())
        );
    }

    #[test]
    fn test_doc_before_sees_block_above_annotation() {
        let text = "/** Runs it. */\n@Override\npublic void run() {}";
        let pos = text.find("public").unwrap();
        assert_eq!(doc_before(text, pos, "//", &["@"]), Some("Runs it.".to_string()));
    }

    #[test]
    fn test_region_translation() {
        let content = "xxxxclass A { fn b() {} }";
        let region = Region::new(content, 4, content.len());
        let rel = region.text.find("fn b").unwrap();
        assert_eq!(&content[region.absolute(rel)..region.absolute(rel) + 4], "fn b");
        assert!(region.is_member_position(rel));
    }

    #[test]
    fn test_line_span_ignores_trailing_newline() {
        let text = "fn a() {\n}\n";
        let source = Source::new(text, "a.rs");
        assert_eq!(source.line_span(0, text.len()), (1, 2));

        let text = "fn a() {\n";
        let source = Source::new(text, "a.rs");
        assert_eq!(source.line_span(0, text.len()), (1, 1));
    }

    #[test]
    fn test_link_nested() {
        let mut containers = vec![
            Located::new(
                CodeDefinition::new("Outer", DefinitionKind::Class, "A.java", 1, 5, "class Outer"),
                0,
                100,
            ),
            Located::new(
                CodeDefinition::new("Inner", DefinitionKind::Class, "A.java", 2, 4, "class Inner"),
                20,
                80,
            ),
        ];
        link_nested(&mut containers);
        assert_eq!(containers[1].def.parent.as_deref(), Some("Outer"));
        assert_eq!(containers[0].def.children, vec!["Inner".to_string()]);
        assert!(containers[0].def.parent.is_none());
    }

    #[test]
    fn test_innermost_enclosing() {
        let def = |name: &str| CodeDefinition::new(name, DefinitionKind::Module, "a.rb", 1, 1, name);
        let items = vec![
            Located::new(def("A"), 0, 100),
            Located::new(def("B"), 10, 50),
        ];
        assert_eq!(innermost_enclosing(&items, 20), Some(1));
        assert_eq!(innermost_enclosing(&items, 60), Some(0));
        assert_eq!(innermost_enclosing(&items, 200), None);
    }
}
