//! Line assembly
//!
//! Turns raw source lines into logical lines ready for tokenization. One
//! call to [`SourceReader::next_line`] yields one logical line: it picks the
//! next raw line from four prioritized buffers, strips comments, folds
//! line joins and raw-string regions, and splits statements on the `;`
//! splitter and on the auto-split keywords. Split remainders are queued and
//! drained before the next source line.
//!
//! All scanning here must ignore matches inside string literals, raw-string
//! regions and `()[]{}` nesting, so every search/replace/split goes through
//! [`scan_code`].

use std::collections::VecDeque;
use std::fs;
use std::io::{self, BufRead};

use tracing::debug;

use crate::diag::Diag;
use crate::token::{KEYWORDS, Keyword};

/// Buffer a logical line was produced from. Affects auto-splitting and the
/// visibility of system-namespace spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Source,
    Split,
    Insertion,
    Addition,
}

impl Origin {
    pub(crate) fn tag(self) -> &'static str {
        match self {
            Origin::Source => "src",
            Origin::Split => "spl",
            Origin::Insertion => "ins",
            Origin::Addition => "add",
        }
    }
}

const COMMENT_MARK: &str = "//";
const LINE_JOINER: &str = " \\";
const SPLITTER: u8 = b';';
/// Placeholder that keeps explicit splitters in place across the split so
/// fragment lengths keep adding up to original column positions.
const SPLIT_MARK: &str = "#";
const SPLIT_PRESERVE: &str = "#;";
pub(crate) const RAW_BEG: &str = "r\"[";
pub(crate) const RAW_END: &str = "]\"";

/// Scan `bytes` calling `at_code(i)` at every position that lies outside
/// string literals, raw-string regions and bracket nesting. A closing
/// `) ] }` counts as outside the nest it closes, which is what lets the
/// `):`  auto-splitter match. `at_code` returns the number of bytes it
/// consumed (0 to let the scanner advance itself).
fn scan_code(bytes: &[u8], mut at_code: impl FnMut(usize) -> usize) {
    let mut in_str = false;
    let mut in_raw = false;
    let mut level: i32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        if in_raw {
            if bytes[i..].starts_with(RAW_END.as_bytes()) {
                in_raw = false;
                i += RAW_END.len();
            } else {
                i += 1;
            }
            continue;
        }
        if in_str {
            if bytes[i] == b'"' {
                // Doubled qualifier stays inside the literal
                if bytes.get(i + 1) == Some(&b'"') {
                    i += 2;
                } else {
                    in_str = false;
                    i += 1;
                }
            } else {
                i += 1;
            }
            continue;
        }
        if matches!(bytes[i], b')' | b']' | b'}') {
            level -= 1;
        }
        if level <= 0 {
            let used = at_code(i);
            if used > 0 {
                i += used;
                continue;
            }
        }
        match bytes[i] {
            b'"' => in_str = true,
            b'(' | b'[' | b'{' => level += 1,
            b'r' if bytes[i..].starts_with(RAW_BEG.as_bytes()) => {
                in_raw = true;
                i += RAW_BEG.len();
                continue;
            }
            _ => {}
        }
        i += 1;
    }
}

/// First occurrence of `needle` outside strings/raw regions/nesting.
fn find_code(line: &str, needle: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut found = None;
    scan_code(bytes, |i| {
        if found.is_none() && bytes[i..].starts_with(needle.as_bytes()) {
            found = Some(i);
        }
        0
    });
    found
}

/// Replace every occurrence of `old` outside strings/raw regions/nesting.
fn replace_code(line: &str, old: &str, new: &str) -> String {
    let bytes = line.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut last = 0;
    scan_code(bytes, |i| {
        if bytes[i..].starts_with(old.as_bytes()) {
            out.extend_from_slice(&bytes[last..i]);
            out.extend_from_slice(new.as_bytes());
            last = i + old.len();
            old.len()
        } else {
            0
        }
    });
    out.extend_from_slice(&bytes[last..]);
    String::from_utf8_lossy(&out).into_owned()
}

/// Split on `sep` occurrences outside strings/raw regions/nesting. The
/// separators themselves are dropped.
fn split_code(line: &str, sep: u8) -> Vec<String> {
    let bytes = line.as_bytes();
    let mut parts = Vec::new();
    let mut last = 0;
    scan_code(bytes, |i| {
        if bytes[i] == sep {
            parts.push(String::from_utf8_lossy(&bytes[last..i]).into_owned());
            last = i + 1;
            1
        } else {
            0
        }
    });
    parts.push(String::from_utf8_lossy(&bytes[last..]).into_owned());
    parts
}

/// Pulls logical lines out of the four line buffers.
#[derive(Debug)]
pub(crate) struct SourceReader {
    file: String,
    tab_size: usize,
    /// Source lines, fully read at open time
    buffer: Vec<String>,
    buffer_pos: usize,
    /// 0-based number of the first source line of the current logical line
    line_nr: usize,
    /// Cumulated length of the fragments handed out for the current source
    /// line; `cumul_len - fragment.len()` recovers the fragment's offset
    cumul_len: usize,
    /// Last line before statement splitting, for diagnostics on fragments
    orig_line: String,
    /// Line shown in diagnostics (the unsplit original for split fragments)
    display_line: String,
    split_buf: VecDeque<String>,
    ins_buf: VecDeque<String>,
    add_buf: VecDeque<String>,
    /// Spellings that get a splitter appended wherever they appear
    auto_split: Vec<String>,
}

impl SourceReader {
    /// Auto-splitters: the `):`  bigraph plus every keyword spelled with a
    /// leading or trailing `:`, except `:loop` which expects its condition
    /// on the same statement.
    fn auto_split_list() -> Vec<String> {
        let mut list = vec!["):".to_string()];
        for (kw, text) in KEYWORDS {
            if (text.starts_with(':') || text.ends_with(':')) && kw != Keyword::Loop {
                list.push(text.to_string());
            }
        }
        list
    }

    pub(crate) fn from_lines(file: &str, lines: Vec<String>, tab_size: usize) -> Self {
        SourceReader {
            file: file.to_string(),
            tab_size,
            buffer: lines,
            buffer_pos: 0,
            line_nr: 0,
            cumul_len: 0,
            orig_line: String::new(),
            display_line: String::new(),
            split_buf: VecDeque::new(),
            ins_buf: VecDeque::new(),
            add_buf: VecDeque::new(),
            auto_split: Self::auto_split_list(),
        }
    }

    pub(crate) fn open(file: &str, tab_size: usize) -> Result<Self, Diag> {
        let text = fs::read_to_string(file)
            .map_err(|e| Diag::on_line(file, 0, format!("Cannot read source file: {e}")))?;
        Ok(Self::from_lines(file, lines_of(&text), tab_size))
    }

    pub(crate) fn from_stdin(file: &str, tab_size: usize) -> Result<Self, Diag> {
        let mut lines = Vec::new();
        for line in io::stdin().lock().lines() {
            let line = line
                .map_err(|e| Diag::on_line(file, 0, format!("Cannot read standard input: {e}")))?;
            lines.push(line.strip_suffix('\r').unwrap_or(&line).to_string());
        }
        Ok(Self::from_lines(file, lines, tab_size))
    }

    pub(crate) fn file(&self) -> &str {
        &self.file
    }

    /// 0-based source line number of the current logical line.
    pub(crate) fn line_nr(&self) -> usize {
        self.line_nr
    }

    pub(crate) fn cumul_len(&self) -> usize {
        self.cumul_len
    }

    /// Line to show next to diagnostics for the current fragment.
    pub(crate) fn display_line(&self) -> &str {
        &self.display_line
    }

    /// Queue a compiler-generated line; consumed before anything else.
    pub(crate) fn insert(&mut self, line: &str) {
        debug!("queued (ins): {line}");
        self.ins_buf.push_back(line.to_string());
    }

    /// Queue a compiler-generated line for after the source runs out.
    pub(crate) fn add(&mut self, line: &str, at_top: bool) {
        if at_top {
            debug!("queued first (add): {line}");
            self.add_buf.push_front(line.to_string());
        } else {
            debug!("queued (add): {line}");
            self.add_buf.push_back(line.to_string());
        }
    }

    /// Produce the next logical line, or `None` at end of source.
    pub(crate) fn next_line(&mut self) -> Result<Option<(String, Origin)>, Diag> {
        let mut end_of_source = false;
        let mut source_line;
        let mut origin;
        let mut may_split;

        loop {
            source_line = String::new();
            origin = Origin::Source;
            may_split = false;
            let mut line_join_nr = 0usize;
            let mut joining = false;
            let mut raw_mode = false;

            loop {
                let mut single: String;
                if let Some(line) = self.ins_buf.pop_front() {
                    single = line;
                    origin = Origin::Insertion;
                    may_split = true;
                } else if let Some(line) = self.split_buf.pop_front() {
                    single = line;
                    origin = Origin::Split;
                    may_split = false;
                } else if self.buffer_pos < self.buffer.len() {
                    single = self.buffer[self.buffer_pos].clone();
                    self.buffer_pos += 1;
                    origin = Origin::Source;
                    may_split = true;
                } else if let Some(line) = self.add_buf.pop_front() {
                    single = line;
                    origin = Origin::Addition;
                    may_split = true;
                } else {
                    end_of_source = true;
                    single = String::new();
                    origin = Origin::Source;
                    may_split = false;
                }

                // Comments, tabs and trailing blanks are dealt with before
                // anything else, but never inside an open raw string
                if !raw_mode {
                    if let Some(pos) = find_code(&single, COMMENT_MARK) {
                        single.truncate(pos);
                    }
                    single = single.replace('\t', &" ".repeat(self.tab_size));
                    single.truncate(single.trim_end().len());
                }

                // A line opens a raw string when its last opener has no
                // closer after it; any closer present may end the region
                let raw_beg = match single.rfind(RAW_BEG) {
                    Some(beg) => match single.rfind(RAW_END) {
                        Some(end) => end < beg,
                        None => true,
                    },
                    None => false,
                };
                let raw_end = single.contains(RAW_END);
                if raw_beg {
                    raw_mode = true;
                }

                if joining {
                    single = single.trim_start().to_string();
                }

                if raw_mode {
                    if !source_line.is_empty() {
                        source_line.push('\n');
                    }
                    source_line.push_str(&single);
                    line_join_nr += 1;
                } else if origin != Origin::Split && single.ends_with(LINE_JOINER) {
                    // Split fragments never carry a joiner; the other
                    // buffers must still have a line to continue with
                    match origin {
                        Origin::Insertion if self.ins_buf.is_empty() => {
                            return Err(self.line_err("Line continuation found at end of insertion buffer"));
                        }
                        Origin::Addition if self.add_buf.is_empty() => {
                            return Err(self.line_err("Line continuation found at end of addition buffer"));
                        }
                        Origin::Source if self.buffer_pos == self.buffer.len() => {
                            return Err(self.line_err("Line continuation found at end of source"));
                        }
                        _ => {}
                    }
                    source_line.push_str(&single[..single.len() - LINE_JOINER.len()]);
                    line_join_nr += 1;
                    joining = true;
                } else {
                    source_line.push_str(&single);
                    joining = false;
                }

                if !raw_beg && raw_end {
                    raw_mode = false;
                }

                if !(joining || raw_mode) || end_of_source {
                    break;
                }
            }

            if end_of_source {
                if joining {
                    return Err(self.line_err("Line continuation found at end of source"));
                }
                if raw_mode {
                    return Err(self.line_err("Raw string still open at end of source"));
                }
            }

            if origin == Origin::Source {
                self.line_nr = self.buffer_pos.saturating_sub(line_join_nr + 1);
            }

            // Statement split: explicit splitters and auto-splitters. The
            // `#` round-trip keeps every explicit `;` inside its fragment so
            // fragment lengths still add up to original column offsets.
            if !source_line.is_empty()
                && may_split
                && source_line.bytes().any(|b| b == b':' || b == SPLITTER)
            {
                let do_split = find_code(&source_line, ";").is_some()
                    || self.auto_split.iter().any(|k| find_code(&source_line, k).is_some());
                if do_split {
                    self.orig_line = source_line.clone();
                    let mut work = replace_code(&source_line, ";", SPLIT_PRESERVE);
                    for kw in &self.auto_split {
                        work = replace_code(&work, kw, &format!("{kw};"));
                    }
                    let mut first = String::new();
                    for (i, frag) in split_code(&work, SPLITTER).into_iter().enumerate() {
                        if frag.is_empty() {
                            continue;
                        }
                        let restored = replace_code(&frag, SPLIT_MARK, ";");
                        if i == 0 {
                            first = restored;
                        } else {
                            debug!("queued (spl): {restored}");
                            self.split_buf.push_back(restored);
                        }
                    }
                    source_line = first;
                    self.cumul_len = 0;
                }
            }

            match origin {
                Origin::Source | Origin::Insertion | Origin::Addition => {
                    self.cumul_len = source_line.len();
                }
                Origin::Split => {
                    self.cumul_len += source_line.len();
                }
            }

            if !source_line.is_empty() || end_of_source {
                break;
            }
        }

        if end_of_source {
            return Ok(None);
        }

        self.display_line = if origin == Origin::Split {
            self.orig_line.clone()
        } else {
            source_line.clone()
        };
        debug!(
            "read line ({}): {}: {}: \"{}\"",
            origin.tag(),
            self.line_nr + 1,
            self.cumul_len,
            source_line
        );
        Ok(Some((source_line, origin)))
    }

    /// Pre-scan of the buffered source for `set library=true` appearing
    /// before any file section marker. Lets the driver pick the compilation
    /// mode without running the parser.
    pub(crate) fn library_option_found(&self) -> bool {
        for line in &self.buffer {
            let mut work = line.replace('\t', " ");
            work = work.trim().to_string();
            while work.contains("  ") {
                work = work.replace("  ", " ");
            }
            while work.contains("= ") {
                work = work.replace("= ", "=");
            }
            while work.contains(" =") {
                work = work.replace(" =", "=");
            }
            if work.starts_with("set library=true") {
                return true;
            }
            if work.starts_with(".libs")
                || work.starts_with(".public")
                || work.starts_with(".private")
                || work.starts_with(".implem")
            {
                return false;
            }
        }
        false
    }

    pub(crate) fn reset_buffers(&mut self) {
        self.buffer.clear();
        self.buffer_pos = 0;
        self.line_nr = 0;
        self.cumul_len = 0;
        self.orig_line.clear();
        self.display_line.clear();
        self.split_buf.clear();
        self.ins_buf.clear();
        self.add_buf.clear();
    }

    fn line_err(&self, message: &str) -> Diag {
        Diag::on_line(&self.file, self.line_nr + 1, message)
    }
}

/// Split file text into lines, tolerating CRLF endings.
fn lines_of(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(lines: &[&str]) -> SourceReader {
        SourceReader::from_lines("test.dun", lines.iter().map(|s| s.to_string()).collect(), 4)
    }

    fn drain(r: &mut SourceReader) -> Vec<(String, Origin)> {
        let mut out = Vec::new();
        while let Some(item) = r.next_line().unwrap() {
            out.push(item);
        }
        out
    }

    #[test]
    fn test_plain_lines_in_order() {
        let mut r = reader(&["a=1", "b=2"]);
        let lines = drain(&mut r);
        assert_eq!(
            lines,
            vec![("a=1".to_string(), Origin::Source), ("b=2".to_string(), Origin::Source)]
        );
    }

    #[test]
    fn test_comment_stripping() {
        let mut r = reader(&["a=1 // trailing", "   // whole line", "b=2"]);
        let lines = drain(&mut r);
        assert_eq!(lines[0].0, "a=1");
        assert_eq!(lines[1].0, "b=2");
    }

    #[test]
    fn test_comment_inside_string_is_kept() {
        let mut r = reader(&["s=\"http://x\" // real comment"]);
        let lines = drain(&mut r);
        assert_eq!(lines[0].0, "s=\"http://x\"");
    }

    #[test]
    fn test_comment_inside_nesting_is_kept() {
        let mut r = reader(&["f(a // b)"]);
        let lines = drain(&mut r);
        assert_eq!(lines[0].0, "f(a // b)");
    }

    #[test]
    fn test_line_join() {
        let mut r = reader(&["a= \\", "  b"]);
        let lines = drain(&mut r);
        assert_eq!(lines, vec![("a=b".to_string(), Origin::Source)]);
        assert_eq!(r.line_nr(), 0);
    }

    #[test]
    fn test_join_at_end_of_source_fails() {
        let mut r = reader(&["a= \\"]);
        let err = r.next_line().unwrap_err();
        assert!(err.message.contains("continuation"));
    }

    #[test]
    fn test_explicit_split_keeps_columns() {
        let mut r = reader(&["a=1; b=2"]);
        let (first, origin) = r.next_line().unwrap().unwrap();
        assert_eq!(first, "a=1;");
        assert_eq!(origin, Origin::Source);
        assert_eq!(r.cumul_len(), 4);

        let (second, origin) = r.next_line().unwrap().unwrap();
        assert_eq!(second, " b=2");
        assert_eq!(origin, Origin::Split);
        // 4 + 4 = original length, so offsets stay absolute
        assert_eq!(r.cumul_len(), 8);
    }

    #[test]
    fn test_auto_split_after_paren_colon() {
        let mut r = reader(&["if(a==1): b=c"]);
        let (first, _) = r.next_line().unwrap().unwrap();
        assert_eq!(first, "if(a==1):");
        let (second, origin) = r.next_line().unwrap().unwrap();
        assert_eq!(second, " b=c");
        assert_eq!(origin, Origin::Split);
        assert_eq!(r.cumul_len(), "if(a==1): b=c".len());
    }

    #[test]
    fn test_auto_split_after_end_keyword() {
        let mut r = reader(&[":if b=c"]);
        let (first, _) = r.next_line().unwrap().unwrap();
        assert_eq!(first, ":if");
        let (second, _) = r.next_line().unwrap().unwrap();
        assert_eq!(second, " b=c");
        assert_eq!(r.line_nr(), 0);
    }

    #[test]
    fn test_no_auto_split_on_loop_keyword() {
        let mut r = reader(&[":loop x<10"]);
        let (line, _) = r.next_line().unwrap().unwrap();
        assert_eq!(line, ":loop x<10");
    }

    #[test]
    fn test_splitter_inside_string_does_not_split() {
        let mut r = reader(&["s=\"a;b\""]);
        let lines = drain(&mut r);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, "s=\"a;b\"");
    }

    #[test]
    fn test_raw_string_folds_lines() {
        let mut r = reader(&["s = r\"[ line1", "line2", "line3 ]\""]);
        let (line, _) = r.next_line().unwrap().unwrap();
        assert_eq!(line, "s = r\"[ line1\nline2\nline3 ]\"");
        assert!(r.next_line().unwrap().is_none());
    }

    #[test]
    fn test_raw_string_open_at_eof_fails() {
        let mut r = reader(&["s = r\"[ never closed"]);
        let err = r.next_line().unwrap_err();
        assert!(err.message.contains("Raw string"));
    }

    #[test]
    fn test_raw_string_protects_comments_and_splitters() {
        let mut r = reader(&["s = r\"[ a;b // c ]\""]);
        let (line, _) = r.next_line().unwrap().unwrap();
        assert_eq!(line, "s = r\"[ a;b // c ]\"");
    }

    #[test]
    fn test_buffer_precedence() {
        let mut r = reader(&["src1"]);
        r.insert("ins1");
        r.add("add1", false);
        r.add("add0", true);
        let lines = drain(&mut r);
        let texts: Vec<&str> = lines.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(texts, vec!["ins1", "src1", "add0", "add1"]);
        assert_eq!(lines[0].1, Origin::Insertion);
        assert_eq!(lines[1].1, Origin::Source);
        assert_eq!(lines[2].1, Origin::Addition);
    }

    #[test]
    fn test_split_fragments_preempt_source() {
        let mut r = reader(&["a=1; b=2", "c=3"]);
        let texts: Vec<String> = drain(&mut r).into_iter().map(|(l, _)| l).collect();
        assert_eq!(texts, vec!["a=1;", " b=2", "c=3"]);
    }

    #[test]
    fn test_tabs_become_spaces() {
        let mut r = reader(&["\ta=1"]);
        let (line, _) = r.next_line().unwrap().unwrap();
        assert_eq!(line, "    a=1");
    }

    #[test]
    fn test_library_option_found() {
        let r = reader(&["// header", "set library = true", ".public"]);
        assert!(r.library_option_found());
        let r = reader(&[".public", "set library=true"]);
        assert!(!r.library_option_found());
        let r = reader(&["set library=false"]);
        assert!(!r.library_option_found());
    }
}
