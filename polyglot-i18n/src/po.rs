//! PO Catalog Parser
//!
//! Line-oriented reader for gettext `.po` files. A malformed record is
//! dropped with a [`ParseWarning`] and parsing resumes at the next record;
//! one bad record never loses the rest of the file.

use std::fmt;

/// Highest number of plural forms a record may carry.
pub(crate) const MAX_PLURAL_FORMS: usize = 16;

/// A record that was skipped while reading a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line the problem was found on, when the format has lines
    pub line: Option<usize>,
    /// What was wrong
    pub message: String,
}

impl ParseWarning {
    pub(crate) fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// One complete record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PoRecord {
    pub context: Option<String>,
    pub id: String,
    pub id_plural: Option<String>,
    pub translation: Option<String>,
    pub forms: Vec<(usize, String)>,
    pub fuzzy: bool,
    pub line: usize,
}

/// Everything read from one file.
#[derive(Debug, Default)]
pub(crate) struct PoDocument {
    pub records: Vec<PoRecord>,
    pub header: Vec<(String, String)>,
    pub warnings: Vec<ParseWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str,
    Form(usize),
}

#[derive(Debug, Default)]
struct Pending {
    started: bool,
    start: usize,
    context: Option<String>,
    id: Option<String>,
    id_plural: Option<String>,
    translation: Option<String>,
    forms: Vec<(usize, String)>,
    fuzzy: bool,
    last: Option<Field>,
}

impl Pending {
    fn begin(&mut self, line: usize) {
        if !self.started {
            self.started = true;
            self.start = line;
        }
    }

    fn field_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Context => self.context.as_mut(),
            Field::Id => self.id.as_mut(),
            Field::IdPlural => self.id_plural.as_mut(),
            Field::Str => self.translation.as_mut(),
            Field::Form(index) => self
                .forms
                .iter_mut()
                .rev()
                .find(|(i, _)| *i == index)
                .map(|(_, value)| value),
        }
    }
}

#[derive(Debug, Default)]
struct Parser {
    doc: PoDocument,
    pending: Pending,
    skipping: bool,
}

/// Parse PO source text.
pub(crate) fn parse(text: &str) -> PoDocument {
    let mut parser = Parser::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() {
            parser.finish();
            parser.skipping = false;
            continue;
        }

        // Obsolete entries
        if line.starts_with("#~") {
            continue;
        }

        if line.starts_with('#') {
            if parser.pending.started {
                parser.finish();
            }
            parser.skipping = false;
            if let Some(flags) = line.strip_prefix("#,") {
                if flags.split(',').any(|flag| flag.trim() == "fuzzy") {
                    parser.pending.fuzzy = true;
                }
            }
            continue;
        }

        if line.starts_with('"') {
            if !parser.skipping {
                parser.continuation(line_no, line);
            }
            continue;
        }

        let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let starts_record = keyword == "msgctxt" || keyword == "msgid";
        if parser.skipping {
            if !starts_record {
                continue;
            }
            parser.skipping = false;
        }
        parser.keyword(line_no, keyword, rest.trim());
    }

    parser.finish();
    parser.doc
}

impl Parser {
    fn fail(&mut self, line: usize, message: impl Into<String>) {
        self.doc.warnings.push(ParseWarning::at(line, message));
        self.pending = Pending::default();
        self.skipping = true;
    }

    fn keyword(&mut self, line: usize, keyword: &str, rest: &str) {
        // A new msgctxt/msgid closes whatever came before, even without a blank line
        if (keyword == "msgctxt" || keyword == "msgid") && self.pending.id.is_some() {
            self.finish();
        }

        let value = match unquote(rest) {
            Ok(value) => value,
            Err(message) => return self.fail(line, message),
        };

        match keyword {
            "msgctxt" => {
                if self.pending.context.is_some() {
                    return self.fail(line, "duplicate msgctxt");
                }
                self.pending.begin(line);
                self.pending.context = Some(value);
                self.pending.last = Some(Field::Context);
            }
            "msgid" => {
                self.pending.begin(line);
                self.pending.id = Some(value);
                self.pending.last = Some(Field::Id);
            }
            "msgid_plural" => {
                if self.pending.id.is_none() {
                    return self.fail(line, "msgid_plural without msgid");
                }
                self.pending.id_plural = Some(value);
                self.pending.last = Some(Field::IdPlural);
            }
            "msgstr" => {
                if self.pending.id.is_none() {
                    return self.fail(line, "msgstr without msgid");
                }
                if self.pending.translation.is_some() {
                    return self.fail(line, "duplicate msgstr");
                }
                self.pending.translation = Some(value);
                self.pending.last = Some(Field::Str);
            }
            other if other.starts_with("msgstr[") => {
                let Some(index) = other
                    .strip_prefix("msgstr[")
                    .and_then(|r| r.strip_suffix(']'))
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|&n| n < MAX_PLURAL_FORMS)
                else {
                    return self.fail(line, format!("invalid plural index in '{}'", other));
                };
                if self.pending.id.is_none() {
                    return self.fail(line, "msgstr without msgid");
                }
                self.pending.forms.push((index, value));
                self.pending.last = Some(Field::Form(index));
            }
            other => self.fail(line, format!("unknown keyword '{}'", other)),
        }
    }

    fn continuation(&mut self, line: usize, text: &str) {
        let Some(field) = self.pending.last else {
            return self.fail(line, "string without a keyword");
        };
        let value = match unquote(text) {
            Ok(value) => value,
            Err(message) => return self.fail(line, message),
        };
        if let Some(target) = self.pending.field_mut(field) {
            target.push_str(&value);
        }
    }

    fn finish(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        if !pending.started {
            return;
        }

        let Some(id) = pending.id else {
            self.doc
                .warnings
                .push(ParseWarning::at(pending.start, "record has no msgid"));
            return;
        };

        if id.is_empty() && pending.context.is_none() {
            if let Some(header) = pending.translation {
                self.doc.header = parse_header(&header);
            }
            return;
        }

        if pending.translation.is_none() && pending.forms.is_empty() {
            self.doc
                .warnings
                .push(ParseWarning::at(pending.start, format!("record '{}' has no msgstr", id)));
            return;
        }

        self.doc.records.push(PoRecord {
            context: pending.context,
            id,
            id_plural: pending.id_plural,
            translation: pending.translation,
            forms: pending.forms,
            fuzzy: pending.fuzzy,
            line: pending.start,
        });
    }
}

fn parse_header(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Decode one quoted PO string, e.g. `"Hello \"world\"\n"`.
fn unquote(text: &str) -> std::result::Result<String, String> {
    let body = text
        .strip_prefix('"')
        .ok_or_else(|| format!("expected a quoted string, found '{}'", text))?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices();
    while let Some((pos, c)) = chars.next() {
        match c {
            '"' => {
                let trailing = body[pos + 1..].trim();
                if !trailing.is_empty() {
                    return Err(format!("unexpected text after string: '{}'", trailing));
                }
                return Ok(out);
            }
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, '"')) => out.push('"'),
                Some((_, '\\')) => out.push('\\'),
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                }
                None => break,
            },
            c => out.push(c),
        }
    }

    Err("unterminated string".to_string())
}
