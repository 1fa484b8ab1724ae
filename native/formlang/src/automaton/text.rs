//! Line-oriented definition format shared by the automata and grammars.
//!
//! A definition is a fixed sequence of header lines followed by one record
//! per line until the input is exhausted. Header lists and transition
//! records are comma separated; PDA transitions and grammar productions are
//! whitespace separated. Surrounding whitespace of every field is ignored.

use crate::error::{ParseError, Result};

/// One line of a definition together with its 1-based line number.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

impl Line<'_> {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Hands out the lines of a definition in order.
pub struct Reader<'a> {
    lines: std::str::Lines<'a>,
    consumed: usize,
}

impl<'a> Reader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            consumed: 0,
        }
    }

    /// The next header line, which must be present (it may be blank).
    pub fn header(&mut self, what: &'static str) -> Result<Line<'a>> {
        let text = self.lines.next().ok_or(ParseError::MissingLine {
            line: self.consumed + 1,
            what,
        })?;
        self.consumed += 1;
        Ok(Line {
            number: self.consumed,
            text,
        })
    }

    /// The next header line for a field that may be blank. At the end of
    /// the input this reads as a blank line instead of failing.
    pub fn optional_header(&mut self) -> Line<'a> {
        match self.lines.next() {
            Some(text) => {
                self.consumed += 1;
                Line {
                    number: self.consumed,
                    text,
                }
            }
            None => Line {
                number: self.consumed + 1,
                text: "",
            },
        }
    }

    /// All remaining non-blank lines.
    pub fn records(self) -> impl Iterator<Item = Line<'a>> {
        let first = self.consumed + 1;
        self.lines
            .enumerate()
            .map(move |(offset, text)| Line {
                number: first + offset,
                text,
            })
            .filter(|line| !line.is_blank())
    }
}

/// A comma separated list; a blank line is the empty list.
pub fn list<'a>(line: Line<'a>, what: &'static str) -> Result<Vec<&'a str>> {
    if line.is_blank() {
        return Ok(Vec::new());
    }
    line.text
        .split(',')
        .map(str::trim)
        .map(|item| {
            if item.is_empty() {
                Err(ParseError::EmptyField {
                    line: line.number,
                    what,
                })
            } else {
                Ok(item)
            }
        })
        .collect()
}

/// A line holding exactly one non-empty field.
pub fn single<'a>(line: Line<'a>, what: &'static str) -> Result<&'a str> {
    let [field] = fixed_fields(line, line.text.split(',').map(str::trim), what)?;
    Ok(field)
}

/// A comma separated record with exactly `N` non-empty fields.
pub fn record<'a, const N: usize>(line: Line<'a>, what: &'static str) -> Result<[&'a str; N]> {
    fixed_fields(line, line.text.split(',').map(str::trim), what)
}

/// A whitespace separated record with exactly `N` fields.
pub fn spaced_record<'a, const N: usize>(
    line: Line<'a>,
    what: &'static str,
) -> Result<[&'a str; N]> {
    fixed_fields(line, line.text.split_whitespace(), what)
}

fn fixed_fields<'a, const N: usize>(
    line: Line<'a>,
    fields: impl Iterator<Item = &'a str>,
    what: &'static str,
) -> Result<[&'a str; N]> {
    let fields: Vec<&str> = fields.collect();
    let found = fields.len();
    let fields: [&str; N] = fields.try_into().map_err(|_| ParseError::FieldCount {
        line: line.number,
        expected: N,
        found,
    })?;
    if fields.iter().any(|field| field.is_empty()) {
        return Err(ParseError::EmptyField {
            line: line.number,
            what,
        });
    }
    Ok(fields)
}

/// Builds definition text; every line, including the last, ends in `\n`.
#[derive(Debug, Default)]
pub struct Writer {
    out: String,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Writes `items` joined by commas as one line.
    pub fn list<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) {
        self.joined(items, ",");
    }

    /// Writes `items` joined by single spaces as one line.
    pub fn spaced<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) {
        self.joined(items, " ");
    }

    fn joined<'a>(&mut self, items: impl IntoIterator<Item = &'a str>, separator: &str) {
        let items: Vec<&str> = items.into_iter().collect();
        self.line(&items.join(separator));
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_and_records() {
        let mut reader = Reader::new("a,b\n\nq0\n\nq0, a ,q1\n\n  \nq1,b,q0");
        assert_eq!(reader.header("states").unwrap().text, "a,b");
        assert!(reader.header("alphabet").unwrap().is_blank());
        assert_eq!(reader.header("start").unwrap().number, 3);
        reader.header("accept").unwrap();

        let records: Vec<_> = reader.records().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].number, 5);
        assert_eq!(records[1].number, 8);
        assert_eq!(record::<3>(records[0], "transition").unwrap(), ["q0", "a", "q1"]);
    }

    #[test]
    fn test_missing_header() {
        let mut reader = Reader::new("q0\n");
        reader.header("states").unwrap();
        assert_eq!(
            reader.header("alphabet").unwrap_err(),
            ParseError::MissingLine {
                line: 2,
                what: "alphabet"
            }
        );
    }

    #[test]
    fn test_optional_header_at_end_of_input() {
        let mut reader = Reader::new("q0\nq1");
        reader.header("states").unwrap();
        assert_eq!(reader.optional_header().text, "q1");

        let line = reader.optional_header();
        assert!(line.is_blank());
        assert_eq!(line.number, 3);
        assert_eq!(reader.records().count(), 0);
    }

    #[test]
    fn test_list_rejects_empty_items() {
        let line = Line {
            number: 1,
            text: "q0,,q1",
        };
        assert!(matches!(
            list(line, "state"),
            Err(ParseError::EmptyField { line: 1, .. })
        ));
        let blank = Line {
            number: 4,
            text: "   ",
        };
        assert!(list(blank, "accept state").unwrap().is_empty());
    }

    #[test]
    fn test_record_field_count() {
        let line = Line {
            number: 6,
            text: "q0,a",
        };
        assert_eq!(
            record::<3>(line, "transition").unwrap_err(),
            ParseError::FieldCount {
                line: 6,
                expected: 3,
                found: 2
            }
        );
        let line = Line {
            number: 6,
            text: "q0,,q1",
        };
        assert!(matches!(
            record::<3>(line, "transition"),
            Err(ParseError::EmptyField { .. })
        ));
    }

    #[test]
    fn test_single_and_spaced() {
        let line = Line {
            number: 3,
            text: " q0 ",
        };
        assert_eq!(single(line, "start state").unwrap(), "q0");
        let line = Line {
            number: 3,
            text: "q0,q1",
        };
        assert!(single(line, "start state").is_err());

        let line = Line {
            number: 6,
            text: "q0  a Z q1 AZ",
        };
        assert_eq!(
            spaced_record::<5>(line, "transition").unwrap(),
            ["q0", "a", "Z", "q1", "AZ"]
        );
    }

    #[test]
    fn test_writer_joins_fields() {
        let mut writer = Writer::new();
        writer.list(["q0", "q1"]);
        writer.list(std::iter::empty());
        writer.spaced(["S", "a", "S"]);
        assert_eq!(writer.finish(), "q0,q1\n\nS a S\n");
    }
}
