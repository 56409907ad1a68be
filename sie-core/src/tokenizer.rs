//! Splitting of a single SIE line into fields.
//!
//! Fields are separated by space or tab. A field may be quoted (`"a b"`) to embed separators,
//! and a quote inside a field can be escaped as `\"`. A field starting with `{` keeps going until
//! the matching `}`, so a whole object list like `{1 "Nord" 6 P1}` travels as one field with its
//! braces intact:
//!
//! ```text
//! #OIB 0 1221 {1 "Nord"} 23780.78
//! ```

/// Separators used by SIE files.
pub const DEFAULT_SEPARATORS: &[char] = &[' ', '\t'];

/// Options controlling [`split_line_with`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SplitOptions<'s> {
    /// Characters that end a field outside of quotes and brackets.
    pub separators: &'s [char],

    /// Trim whitespace from every completed field.
    pub trim: bool,
}

impl Default for SplitOptions<'_> {
    fn default() -> Self {
        SplitOptions {
            separators: DEFAULT_SEPARATORS,
            trim: false,
        }
    }
}

/// Splits a line with the default separators.
pub fn split_line(line: &str) -> Vec<String> {
    split_line_with(line, &SplitOptions::default())
}

/// Splits a line into fields, honoring quotes, `\"` escapes and `{...}` brackets.
///
/// Backslash only escapes the quote character; any other escaped character keeps its backslash.
/// An explicitly quoted empty field (`""`) is kept, while runs of separators never produce
/// empty fields.
pub fn split_line_with(line: &str, options: &SplitOptions<'_>) -> Vec<String> {
    let mut splitter = Splitter::new(options);
    for c in line.chars() {
        splitter.push(c);
    }
    splitter.finish()
}

struct Splitter<'o> {
    options: &'o SplitOptions<'o>,
    fields: Vec<String>,
    current: String,
    escape_pending: bool,
    quote_open: bool,
    had_quotes: bool,
    bracket_open: bool,
}

impl<'o> Splitter<'o> {
    fn new(options: &'o SplitOptions<'o>) -> Self {
        Splitter {
            options,
            fields: Vec::new(),
            current: String::new(),
            escape_pending: false,
            quote_open: false,
            had_quotes: false,
            bracket_open: false,
        }
    }

    fn push(&mut self, c: char) {
        if self.escape_pending {
            if c != '"' {
                self.current.push('\\');
            }
            self.current.push(c);
            self.escape_pending = false;
            return;
        }

        if self.options.separators.contains(&c) && !self.quote_open && !self.bracket_open {
            self.flush();
            return;
        }

        match c {
            '\\' => self.escape_pending = true,
            '"' => {
                if self.bracket_open {
                    self.current.push(c);
                } else if !self.quote_open && self.current.is_empty() {
                    // Quotes only open at the very start of a field.
                    self.quote_open = true;
                    self.had_quotes = true;
                } else if self.quote_open {
                    self.quote_open = false;
                } else {
                    self.current.push(c);
                }
            }
            '{' => {
                if !self.bracket_open && !self.quote_open && self.current.is_empty() {
                    self.bracket_open = true;
                }
                self.current.push(c);
            }
            '}' => {
                if self.bracket_open && !self.quote_open {
                    self.bracket_open = false;
                }
                self.current.push(c);
            }
            _ => self.current.push(c),
        }
    }

    fn flush(&mut self) {
        let field = std::mem::take(&mut self.current);
        let field = if self.options.trim {
            field.trim().to_string()
        } else {
            field
        };
        if field.is_empty() && !self.had_quotes {
            return;
        }
        self.fields.push(field);
        self.had_quotes = false;
    }

    fn finish(mut self) -> Vec<String> {
        if self.escape_pending {
            self.current.push('\\');
        }
        self.flush();
        self.fields
    }
}

/// Strips the braces of a bracketed field, returning the inner text.
///
/// Returns `None` unless the field starts with `{` and ends with `}`.
pub fn unbracket(field: &str) -> Option<&str> {
    if field.len() >= 2 && field.starts_with('{') && field.ends_with('}') {
        Some(&field[1..field.len() - 1])
    } else {
        None
    }
}
