//! Field access for the post being read.
//!
//! Every accessor reports problems to the diagnostics sink and still hands back a best-effort
//! value, so a malformed post never stops the read.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sie_core::date::{is_valid_period, is_valid_year, parse_date};
use sie_core::tokenizer::{split_line, unbracket};
use sie_core::ObjectList;

use crate::error::{DiagnosticKind, Diagnostics};

/// The tokenized fields of one post, its row and where diagnostics go.
pub(crate) struct Post<'a> {
    fields: &'a [String],
    row: usize,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Post<'a> {
    pub(crate) fn new(fields: &'a [String], row: usize, diagnostics: &'a mut Diagnostics) -> Self {
        Post {
            fields,
            row,
            diagnostics,
        }
    }

    pub(crate) fn row(&self) -> usize {
        self.row
    }

    pub(crate) fn keyword(&self) -> &'a str {
        self.fields.first().map(String::as_str).unwrap_or("")
    }

    pub(crate) fn error(&mut self, kind: DiagnosticKind) {
        self.diagnostics.error(kind, self.row);
    }

    pub(crate) fn warning(&mut self, kind: DiagnosticKind) {
        self.diagnostics.warning(kind, self.row);
    }

    /// Records `kind` as an error unless `statement` holds.
    pub(crate) fn assert(&mut self, statement: bool, kind: impl FnOnce() -> DiagnosticKind) -> bool {
        if !statement {
            self.error(kind());
        }
        statement
    }

    /// Records `kind` as a warning if `statement` holds.
    pub(crate) fn warn_if(&mut self, statement: bool, kind: impl FnOnce() -> DiagnosticKind) -> bool {
        if statement {
            self.warning(kind());
        }
        statement
    }

    /// Field at `index`, without complaining when it is missing.
    pub(crate) fn optional(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Like [`Post::optional`], but an empty field counts as missing.
    pub(crate) fn optional_text(&self, index: usize) -> Option<String> {
        self.optional(index)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Field at `index`, recording an error when it is missing.
    pub(crate) fn required(&mut self, index: usize) -> Option<&'a str> {
        let field = self.optional(index);
        if field.is_none() {
            let keyword = self.keyword().to_string();
            self.error(DiagnosticKind::MissingParameter { keyword, index });
        }
        field
    }

    /// Checks that the post has at least `count` parameters after the keyword.
    pub(crate) fn assert_parameters(&mut self, count: usize) -> bool {
        let present = self.fields.len().saturating_sub(1);
        if present >= count {
            return true;
        }
        let keyword = self.keyword().to_string();
        self.error(DiagnosticKind::TooFewParameters {
            keyword,
            count,
            missing: present + 1,
        });
        false
    }

    /// A year index: an integer no further than `max` from the current year.
    pub(crate) fn year_index(&mut self, index: usize, max: i32) -> Option<&'a str> {
        let value = self.required(index)?;
        let valid = matches!(
            i32::from_str(value),
            Ok(year) if year.checked_abs().map_or(false, |abs| abs <= max)
        );
        if !valid {
            let kind = self.invalid(index, value, |keyword, index, value| {
                DiagnosticKind::InvalidYearIndex {
                    keyword,
                    index,
                    value,
                }
            });
            self.error(kind);
        }
        Some(value)
    }

    /// A four digit year.
    pub(crate) fn year(&mut self, index: usize) -> Option<&'a str> {
        let value = self.required(index)?;
        if !is_valid_year(value) {
            let kind = self.invalid(index, value, |keyword, index, value| {
                DiagnosticKind::InvalidYear {
                    keyword,
                    index,
                    value,
                }
            });
            self.error(kind);
        }
        Some(value)
    }

    /// A `yyyyMM` period.
    pub(crate) fn period(&mut self, index: usize) -> Option<&'a str> {
        let value = self.required(index)?;
        if !is_valid_period(value) {
            let kind = self.invalid(index, value, |keyword, index, value| {
                DiagnosticKind::InvalidPeriod {
                    keyword,
                    index,
                    value,
                }
            });
            self.error(kind);
        }
        Some(value)
    }

    /// A required `yyyyMMdd` date.
    pub(crate) fn date(&mut self, index: usize) -> Option<NaiveDate> {
        let value = self.required(index)?;
        let date = parse_date(value);
        if date.is_none() {
            let kind = self.invalid(index, value, |keyword, index, value| {
                DiagnosticKind::InvalidDate {
                    keyword,
                    index,
                    value,
                }
            });
            self.error(kind);
        }
        date
    }

    /// An optional date. Anything that is not a date counts as missing.
    pub(crate) fn optional_date(&self, index: usize) -> Option<NaiveDate> {
        self.optional(index).and_then(parse_date)
    }

    /// A required amount. Zero when missing or malformed.
    pub(crate) fn decimal(&mut self, index: usize) -> Decimal {
        match self.required(index) {
            Some(value) => self.parse_decimal(index, value).unwrap_or(Decimal::ZERO),
            None => Decimal::ZERO,
        }
    }

    /// An optional amount. Missing or empty is `None`; malformed is an error.
    pub(crate) fn optional_decimal(&mut self, index: usize) -> Option<Decimal> {
        match self.optional(index) {
            Some(value) if !value.is_empty() => self.parse_decimal(index, value),
            _ => None,
        }
    }

    fn parse_decimal(&mut self, index: usize, value: &str) -> Option<Decimal> {
        match Decimal::from_str(value) {
            Ok(amount) => Some(amount),
            Err(_) => {
                let kind = self.invalid(index, value, |keyword, index, value| {
                    DiagnosticKind::InvalidNumber {
                        keyword,
                        index,
                        value,
                    }
                });
                self.error(kind);
                None
            }
        }
    }

    /// An object list field, `{key value key2 value2 ...}`.
    ///
    /// A list with an odd number of entries is reported and its trailing key dropped.
    pub(crate) fn objects(&mut self, index: usize) -> Option<ObjectList> {
        let field = self.required(index)?;
        let keyword = self.keyword().to_string();
        let inner = match unbracket(field) {
            Some(inner) => inner,
            None => {
                self.error(DiagnosticKind::InvalidObjectList { keyword });
                return None;
            }
        };
        let parts = split_line(inner);
        if parts.len() % 2 != 0 {
            self.error(DiagnosticKind::InvalidObjectList { keyword });
        }
        Some(
            parts
                .chunks_exact(2)
                .map(|pair| (pair[0].clone(), pair[1].clone()))
                .collect(),
        )
    }

    fn invalid(
        &self,
        index: usize,
        value: &str,
        kind: impl FnOnce(String, usize, String) -> DiagnosticKind,
    ) -> DiagnosticKind {
        kind(self.keyword().to_string(), index, value.to_string())
    }
}
