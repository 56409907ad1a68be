//! Writer for SIE files.
//!
//! A [`Document`] is written one post per line, in the order the format lists them: header,
//! company information, years, accounts, dimensions, balances and vouchers. Anything the
//! document leaves unset is left out, so a written file reads back into an equal document.

use std::collections::BTreeSet;
use std::fmt::{self, Write};
use std::io;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use typed_builder::TypedBuilder;

use sie_core::date::format_date;
use sie_core::tokenizer::split_line;
use sie_core::{
    Account, Codec, Cp437, Crc32, Dimension, Document, EncodeError, FileType, Keyword, ObjectList,
    PeriodSummary, Verification, VerificationRow,
};


/// Writer settings.
#[derive(Clone, Debug, Eq, PartialEq, TypedBuilder)]
pub struct WriterOptions {
    /// Write `#BTRANS` and `#RTRANS` history rows of vouchers.
    #[builder(default)]
    pub include_history: bool,

    /// Wrap the file in a `#KSUMMA` checksum.
    #[builder(default)]
    pub emit_checksum: bool,

    /// Indentation of the rows inside a `#VER` block.
    #[builder(default = "   ".to_string(), setter(into))]
    pub indent: String,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions::builder().build()
    }
}

#[derive(Clone, Debug, Default)]
pub struct BasicRenderer<C = Cp437> {
    options: WriterOptions,
    codec: C,
}

impl BasicRenderer<Cp437> {
    pub fn new(options: WriterOptions) -> Self {
        Self::with_codec(Cp437, options)
    }
}

impl<C: Codec> BasicRenderer<C> {
    pub fn with_codec(codec: C, options: WriterOptions) -> Self {
        BasicRenderer { options, codec }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }
}

/// Writes `document` in code page 437 with default options.
pub fn render<W: io::Write>(w: &mut W, document: &Document) -> Result<(), RenderError> {
    render_with(w, document, Cp437, WriterOptions::default())
}

/// Writes `document` encoded with `codec`.
pub fn render_with<C: Codec, W: io::Write>(
    w: &mut W,
    document: &Document,
    codec: C,
    options: WriterOptions,
) -> Result<(), RenderError> {
    let renderer = BasicRenderer::with_codec(codec, options);
    let mut text = String::new();
    renderer.render(document, &mut text)?;
    w.write_all(&renderer.codec.encode(&text)?)?;
    Ok(())
}

/// Writes `document` as text, before any encoding.
pub fn render_to_string(document: &Document, options: WriterOptions) -> Result<String, RenderError> {
    let mut text = String::new();
    BasicRenderer::new(options).render(document, &mut text)?;
    Ok(text)
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("an io error occurred")]
    Io(#[from] io::Error),
    #[error("a formatting error occurred")]
    Fmt(#[from] fmt::Error),
    #[error("could not encode output: {0}")]
    Encoding(#[from] EncodeError),
}

pub trait Renderer<T, W: Write> {
    type Error;
    fn render(&self, renderable: T, write: &mut W) -> Result<(), Self::Error>;
}

/// One field of a post being written.
enum Field<'a> {
    /// Text that is quoted when needed.
    Text(&'a str),
    /// Written as is: numbers, dates and object lists.
    Raw(String),
    /// Not set. Written as `""` unless only missing fields follow.
    Missing,
}

impl<'a> Field<'a> {
    fn text(value: Option<&'a str>) -> Self {
        value.map_or(Field::Missing, Field::Text)
    }

    fn date(value: Option<NaiveDate>) -> Self {
        value.map_or(Field::Missing, |date| Field::Raw(format_date(date)))
    }

    fn decimal(value: Option<Decimal>) -> Self {
        value.map_or(Field::Missing, |amount| Field::Raw(format_decimal(amount)))
    }

    fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }
}

/// Writes one post, trimming trailing missing fields.
fn write_post<W: Write>(
    w: &mut W,
    indent: &str,
    keyword: Keyword,
    fields: &[Field<'_>],
) -> fmt::Result {
    let used = fields
        .iter()
        .rposition(|field| !field.is_missing())
        .map_or(0, |last| last + 1);
    write!(w, "{}{}", indent, keyword)?;
    for field in &fields[..used] {
        match field {
            Field::Text(text) => write!(w, " {}", escape(text))?,
            Field::Raw(raw) => write!(w, " {}", raw)?,
            Field::Missing => write!(w, " \"\"")?,
        }
    }
    writeln!(w)
}

/// Writes a post unless every field is missing.
fn write_optional_post<W: Write>(w: &mut W, keyword: Keyword, fields: &[Field<'_>]) -> fmt::Result {
    if fields.iter().all(Field::is_missing) {
        return Ok(());
    }
    write_post(w, "", keyword, fields)
}

/// Quotes `text` so that it reads back as one field.
///
/// A backslash is written as is. Text ending in `\` therefore escapes the separator that
/// follows it and merges with the next field on reading; the format has no way to write such a
/// value mid-post.
pub fn escape(text: &str) -> String {
    if text.is_empty() {
        return "\"\"".to_string();
    }
    let needs_quotes = text.contains(|c: char| c == ' ' || c == '\t')
        || text.starts_with('"')
        || text.starts_with('{');
    if needs_quotes {
        format!("\"{}\"", text.replace('"', "\\\""))
    } else {
        text.to_string()
    }
}

/// Formats an amount with exactly two decimals, rounding half away from zero.
pub fn format_decimal(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Formats an object list as `{key value key2 value2}`.
pub fn format_objects(objects: &ObjectList) -> String {
    let mut out = String::from("{");
    for (i, (key, value)) in objects.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&escape(key));
        out.push(' ');
        out.push_str(&escape(value));
    }
    out.push('}');
    out
}

impl<'a, C: Codec, W: Write> Renderer<&'a Document, W> for BasicRenderer<C> {
    type Error = RenderError;
    fn render(&self, sie: &'a Document, write: &mut W) -> Result<(), Self::Error> {
        let flag = if sie.already_imported { "1" } else { "0" };
        write_post(write, "", Keyword::Flagga, &[Field::Raw(flag.to_string())])?;

        if !self.options.emit_checksum {
            return self.render_body(sie, write);
        }

        let mut body = String::new();
        self.render_body(sie, &mut body)?;
        let mut crc = Crc32::new();
        for line in body.lines() {
            let line = line.trim_start();
            if line.starts_with('#') {
                crc.add_post(&split_line(line), &self.codec)?;
            }
        }
        let checksum = crc.checksum();
        log::debug!("event=sie_write_checksum module=writer checksum={}", checksum);

        write_post(write, "", Keyword::Ksumma, &[])?;
        write.write_str(&body)?;
        write_post(write, "", Keyword::Ksumma, &[Field::Raw(checksum.to_string())])?;
        Ok(())
    }
}

impl<C: Codec> BasicRenderer<C> {
    /// Everything after `#FLAGGA`.
    fn render_body<W: Write>(&self, sie: &Document, w: &mut W) -> Result<(), RenderError> {
        write_optional_post(
            w,
            Keyword::Program,
            &[
                Field::text(sie.program.as_deref()),
                Field::text(sie.program_version.as_deref()),
            ],
        )?;
        write_post(w, "", Keyword::Format, &[Field::Text("PC8")])?;
        if let Some(generated) = sie.generated {
            write_post(
                w,
                "",
                Keyword::Gen,
                &[
                    Field::Raw(format_date(generated)),
                    Field::text(sie.generated_by.as_deref()),
                ],
            )?;
        }
        if let Some(file_type) = sie.file_type {
            write_post(
                w,
                "",
                Keyword::Sietyp,
                &[Field::Raw(file_type.wire_value().to_string())],
            )?;
        }
        for note in &sie.notes {
            write_post(w, "", Keyword::Prosa, &[Field::Text(note)])?;
        }
        write_optional_post(w, Keyword::Ftyp, &[Field::text(sie.company_type.as_deref())])?;
        write_optional_post(
            w,
            Keyword::Fnr,
            &[Field::text(sie.internal_company_id.as_deref())],
        )?;
        if sie.organisation_number.is_some() {
            write_post(
                w,
                "",
                Keyword::Orgnr,
                &[
                    Field::text(sie.organisation_number.as_deref()),
                    Field::text(sie.organisation_internal_number.as_deref()),
                    Field::text(sie.organisation_internal_number2.as_deref()),
                ],
            )?;
        }
        write_optional_post(w, Keyword::Bkod, &[Field::text(sie.company_sni.as_deref())])?;
        write_optional_post(
            w,
            Keyword::Adress,
            &[
                Field::text(sie.contact.as_deref()),
                Field::text(sie.address_line1.as_deref()),
                Field::text(sie.address_line2.as_deref()),
                Field::text(sie.phone.as_deref()),
            ],
        )?;
        write_optional_post(w, Keyword::Fnamn, &[Field::text(sie.company_name.as_deref())])?;
        for (index, year) in &sie.years {
            write_post(
                w,
                "",
                Keyword::Rar,
                &[
                    Field::Text(index),
                    Field::Text(&year.start),
                    Field::Text(&year.end),
                ],
            )?;
        }
        write_optional_post(w, Keyword::Taxar, &[Field::text(sie.taxation_year.as_deref())])?;
        if matches!(
            sie.file_type,
            Some(FileType::PeriodBalances)
                | Some(FileType::ObjectBalances)
                | Some(FileType::TransactionExport)
        ) {
            write_optional_post(
                w,
                Keyword::Omfattn,
                &[Field::text(sie.balance_end_date.as_deref())],
            )?;
        }
        write_optional_post(
            w,
            Keyword::Kptyp,
            &[Field::text(sie.base_account_plan.as_deref())],
        )?;
        write_optional_post(w, Keyword::Valuta, &[Field::text(sie.currency.as_deref())])?;

        for (number, account) in &sie.accounts {
            self.render((number.as_str(), account), w)?;
        }
        for (number, dimension) in &sie.dimensions {
            self.render((number.as_str(), dimension), w)?;
        }
        for summary in &sie.period_summaries {
            self.render(summary, w)?;
        }
        for verification in &sie.verifications {
            self.render(verification, w)?;
        }

        log::info!(
            "event=sie_write module=writer accounts={} summaries={} verifications={}",
            sie.accounts.len(),
            sie.period_summaries.len(),
            sie.verifications.len()
        );
        Ok(())
    }

    fn render_row<W: Write>(
        &self,
        keyword: Keyword,
        row: &VerificationRow,
        w: &mut W,
    ) -> fmt::Result {
        write_post(
            w,
            &self.options.indent,
            keyword,
            &[
                Field::Text(&row.account),
                Field::Raw(format_objects(&row.objects)),
                Field::decimal(Some(row.amount)),
                Field::date(row.transaction_date),
                Field::text(row.text.as_deref()),
                Field::decimal(row.quantity),
                Field::text(row.user.as_deref()),
            ],
        )
    }

    fn render_history<W: Write>(
        &self,
        verification: &Verification,
        sequence: u32,
        w: &mut W,
    ) -> fmt::Result {
        for row in verification.removed_rows.get(&sequence).into_iter().flatten() {
            self.render_row(Keyword::Btrans, row, w)?;
        }
        for row in verification.added_rows.get(&sequence).into_iter().flatten() {
            self.render_row(Keyword::Rtrans, row, w)?;
        }
        Ok(())
    }
}

impl<'a, C: Codec, W: Write> Renderer<(&'a str, &'a Account), W> for BasicRenderer<C> {
    type Error = RenderError;
    fn render(&self, (number, account): (&'a str, &'a Account), w: &mut W) -> Result<(), Self::Error> {
        write_post(
            w,
            "",
            Keyword::Konto,
            &[Field::Text(number), Field::Text(&account.name)],
        )?;
        if let Some(ty) = account.ty {
            write_post(
                w,
                "",
                Keyword::Ktyp,
                &[Field::Text(number), Field::Raw(ty.code().to_string())],
            )?;
        }
        if let Some(sru) = &account.sru {
            write_post(w, "", Keyword::Sru, &[Field::Text(number), Field::Text(sru)])?;
        }
        if let Some(unit) = &account.unit {
            write_post(w, "", Keyword::Enhet, &[Field::Text(number), Field::Text(unit)])?;
        }
        Ok(())
    }
}

impl<'a, C: Codec, W: Write> Renderer<(&'a str, &'a Dimension), W> for BasicRenderer<C> {
    type Error = RenderError;
    fn render(
        &self,
        (number, dimension): (&'a str, &'a Dimension),
        w: &mut W,
    ) -> Result<(), Self::Error> {
        match &dimension.parent {
            Some(parent) => write_post(
                w,
                "",
                Keyword::Underdim,
                &[
                    Field::Text(number),
                    Field::Text(&dimension.name),
                    Field::Text(parent),
                ],
            )?,
            None => write_post(
                w,
                "",
                Keyword::Dim,
                &[Field::Text(number), Field::Text(&dimension.name)],
            )?,
        }
        for (object, name) in &dimension.objects {
            write_post(
                w,
                "",
                Keyword::Objekt,
                &[Field::Text(number), Field::Text(object), Field::Text(name)],
            )?;
        }
        Ok(())
    }
}

impl<'a, C: Codec, W: Write> Renderer<&'a PeriodSummary, W> for BasicRenderer<C> {
    type Error = RenderError;
    fn render(&self, summary: &'a PeriodSummary, w: &mut W) -> Result<(), Self::Error> {
        let mut fields = vec![Field::Text(&summary.year_index)];
        if summary.kind.is_change() {
            fields.push(Field::text(summary.period.as_deref()));
        }
        fields.push(Field::Text(&summary.account));
        if summary.kind.has_objects() {
            let objects = summary
                .objects
                .as_ref()
                .map_or_else(|| "{}".to_string(), format_objects);
            fields.push(Field::Raw(objects));
        }
        fields.push(Field::decimal(Some(summary.amount)));
        fields.push(Field::decimal(summary.quantity));
        write_post(w, "", summary.kind.keyword(), &fields)?;
        Ok(())
    }
}

impl<'a, C: Codec, W: Write> Renderer<&'a Verification, W> for BasicRenderer<C> {
    type Error = RenderError;
    fn render(&self, verification: &'a Verification, w: &mut W) -> Result<(), Self::Error> {
        write_post(
            w,
            "",
            Keyword::Ver,
            &[
                Field::Text(&verification.series),
                Field::Text(&verification.number),
                Field::date(Some(verification.date)),
                Field::text(verification.text.as_deref()),
                Field::date(verification.registration_date),
                Field::text(verification.user.as_deref()),
            ],
        )?;
        writeln!(w, "{{")?;
        let mut written = BTreeSet::new();
        for row in &verification.rows {
            // Rows sharing a sequence get its history once.
            if self.options.include_history && written.insert(row.sequence) {
                self.render_history(verification, row.sequence, w)?;
            }
            self.render_row(Keyword::Trans, row, w)?;
        }
        if self.options.include_history {
            // History rows whose current row is gone.
            let orphans = verification
                .removed_rows
                .keys()
                .chain(verification.added_rows.keys())
                .filter(|sequence| !written.contains(*sequence))
                .copied()
                .collect::<BTreeSet<_>>();
            for sequence in orphans {
                self.render_history(verification, sequence, w)?;
            }
        }
        writeln!(w, "}}")?;
        Ok(())
    }
}
