//! Reader for SIE files.
//!
//! A file is read line by line. Each line is one post: a `#`-label followed by fields. The only
//! post spanning several lines is `#VER`, whose transaction rows follow in a `{ ... }` block.
//!
//! Reading never fails. Problems in the input are collected as [`Diagnostic`]s, split into
//! errors and warnings, and the read always continues to the end of the input.

use std::convert::TryFrom;

use chrono::NaiveDate;
use typed_builder::TypedBuilder;

use sie_core as sie;
use sie::tokenizer::split_line;
use sie::{
    AccountType, AmountKind, Codec, Cp437, Crc32, Document, FileType, FiscalYear, Keyword,
    PeriodSummary, Verification, VerificationRow,
};

pub use error::{Diagnostic, DiagnosticKind, Diagnostics};

use post::Post;

pub mod error;
mod post;

/// Reader settings.
#[derive(Clone, Debug, Eq, PartialEq, TypedBuilder)]
pub struct ReaderOptions {
    /// File name suffix of type 4 export files, compared ignoring case.
    #[builder(default = ".se".to_string(), setter(into))]
    pub export_extension: String,

    /// Largest distance from the current year a year index may have.
    #[builder(default = 100)]
    pub max_year_index: i32,

    /// Verify the `#KSUMMA` checksum. When off, `#KSUMMA` posts are ignored.
    #[builder(default)]
    pub verify_checksum: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions::builder().build()
    }
}

/// A read document with the diagnostics found while reading it.
#[derive(Clone, Debug, PartialEq)]
pub struct Parsed {
    pub document: Document,
    pub diagnostics: Diagnostics,
}

/// Reads a document from already decoded text.
///
/// `filename` is only used to tell type 4 import files from export files.
pub fn parse(input: &str, filename: &str) -> Parsed {
    let mut reader = SieReader::new();
    let document = reader.read_str(input, filename);
    Parsed {
        document,
        diagnostics: reader.take_diagnostics(),
    }
}

/// Reads SIE files.
///
/// The reader keeps the diagnostics of the last read. Every read starts from a clean slate, so a
/// reader can be reused for any number of files, one at a time.
#[derive(Clone, Debug, Default)]
pub struct SieReader<C = Cp437> {
    codec: C,
    options: ReaderOptions,
    diagnostics: Diagnostics,
}

impl SieReader<Cp437> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ReaderOptions) -> Self {
        Self::with_codec(Cp437, options)
    }
}

impl<C: Codec> SieReader<C> {
    pub fn with_codec(codec: C, options: ReaderOptions) -> Self {
        SieReader {
            codec,
            options,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Errors of the last read.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.diagnostics.errors
    }

    /// Warnings of the last read.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.diagnostics.warnings
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    /// Decodes raw file bytes with the reader's codec and reads them.
    pub fn read_bytes(&mut self, bytes: &[u8], filename: &str) -> Document {
        let text = self.codec.decode(bytes);
        self.read_str(&text, filename)
    }

    pub fn read_str(&mut self, input: &str, filename: &str) -> Document {
        self.read_lines(input.lines(), filename)
    }

    /// Reads a document from decoded lines.
    pub fn read_lines<I, S>(&mut self, lines: I, filename: &str) -> Document
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        log::info!("event=sie_read module=reader status=start filename={}", filename);
        let mut state = ReadState {
            codec: &self.codec,
            options: &self.options,
            filename,
            document: Document::default(),
            diagnostics: Diagnostics::default(),
            block: Block::None,
            row: 0,
            checksum: None,
        };
        for line in lines {
            state.line(line.as_ref());
        }
        state.finish();

        let ReadState {
            document,
            diagnostics,
            row,
            ..
        } = state;
        log::info!(
            "event=sie_read module=reader status=done rows={} errors={} warnings={}",
            row,
            diagnostics.errors.len(),
            diagnostics.warnings.len()
        );
        self.diagnostics = diagnostics;
        document
    }
}

/// Where the reader is relative to a `#VER` block.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Block {
    /// Top level posts.
    None,
    /// Just read `#VER`, expecting `{`.
    Opening,
    /// Inside `{ ... }`. Holds the sequence number of the next `#TRANS`.
    Rows { sequence: u32 },
}

struct ReadState<'r, C> {
    codec: &'r C,
    options: &'r ReaderOptions,
    filename: &'r str,
    document: Document,
    diagnostics: Diagnostics,
    block: Block,
    row: usize,
    checksum: Option<Crc32>,
}

impl<'r, C: Codec> ReadState<'r, C> {
    fn line(&mut self, line: &str) {
        self.row += 1;
        let line = line.trim_start();
        if line.is_empty() {
            return;
        }

        match self.block {
            Block::None => {}
            Block::Opening => {
                if line.trim_end() == "{" {
                    self.block = Block::Rows { sequence: 0 };
                    return;
                }
                // The post is read as a top level post instead.
                self.diagnostics
                    .error(DiagnosticKind::VerificationNotOpened, self.row);
                self.block = Block::None;
            }
            Block::Rows { .. } => {
                if line.trim_end() == "}" {
                    self.close_verification();
                    return;
                }
            }
        }

        if !line.starts_with('#') {
            self.diagnostics.warning(DiagnosticKind::MissingLabel, self.row);
            return;
        }

        let fields = split_line(line);
        let keyword = Keyword::from(fields[0].as_str());
        if keyword == Keyword::Ksumma {
            self.checksum_post(&fields);
            return;
        }
        if let Some(crc) = self.checksum.as_mut() {
            if let Err(err) = crc.add_post(&fields, self.codec) {
                self.diagnostics
                    .error(DiagnosticKind::ChecksumEncoding(err), self.row);
            }
        }

        match self.block {
            Block::Rows { .. } => self.row_post(keyword, &fields),
            _ => self.top_level_post(keyword, &fields),
        }
    }

    fn finish(&mut self) {
        if self.block != Block::None {
            self.diagnostics
                .error(DiagnosticKind::VerificationNotClosed, self.row);
            self.block = Block::None;
        }
        if self.options.verify_checksum && self.checksum.is_some() {
            self.diagnostics
                .error(DiagnosticKind::ChecksumNotClosed, self.row);
        }
    }

    fn close_verification(&mut self) {
        self.block = Block::None;
        let balanced = self
            .document
            .verifications
            .last()
            .map_or(true, Verification::is_balanced);
        log::debug!(
            "event=sie_read_ver_close module=reader row={} balanced={}",
            self.row,
            balanced
        );
        if !balanced {
            self.diagnostics
                .error(DiagnosticKind::VerificationUnbalanced, self.row);
        }
    }

    fn checksum_post(&mut self, fields: &[String]) {
        if !self.options.verify_checksum {
            return;
        }
        let mut post = Post::new(fields, self.row, &mut self.diagnostics);
        match (post.optional(1), self.checksum.take()) {
            (None, _) => self.checksum = Some(Crc32::new()),
            (Some(_), None) => post.error(DiagnosticKind::ChecksumNotStarted),
            (Some(value), Some(crc)) => match value.parse::<u32>() {
                Ok(expected) => {
                    let calculated = crc.checksum();
                    post.assert(expected == calculated, || {
                        DiagnosticKind::ChecksumMismatch {
                            expected,
                            calculated,
                        }
                    });
                }
                Err(_) => post.error(DiagnosticKind::InvalidChecksum {
                    value: value.to_string(),
                }),
            },
        }
    }

    fn top_level_post(&mut self, keyword: Keyword, fields: &[String]) {
        let mut post = Post::new(fields, self.row, &mut self.diagnostics);
        let sie = &mut self.document;
        let options = self.options;

        match keyword {
            Keyword::Flagga => {
                if let Some(value) = post.required(1) {
                    let keyword = post.keyword();
                    if post.assert(value == "0" || value == "1", || invalid_value(keyword, value)) {
                        sie.already_imported = value == "1";
                    }
                }
            }
            Keyword::Program => {
                sie.program = post.required(1).map(str::to_string);
                sie.program_version = post.required(2).map(str::to_string);
            }
            Keyword::Format => {
                let format = post.optional(1);
                post.warn_if(format != Some("PC8"), || DiagnosticKind::UnsupportedFormat {
                    value: format.map(str::to_string),
                });
            }
            Keyword::Gen => {
                if post.assert_parameters(1) {
                    sie.generated = post.date(1);
                    sie.generated_by = post.optional_text(2);
                }
            }
            Keyword::Sietyp => {
                if let Some(value) = post.required(1) {
                    match FileType::from_wire(value, self.filename, &options.export_extension) {
                        Some(file_type) => sie.file_type = Some(file_type),
                        None => {
                            let kind = invalid_value(post.keyword(), value);
                            post.error(kind);
                        }
                    }
                }
            }
            Keyword::Prosa => {
                if let Some(note) = post.required(1) {
                    sie.notes.push(note.to_string());
                }
            }
            Keyword::Ftyp => sie.company_type = post.required(1).map(str::to_string),
            Keyword::Fnr => sie.internal_company_id = post.required(1).map(str::to_string),
            Keyword::Orgnr => {
                sie.organisation_number = post.required(1).map(str::to_string);
                sie.organisation_internal_number = post.optional_text(2);
                sie.organisation_internal_number2 = post.optional_text(3);
            }
            Keyword::Bkod => sie.company_sni = post.optional_text(1),
            Keyword::Adress => {
                sie.contact = post.optional_text(1);
                sie.address_line1 = post.optional_text(2);
                sie.address_line2 = post.optional_text(3);
                sie.phone = post.optional_text(4);
            }
            Keyword::Fnamn => sie.company_name = post.required(1).map(str::to_string),
            Keyword::Rar => {
                let year_index = post.year_index(1, options.max_year_index);
                let start = post.required(2).unwrap_or_default().to_string();
                let end = post.required(3).unwrap_or_default().to_string();
                if let Some(year_index) = year_index {
                    sie.years
                        .insert(year_index.to_string(), FiscalYear { start, end });
                }
            }
            Keyword::Taxar => sie.taxation_year = post.year(1).map(str::to_string),
            Keyword::Omfattn => sie.balance_end_date = post.required(1).map(str::to_string),
            Keyword::Kptyp => sie.base_account_plan = post.required(1).map(str::to_string),
            Keyword::Valuta => sie.currency = post.required(1).map(str::to_string),
            Keyword::Konto => {
                if post.assert_parameters(2) {
                    sie.accounts.entry(fields[1].clone()).or_default().name = fields[2].clone();
                }
            }
            Keyword::Ktyp => {
                if !post.assert_parameters(2) || undeclared(&mut post, sie, &fields[1]) {
                    return;
                }
                match AccountType::try_from(fields[2].as_str()) {
                    Ok(ty) => {
                        if let Some(account) = sie.accounts.get_mut(&fields[1]) {
                            account.ty = Some(ty);
                        }
                    }
                    Err(_) => post.error(DiagnosticKind::UnknownAccountType {
                        value: fields[2].clone(),
                    }),
                }
            }
            Keyword::Enhet => {
                if !post.assert_parameters(2) || undeclared(&mut post, sie, &fields[1]) {
                    return;
                }
                if let Some(account) = sie.accounts.get_mut(&fields[1]) {
                    account.unit = Some(fields[2].clone());
                }
            }
            Keyword::Sru => {
                if post.assert_parameters(2) {
                    sie.accounts.entry(fields[1].clone()).or_default().sru = Some(fields[2].clone());
                }
            }
            Keyword::Dim => {
                if post.assert_parameters(2) {
                    sie.dimensions.entry(fields[1].clone()).or_default().name = fields[2].clone();
                }
            }
            Keyword::Underdim => {
                if post.assert_parameters(3) {
                    let dimension = sie.dimensions.entry(fields[1].clone()).or_default();
                    dimension.name = fields[2].clone();
                    dimension.parent = Some(fields[3].clone());
                }
            }
            Keyword::Objekt => {
                if post.assert_parameters(3) {
                    // Dimensions 1-19 are reserved and need no #DIM.
                    sie.dimensions
                        .entry(fields[1].clone())
                        .or_default()
                        .objects
                        .insert(fields[2].clone(), fields[3].clone());
                }
            }
            Keyword::Ib | Keyword::Ub | Keyword::Res => {
                if post.assert_parameters(3) {
                    if let Some(kind) = AmountKind::from_keyword(keyword) {
                        let summary = account_summary(&mut post, kind, options);
                        sie.period_summaries.push(summary);
                    }
                }
            }
            Keyword::Oib | Keyword::Oub => {
                if post.assert_parameters(4) {
                    if let Some(kind) = AmountKind::from_keyword(keyword) {
                        if let Some(summary) = object_summary(&mut post, kind, options) {
                            sie.period_summaries.push(summary);
                        }
                    }
                }
            }
            Keyword::Psaldo | Keyword::Pbudget => {
                if post.assert_parameters(5) {
                    if let Some(kind) = AmountKind::from_keyword(keyword) {
                        if let Some(summary) = period_summary(&mut post, kind, options) {
                            sie.period_summaries.push(summary);
                        }
                    }
                }
            }
            Keyword::Ver => {
                let verification = verification(&mut post);
                log::debug!(
                    "event=sie_read_ver module=reader row={} series={} number={}",
                    post.row(),
                    verification.series,
                    verification.number
                );
                sie.verifications.push(verification);
                self.block = Block::Opening;
            }
            Keyword::Trans
            | Keyword::Rtrans
            | Keyword::Btrans
            | Keyword::Ksumma
            | Keyword::Unknown => {
                log::debug!(
                    "event=sie_read_skip module=reader row={} keyword={}",
                    post.row(),
                    post.keyword()
                );
            }
        }
    }

    fn row_post(&mut self, keyword: Keyword, fields: &[String]) {
        let sequence = match self.block {
            Block::Rows { sequence } => sequence,
            _ => return,
        };
        let mut post = Post::new(fields, self.row, &mut self.diagnostics);
        let verification = match self.document.verifications.last_mut() {
            Some(verification) => verification,
            None => return,
        };

        match keyword {
            Keyword::Trans => {
                if post.assert_parameters(3) {
                    verification.rows.push(verification_row(&mut post, sequence));
                    self.block = Block::Rows {
                        sequence: sequence + 1,
                    };
                }
            }
            // History rows share the sequence number of the #TRANS they precede.
            Keyword::Rtrans => {
                if post.assert_parameters(3) {
                    let row = verification_row(&mut post, sequence);
                    verification.added_rows.entry(sequence).or_default().push(row);
                }
            }
            Keyword::Btrans => {
                if post.assert_parameters(3) {
                    let row = verification_row(&mut post, sequence);
                    verification.removed_rows.entry(sequence).or_default().push(row);
                }
            }
            _ => {
                log::debug!(
                    "event=sie_read_skip module=reader row={} keyword={}",
                    post.row(),
                    post.keyword()
                );
            }
        }
    }
}

fn invalid_value(keyword: &str, value: &str) -> DiagnosticKind {
    DiagnosticKind::InvalidValue {
        keyword: keyword.to_string(),
        value: value.to_string(),
    }
}

/// Warns when `account` has no `#KONTO`, returning whether it was missing.
fn undeclared(post: &mut Post<'_>, sie: &Document, account: &str) -> bool {
    post.warn_if(!sie.accounts.contains_key(account), || {
        DiagnosticKind::UndeclaredAccount {
            account: account.to_string(),
        }
    })
}

/// `#IB`, `#UB` and `#RES`: year, account, amount and optional quantity.
fn account_summary(
    post: &mut Post<'_>,
    kind: AmountKind,
    options: &ReaderOptions,
) -> PeriodSummary {
    let year_index = post.year_index(1, options.max_year_index).unwrap_or_default();
    let account = post.optional(2).unwrap_or_default();
    PeriodSummary {
        kind,
        year_index: year_index.to_string(),
        period: None,
        account: account.to_string(),
        objects: None,
        amount: post.decimal(3),
        quantity: post.optional_decimal(4),
    }
}

/// `#OIB` and `#OUB`: like [`account_summary`] with an object list before the amount.
fn object_summary(
    post: &mut Post<'_>,
    kind: AmountKind,
    options: &ReaderOptions,
) -> Option<PeriodSummary> {
    let year_index = post.year_index(1, options.max_year_index).unwrap_or_default();
    let account = post.optional(2).unwrap_or_default();
    let objects = post.objects(3)?;
    Some(PeriodSummary {
        kind,
        year_index: year_index.to_string(),
        period: None,
        account: account.to_string(),
        objects: Some(objects),
        amount: post.decimal(4),
        quantity: post.optional_decimal(5),
    })
}

/// `#PSALDO` and `#PBUDGET`: year, period, account, object list, amount and optional quantity.
fn period_summary(
    post: &mut Post<'_>,
    kind: AmountKind,
    options: &ReaderOptions,
) -> Option<PeriodSummary> {
    let year_index = post.year_index(1, options.max_year_index).unwrap_or_default();
    let period = post.period(2).unwrap_or_default();
    let account = post.optional(3).unwrap_or_default();
    let objects = post.objects(4)?;
    Some(PeriodSummary {
        kind,
        year_index: year_index.to_string(),
        period: Some(period.to_string()),
        account: account.to_string(),
        objects: Some(objects),
        amount: post.decimal(5),
        quantity: post.optional_decimal(6),
    })
}

/// `#VER series number date [text] [registration date] [user]`.
fn verification(post: &mut Post<'_>) -> Verification {
    let date = if post.assert_parameters(3) {
        post.date(3)
    } else {
        None
    };
    Verification {
        series: post.optional(1).unwrap_or_default().to_string(),
        number: post.optional(2).unwrap_or_default().to_string(),
        date: date.unwrap_or(NaiveDate::MIN),
        text: post.optional_text(4),
        registration_date: post.optional_date(5),
        user: post.optional_text(6),
        rows: Vec::new(),
        added_rows: Default::default(),
        removed_rows: Default::default(),
    }
}

/// `#TRANS account {objects} amount [date] [text] [quantity] [user]`, also used for `#RTRANS`
/// and `#BTRANS`.
fn verification_row(post: &mut Post<'_>, sequence: u32) -> VerificationRow {
    VerificationRow {
        account: post.optional(1).unwrap_or_default().to_string(),
        objects: post.objects(2).unwrap_or_default(),
        amount: post.decimal(3),
        transaction_date: post.optional_date(4),
        text: post.optional_text(5),
        quantity: post.optional_decimal(6),
        user: post.optional_text(7),
        sequence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use rust_decimal::Decimal;

    macro_rules! errors {
        ( $input:expr ) => {
            parse($input, "muu.si")
                .diagnostics
                .errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        };
    }

    macro_rules! parse_clean {
        ( $input:expr, $filename:expr ) => {{
            let parsed = parse($input, $filename);
            assert_eq!(parsed.diagnostics, Diagnostics::default());
            parsed.document
        }};
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const FULL_TYPE_3: &str = indoc!(
        r#"
        #FLAGGA 0 
        #FORMAT PC8
        #SIETYP 3
        #PROGRAM "Super bokföring \"2000\" med coola grejjer" 3.14
        #GEN 20230822 
        #FNAMN "Övningsbolaget AB"
        #FNR "exort873123-3123-12"
        #ORGNR 555555-5555
        #ADRESS "Gun Hellsweek" "Box 1" "123 45 STORSTAD" "012-34 56 78"
        #RAR 0 20210101 20211231
        #RAR -1 20200101 20201231
        #TAXAR 2022 
        #VALUTA SEK
        #KPTYP EUBAS97
        #KONTO 1221 Inventarier
        #KTYP 1221 T
        #SRU 1221 7215
        #KONTO 2081 Aktiekapital
        #KTYP 2081 S
        #SRU 2081 7301
        #KONTO 3041 "Försäljn tjänst 25% sv"
        #KTYP 3041 I
        #SRU 3041 7410
        #KONTO 4010 "Inköp material och varor"
        #KTYP 4010 K
        #SRU 4010 7512
        #DIM 1 Resultatenhet
        #OBJEKT 1 Nord "Kontor Nord"
        #OBJEKT 1 Syd "Kontor Syd"
        #IB 0 1221 421457.53
        #UB 0 1221 518057.53 123.2
        #IB 0 2081 -200000.00
        #UB 0 2081 -200000.00
        #RES 0 3041 -1690380.20
        #RES 0 4010 2391104.75
        #IB -1 1221 789418.53
        #UB -1 1221 421457.53
        #IB -1 2081 -200000.00
        #UB -1 2081 -200000.00
        #RES -1 3041 -1616182.70
        #RES -1 4010 2300437.22

        #OIB 0 1221 {1 "Nord"} 23780.78
        #OIB 0 1221 {1 "Syd" 7 JonasX} 555 12.2
        #OIB 0 2081 {7 "KalleB"} 1000.01 6
        #OUB 0 2081 {7 "KalleB"} 999 1.3
        "#
    );

    #[test]
    fn simple_file() {
        let sie = parse_clean!("#FLAGGA 0 \n#MUU 123", "muu.si");
        assert!(!sie.already_imported);
    }

    #[test]
    fn full_type_3() {
        let sie = parse_clean!(FULL_TYPE_3, "foo.si");
        assert_eq!(sie.file_type, Some(FileType::ObjectBalances));
        assert_eq!(
            sie.program.as_deref(),
            Some("Super bokföring \"2000\" med coola grejjer")
        );
        assert_eq!(sie.program_version.as_deref(), Some("3.14"));
        assert_eq!(sie.generated, Some(date(2023, 8, 22)));
        assert_eq!(sie.company_name.as_deref(), Some("Övningsbolaget AB"));
        assert_eq!(sie.phone.as_deref(), Some("012-34 56 78"));
        assert_eq!(sie.taxation_year.as_deref(), Some("2022"));
        assert_eq!(sie.years["-1"].end, "20201231");
        assert_eq!(sie.accounts.len(), 4);
        assert_eq!(sie.accounts["3041"].name, "Försäljn tjänst 25% sv");
        assert_eq!(sie.accounts["3041"].ty, Some(AccountType::Income));
        assert_eq!(sie.accounts["4010"].sru.as_deref(), Some("7512"));
        assert_eq!(sie.dimensions["1"].objects["Syd"], "Kontor Syd");
        assert_eq!(sie.period_summaries.len(), 16);

        let kalle = |kind: AmountKind| {
            sie.period_summaries
                .iter()
                .find(|s| {
                    s.kind == kind
                        && s.objects.as_ref().and_then(|o| o.get("7")).map(String::as_str)
                            == Some("KalleB")
                })
                .unwrap()
        };
        let incoming = kalle(AmountKind::ObjectIncomingBalance);
        assert_eq!(incoming.amount, Decimal::new(100001, 2));
        assert_eq!(incoming.quantity, Some(Decimal::new(6, 0)));
        let outgoing = kalle(AmountKind::ObjectOutgoingBalance);
        assert_eq!(outgoing.amount, Decimal::new(999, 0));
        assert_eq!(outgoing.quantity, Some(Decimal::new(13, 1)));
    }

    #[test]
    fn full_type_4e() {
        let input = indoc!(
            r#"
            #FLAGGA 0 
            #FORMAT PC8
            #SIETYP 4
            #PROSA  \"muu\"			123	 hej"citat  sträng4 sträng5
            #PROGRAM "Super bokföring"   3.14
            #RAR 0 20210101 20211231
            #KONTO 1221 Inventarier
            #KTYP 1221 T
            #OIB 0 1221 {1 "Nord"} 23780.78

            #VER A 1 20210105 Kaffebröd 20210310
            {
               #TRANS 1221 {} -195.00
               #TRANS 2641 {} 20.88
               #TRANS 7690 {} 174.12
            }
            "#
        );
        let sie = parse_clean!(input, "foo.se");
        assert_eq!(sie.file_type, Some(FileType::TransactionExport));
        assert_eq!(sie.notes, vec!["\"muu\"".to_string()]);

        let ver = &sie.verifications[0];
        assert_eq!(ver.series, "A");
        assert_eq!(ver.text.as_deref(), Some("Kaffebröd"));
        assert_eq!(ver.registration_date, Some(date(2021, 3, 10)));
        assert_eq!(ver.rows.len(), 3);
        assert_eq!(ver.rows[2].sequence, 2);
        assert!(ver.is_balanced());
    }

    #[test]
    fn sietyp() {
        assert_eq!(
            errors!("#SIETYP"),
            vec!["Post '#SIETYP' is missing parameter 1 (row 1)"]
        );
        let file_type = |value: &str, filename| {
            parse(&format!("#SIETYP {}", value), filename)
                .document
                .file_type
        };
        assert_eq!(file_type("1", "muu.si"), Some(FileType::ClosingBalances));
        assert_eq!(file_type("2", "muu.si"), Some(FileType::PeriodBalances));
        assert_eq!(file_type("3", "muu.si"), Some(FileType::ObjectBalances));
        assert_eq!(file_type("4", "muu.si"), Some(FileType::TransactionImport));
        assert_eq!(file_type("4", "muu.se"), Some(FileType::TransactionExport));
        assert_eq!(file_type("4", "MUU.SE"), Some(FileType::TransactionExport));
        assert_eq!(file_type("5", "muu.se"), None);
    }

    #[test]
    fn valuta() {
        let sie = parse_clean!("#VALUTA NOK", "muu.si");
        assert_eq!(sie.currency.as_deref(), Some("NOK"));
        assert_eq!(
            errors!("#VALUTA"),
            vec!["Post '#VALUTA' is missing parameter 1 (row 1)"]
        );
    }

    #[test]
    fn empty_account_name() {
        let sie = parse_clean!("#KONTO 123 \"\"", "muu.si");
        assert_eq!(sie.accounts.len(), 1);
        assert_eq!(sie.accounts["123"].name, "");
    }

    #[test]
    fn account_references() {
        let parsed = parse("#KTYP 1910 T\n#ENHET 1910 st\n#SRU 1910 7281", "muu.si");
        assert!(parsed.diagnostics.errors.is_empty());
        let warnings: Vec<_> = parsed
            .diagnostics
            .warnings
            .iter()
            .map(|w| w.row)
            .collect();
        assert_eq!(warnings, vec![1, 2]);
        assert_eq!(parsed.document.accounts["1910"].sru.as_deref(), Some("7281"));
        assert_eq!(parsed.document.accounts["1910"].ty, None);

        assert_eq!(
            errors!("#KONTO 1910 Kassa\n#KTYP 1910 X"),
            vec!["Account type X is unknown (row 2)"]
        );
    }

    #[test]
    fn dimensions() {
        let sie = parse_clean!(
            "#OBJEKT 1 Nord \"Kontor Nord\"\n#DIM 21 Projekt\n#UNDERDIM 22 Delprojekt 21",
            "muu.si"
        );
        assert_eq!(sie.dimensions["1"].name, "");
        assert_eq!(sie.dimensions["1"].objects["Nord"], "Kontor Nord");
        assert_eq!(sie.dimensions["22"].parent.as_deref(), Some("21"));
    }

    #[test]
    fn repeated_posts_amend_entries() {
        let input = indoc!(
            r#"
            #RAR 0 20200101 20201231
            #RAR 0 20210101 20211231
            #KONTO 1910 Kassa
            #KONTO 1910 Kontanter
            #OBJEKT 21 P1 "Projekt 1"
            #DIM 21 Projekt
            #DIM 21 Projekten
            "#
        );
        let sie = parse_clean!(input, "muu.si");

        assert_eq!(sie.years.len(), 1);
        assert_eq!(
            sie.years["0"],
            FiscalYear {
                start: "20210101".into(),
                end: "20211231".into(),
            }
        );
        assert_eq!(sie.accounts.len(), 1);
        assert_eq!(sie.accounts["1910"].name, "Kontanter");
        assert_eq!(sie.dimensions.len(), 1);
        assert_eq!(sie.dimensions["21"].name, "Projekten");
        assert_eq!(sie.dimensions["21"].objects["P1"], "Projekt 1");
    }

    #[test]
    fn rows_without_label_warn() {
        let parsed = parse("\n   \nmuu\n  #FLAGGA 1", "muu.si");
        assert!(parsed.diagnostics.errors.is_empty());
        assert_eq!(parsed.diagnostics.warnings.len(), 1);
        assert_eq!(
            parsed.diagnostics.warnings[0].to_string(),
            "Row does not start with a '#' (row 3)"
        );
        assert!(parsed.document.already_imported);
    }

    #[test]
    fn unsupported_format_warns() {
        let parsed = parse("#FORMAT PC8\n#FORMAT UTF8", "muu.si");
        assert!(parsed.diagnostics.errors.is_empty());
        assert_eq!(parsed.diagnostics.warnings.len(), 1);
        assert_eq!(parsed.diagnostics.warnings[0].row, 2);
    }

    #[test]
    fn missing_summary_parameters() {
        let cases = [
            ("#IB 0 1910", "#IB", 3, 3),
            ("#UB 0", "#UB", 3, 2),
            ("#RES", "#RES", 3, 1),
            ("#OIB 0 1910 {1 Nord}", "#OIB", 4, 4),
            ("#OUB 0 1910", "#OUB", 4, 3),
            ("#PSALDO 0 202101 1910 {}", "#PSALDO", 5, 5),
            ("#PBUDGET 0 202101", "#PBUDGET", 5, 3),
        ];
        for (line, keyword, count, missing) in cases.iter() {
            let input = format!("#FLAGGA 0\n{}\n#VALUTA SEK", line);
            let parsed = parse(&input, "muu.si");
            assert_eq!(
                parsed.diagnostics.errors,
                vec![Diagnostic {
                    kind: DiagnosticKind::TooFewParameters {
                        keyword: keyword.to_string(),
                        count: *count,
                        missing: *missing,
                    },
                    row: 2,
                }],
                "{}",
                line
            );
            assert!(parsed.document.period_summaries.is_empty());
            assert_eq!(parsed.document.currency.as_deref(), Some("SEK"));
        }
    }

    #[test]
    fn period_summaries() {
        let sie = parse_clean!(
            indoc!(
                r#"
                #PSALDO 0 202101 3041 {1 Nord} -1000.50 3
                #PBUDGET -1 202112 3041 {} 900
                #RES 0 3041 -1690380.20
                "#
            ),
            "muu.si"
        );
        let psaldo = &sie.period_summaries[0];
        assert_eq!(psaldo.kind, AmountKind::PeriodChange);
        assert_eq!(psaldo.period.as_deref(), Some("202101"));
        assert_eq!(psaldo.amount, Decimal::new(-100050, 2));
        assert_eq!(psaldo.objects.as_ref().unwrap()["1"], "Nord");

        let pbudget = &sie.period_summaries[1];
        assert_eq!(pbudget.year_index, "-1");
        assert_eq!(pbudget.quantity, None);
        assert!(pbudget.objects.as_ref().unwrap().is_empty());

        assert_eq!(sie.period_summaries[2].kind, AmountKind::Result);
        assert_eq!(sie.period_summaries[2].objects, None);
    }

    #[test]
    fn invalid_summary_fields() {
        assert_eq!(
            errors!("#IB 101 1910 12,5"),
            vec![
                "Post '#IB' parameter 1 ('101') is not a valid year index (row 1)",
                "Post '#IB' parameter 3 ('12,5') is not a valid number (row 1)",
            ]
        );
        assert_eq!(
            errors!("#PSALDO 0 2021 1910 {} 10"),
            vec!["Post '#PSALDO' parameter 2 ('2021') is not a valid period (row 1)"]
        );

        let parsed = parse("#OIB 0 1910 1 10\n#OUB 0 1910 {1} 10", "muu.si");
        assert_eq!(parsed.diagnostics.errors.len(), 2);
        assert_eq!(
            parsed.diagnostics.errors[0].to_string(),
            "Post '#OIB' dimensions invalid (row 1)"
        );
        // A list with a dangling key is reported but the balance is kept.
        assert_eq!(parsed.document.period_summaries.len(), 1);
        assert_eq!(
            parsed.document.period_summaries[0].kind,
            AmountKind::ObjectOutgoingBalance
        );
    }

    #[test]
    fn balanced_verification() {
        let sie = parse_clean!(
            "#VER A 1 20210105\n{\n#TRANS A {} 10\n#TRANS B {} -10\n}",
            "muu.si"
        );
        assert_eq!(sie.verifications.len(), 1);
        assert_eq!(sie.verifications[0].rows.len(), 2);
        assert_eq!(sie.verifications[0].balance(), Some(Decimal::ZERO));
    }

    #[test]
    fn unbalanced_verification() {
        assert_eq!(
            errors!("#VER A 1 20210105\n{\n#TRANS A {} 10\n#TRANS B {} -9.99\n}\n#FLAGGA 0"),
            vec!["Post #VER sum of rows is not zero (row 5)"]
        );
    }

    #[test]
    fn overflowing_verification_is_unbalanced() {
        let input = indoc!(
            "
            #VER A 1 20210105
            {
            #TRANS 1910 {} 79228162514264337593543950335
            #TRANS 1910 {} 79228162514264337593543950335
            }
            "
        );
        let parsed = parse(input, "muu.si");
        assert_eq!(parsed.document.verifications[0].rows.len(), 2);
        assert_eq!(
            parsed
                .diagnostics
                .errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            vec!["Post #VER sum of rows is not zero (row 5)"]
        );
    }

    #[test]
    fn unclosed_verification() {
        let input = indoc!(
            r#"
            #FLAGGA 0 
            #VER A 1 20210105 Kaffebröd 20210310
            {
               #TRANS 1910 {} -195.00
               #TRANS 2641 {} 20.88
            "#
        );
        let parsed = parse(input, "muu.si");
        assert_eq!(
            parsed
                .diagnostics
                .errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            vec!["Post #VER was not closed with a '}' (row 5)"]
        );
        assert!(parsed.diagnostics.warnings.is_empty());
        assert_eq!(parsed.document.verifications[0].rows.len(), 2);
    }

    #[test]
    fn verification_header() {
        assert_eq!(
            errors!("#VER"),
            vec![
                "Post '#VER' does not have 3 parameters, parameter 1 is missing (row 1)",
                "Post #VER was not closed with a '}' (row 1)",
            ]
        );

        let sie = parse("#VER \"\" \"\" 20081216 \"Porto\"", "muu.si").document;
        assert_eq!(sie.verifications.len(), 1);
        assert_eq!(sie.verifications[0].series, "");
        assert_eq!(sie.verifications[0].text.as_deref(), Some("Porto"));
        assert_eq!(sie.verifications[0].date, date(2008, 12, 16));
    }

    #[test]
    fn verification_not_opened() {
        let parsed = parse("#VER \"\" \"\" 20081216 \"Porto\"\n#VALUTA SEK", "muu.si");
        assert_eq!(
            parsed.diagnostics.errors[0].to_string(),
            "Post #VER was not followed by '{' (row 2)"
        );
        assert_eq!(parsed.diagnostics.errors.len(), 1);
        assert_eq!(parsed.document.currency.as_deref(), Some("SEK"));
        assert!(parsed.document.verifications[0].rows.is_empty());
    }

    #[test]
    fn verification_history() {
        let input = indoc!(
            r#"
            #VER A 252 20220603 "Namn" 20220920
            {
            #TRANS 1933 {} -10337 "" "" 0
            #TRANS 2393 {} 7637 "" "" 0
            #BTRANS 8400 {} 2700 "" "" 0 "Namn 2"
            #RTRANS 8410 {} 2700 "" "" 0 "Namn 2"
            #TRANS 8410 {} 2700 "" "" 0
            }
            "#
        );
        let sie = parse_clean!(input, "muu.si");
        let ver = &sie.verifications[0];
        assert_eq!(ver.rows.len(), 3);
        assert_eq!(ver.added_rows.len(), 1);
        assert_eq!(ver.removed_rows.len(), 1);

        let added = &ver.added_rows[&2][0];
        assert_eq!(added.account, "8410");
        assert_eq!(added.user.as_deref(), Some("Namn 2"));
        assert_eq!(added.sequence, ver.rows[2].sequence);
        assert_eq!(ver.removed_rows[&2][0].account, "8400");

        let row = &ver.rows[0];
        assert_eq!(row.transaction_date, None);
        assert_eq!(row.text, None);
        assert_eq!(row.quantity, Some(Decimal::ZERO));
    }

    #[test]
    fn reader_resets_between_reads() {
        let mut reader = SieReader::new();
        reader.read_str("#VALUTA", "muu.si");
        assert_eq!(reader.errors().len(), 1);
        let sie = reader.read_str("#VALUTA NOK", "muu.si");
        assert!(reader.errors().is_empty());
        assert!(reader.warnings().is_empty());
        assert_eq!(sie.currency.as_deref(), Some("NOK"));
    }

    #[test]
    fn read_bytes_decodes_code_page() {
        let mut reader = SieReader::new();
        // "#FNAMN Övningsbolaget" in code page 437.
        let mut bytes = b"#FNAMN ".to_vec();
        bytes.push(0x99);
        bytes.extend_from_slice(b"vningsbolaget\r\n");
        let sie = reader.read_bytes(&bytes, "muu.si");
        assert_eq!(sie.company_name.as_deref(), Some("Övningsbolaget"));
    }

    #[test]
    fn checksum_is_ignored_by_default() {
        let sie = parse_clean!("#KSUMMA\n#FLAGGA 0\n#KSUMMA 42", "muu.si");
        assert!(!sie.already_imported);
    }

    #[test]
    fn checksum_verification() {
        let mut crc = Crc32::new();
        crc.add_post(&split_line("#FLAGGA 0"), &Cp437).unwrap();
        crc.add_post(&split_line("#FNAMN \"Övningsbolaget AB\""), &Cp437)
            .unwrap();
        let checksum = crc.checksum();

        let options = ReaderOptions::builder().verify_checksum(true).build();
        let mut reader = SieReader::with_options(options);
        let input = format!(
            "#KSUMMA\n#FLAGGA 0\n\n#FNAMN \"Övningsbolaget AB\"\n#KSUMMA {}",
            checksum
        );
        reader.read_str(&input, "muu.si");
        assert!(reader.errors().is_empty());

        let input = format!(
            "#KSUMMA\n#FLAGGA 1\n#FNAMN \"Övningsbolaget AB\"\n#KSUMMA {}",
            checksum
        );
        reader.read_str(&input, "muu.si");
        assert!(matches!(
            reader.errors()[0].kind,
            DiagnosticKind::ChecksumMismatch { expected, .. } if expected == checksum
        ));

        reader.read_str("#FLAGGA 0\n#KSUMMA 1", "muu.si");
        assert_eq!(reader.errors()[0].kind, DiagnosticKind::ChecksumNotStarted);

        reader.read_str("#KSUMMA\n#FLAGGA 0", "muu.si");
        assert_eq!(reader.errors()[0].kind, DiagnosticKind::ChecksumNotClosed);
        assert_eq!(reader.errors()[0].row, 2);
    }
}
