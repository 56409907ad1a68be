use chrono::{Local, Months, NaiveDate};
use indexmap::IndexMap;

pub use account::Account;
pub use account_types::AccountType;
pub use amount::{AmountKind, PeriodSummary};
pub use checksum::Crc32;
pub use dimension::{Dimension, ObjectList};
pub use encoding::{Codec, Cp437, EncodeError};
pub use file_type::FileType;
pub use keyword::Keyword;
pub use verification::{RowHistory, Verification, VerificationRow};

pub mod account;
pub mod account_types;
pub mod amount;
pub mod checksum;
pub mod date;
pub mod dimension;
pub mod encoding;
pub mod file_type;
pub mod keyword;
pub mod tokenizer;
pub mod verification;

/// Start and end date of a fiscal year, as written by `#RAR` (`yyyyMMdd`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FiscalYear {
    pub start: String,
    pub end: String,
}

/// Represents a complete SIE file (type 1 to 4).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    /// `#FLAGGA`. Written as 0 and set to 1 by the importing system to avoid importing twice.
    pub already_imported: bool,
    pub file_type: Option<FileType>,
    pub program: Option<String>,
    pub program_version: Option<String>,
    pub generated: Option<NaiveDate>,
    pub generated_by: Option<String>,

    pub contact: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub phone: Option<String>,
    /// Swedish industry code (SNI) of the company.
    pub company_sni: Option<String>,
    pub company_name: Option<String>,
    /// The exporting program's internal id for the company.
    pub internal_company_id: Option<String>,
    /// Company form as registered with Bolagsverket, e.g. `AB`, `HB`, `E`.
    pub company_type: Option<String>,
    pub organisation_number: Option<String>,
    pub organisation_internal_number: Option<String>,
    pub organisation_internal_number2: Option<String>,
    pub taxation_year: Option<String>,
    /// End date of period balances (types 2 and 3), `#OMFATTN`.
    pub balance_end_date: Option<String>,
    /// Base chart of accounts, e.g. `BAS95` or `EUBAS97`.
    pub base_account_plan: Option<String>,
    pub currency: Option<String>,

    pub notes: Vec<String>,
    /// Fiscal years keyed by year index, `"0"` being the current year.
    pub years: IndexMap<String, FiscalYear>,
    pub accounts: IndexMap<String, Account>,
    pub dimensions: IndexMap<String, Dimension>,
    pub period_summaries: Vec<PeriodSummary>,
    pub verifications: Vec<Verification>,
}

impl Document {
    /// Starts a document generated today, with `year_start` as the current fiscal year.
    ///
    /// Without `year_end` the year ends one day short of a year after it starts.
    pub fn new(
        file_type: FileType,
        program: &str,
        program_version: &str,
        company_name: &str,
        year_start: NaiveDate,
        year_end: Option<NaiveDate>,
    ) -> Self {
        let year_end = year_end
            .or_else(|| {
                year_start
                    .checked_add_months(Months::new(12))
                    .and_then(|d| d.pred_opt())
            })
            .unwrap_or(year_start);
        let mut years = IndexMap::new();
        years.insert(
            "0".to_string(),
            FiscalYear {
                start: date::format_date(year_start),
                end: date::format_date(year_end),
            },
        );
        Document {
            file_type: Some(file_type),
            program: Some(program.to_string()),
            program_version: Some(program_version.to_string()),
            company_name: Some(company_name.to_string()),
            generated: Some(Local::now().date_naive()),
            years,
            ..Document::default()
        }
    }

    /// Computes fields that can be derived from others before writing.
    ///
    /// Sets the balance end date of period and object balance files from the current year, and
    /// drops the period summaries the file type cannot carry.
    pub fn fill_defaults(&mut self) {
        if self.balance_end_date.is_none()
            && matches!(
                self.file_type,
                Some(FileType::PeriodBalances) | Some(FileType::ObjectBalances)
            )
        {
            self.balance_end_date = self.years.get("0").map(|year| year.end.clone());
        }

        if let Some(file_type) = self.file_type {
            self.period_summaries
                .retain(|summary| carries(file_type, summary.kind));
        }
    }
}

fn carries(file_type: FileType, kind: AmountKind) -> bool {
    use AmountKind::*;
    match file_type {
        FileType::ClosingBalances => matches!(kind, IncomingBalance | OutgoingBalance | Result),
        FileType::PeriodBalances => !matches!(kind, ObjectIncomingBalance | ObjectOutgoingBalance),
        FileType::ObjectBalances | FileType::TransactionExport => true,
        FileType::TransactionImport => false,
    }
}
