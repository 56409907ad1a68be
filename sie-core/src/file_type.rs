/// The `#SIETYP` variants.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FileType {
    /// Type 1: closing balances. Mostly obsolete.
    ClosingBalances,
    /// Type 2: period balances.
    PeriodBalances,
    /// Type 3: object balances.
    ObjectBalances,
    /// Type 4I: transactions to import into a ledger, e.g. from a payroll system.
    TransactionImport,
    /// Type 4E: complete export of transactions and everything else.
    TransactionExport,
}

impl FileType {
    /// The value written after `#SIETYP`. Both transaction variants are written as `4`.
    pub fn wire_value(self) -> &'static str {
        match self {
            FileType::ClosingBalances => "1",
            FileType::PeriodBalances => "2",
            FileType::ObjectBalances => "3",
            FileType::TransactionImport | FileType::TransactionExport => "4",
        }
    }

    /// Resolves a `#SIETYP` value.
    ///
    /// Type 4 files only differ by extension, so `filename` decides between import and export:
    /// a name ending in `export_extension` (ignoring case) is an export.
    pub fn from_wire(value: &str, filename: &str, export_extension: &str) -> Option<Self> {
        match value {
            "1" => Some(FileType::ClosingBalances),
            "2" => Some(FileType::PeriodBalances),
            "3" => Some(FileType::ObjectBalances),
            "4" if ends_with_ignore_case(filename, export_extension) => {
                Some(FileType::TransactionExport)
            }
            "4" => Some(FileType::TransactionImport),
            _ => None,
        }
    }
}

fn ends_with_ignore_case(s: &str, suffix: &str) -> bool {
    s.to_lowercase().ends_with(&suffix.to_lowercase())
}

#[test]
fn test_from_wire() {
    assert_eq!(
        FileType::from_wire("2", "a.si", ".se"),
        Some(FileType::PeriodBalances)
    );
    assert_eq!(
        FileType::from_wire("4", "muu.si", ".se"),
        Some(FileType::TransactionImport)
    );
    assert_eq!(
        FileType::from_wire("4", "MUU.SE", ".se"),
        Some(FileType::TransactionExport)
    );
    assert_eq!(FileType::from_wire("5", "muu.se", ".se"), None);
}
