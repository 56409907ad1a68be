use std::convert::TryFrom;

/// Allowed account types, as declared by `#KTYP`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AccountType {
    /// `T`, tillgång.
    Asset,
    /// `S`, skuld. Covers liabilities and equity.
    Liability,
    /// `K`, kostnad.
    Cost,
    /// `I`, intäkt.
    Income,
}

impl AccountType {
    /// The single character used in files.
    pub fn code(self) -> char {
        match self {
            AccountType::Asset => 'T',
            AccountType::Liability => 'S',
            AccountType::Cost => 'K',
            AccountType::Income => 'I',
        }
    }
}

impl TryFrom<&str> for AccountType {
    type Error = ();

    fn try_from(val: &str) -> Result<Self, Self::Error> {
        match val {
            "T" => Ok(AccountType::Asset),
            "S" => Ok(AccountType::Liability),
            "K" => Ok(AccountType::Cost),
            "I" => Ok(AccountType::Income),
            _ => Err(()),
        }
    }
}
