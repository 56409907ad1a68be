use typed_builder::TypedBuilder;

use super::account_types::AccountType;

/// Represents an account in the chart of accounts.
///
/// An account is declared with `#KONTO` and amended by `#KTYP`, `#SRU` and `#ENHET`, all keyed by
/// the account code:
///
/// ```text
/// #KONTO 1221 Inventarier
/// #KTYP 1221 T
/// #SRU 1221 7215
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq, TypedBuilder)]
pub struct Account {
    /// Name of the account. May be empty.
    #[builder(default, setter(into))]
    pub name: String,

    /// Type of the account, `None` when not declared.
    #[builder(default, setter(strip_option))]
    pub ty: Option<AccountType>,

    /// Code used when reporting to the tax authority.
    #[builder(default, setter(strip_option, into))]
    pub sru: Option<String>,

    /// Unit of measure for quantities booked on the account.
    #[builder(default, setter(strip_option, into))]
    pub unit: Option<String>,
}
