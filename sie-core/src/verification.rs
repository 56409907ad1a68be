use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use typed_builder::TypedBuilder;

use super::dimension::ObjectList;

/// Historical rows keyed by the sequence number of the current row they amend.
pub type RowHistory = BTreeMap<u32, Vec<VerificationRow>>;

/// A voucher: a dated ledger entry whose rows balance to zero.
///
/// ```text
/// #VER A 1 20210105 Kaffebröd 20210310
/// {
///    #TRANS 1910 {} -195.00
///    #TRANS 2641 {} 20.88
///    #TRANS 7690 {} 174.12
/// }
/// ```
///
/// A voucher that was changed after registration may carry `#BTRANS` (removed) and `#RTRANS`
/// (added) rows. They are history only and do not need to balance.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Verification {
    #[builder(setter(into))]
    pub series: String,

    #[builder(setter(into))]
    pub number: String,

    pub date: NaiveDate,

    #[builder(default, setter(strip_option, into))]
    pub text: Option<String>,

    #[builder(default, setter(strip_option))]
    pub registration_date: Option<NaiveDate>,

    #[builder(default, setter(strip_option, into))]
    pub user: Option<String>,

    /// Current rows, in file order.
    #[builder(default)]
    pub rows: Vec<VerificationRow>,

    /// Rows added by a later change (`#RTRANS`).
    #[builder(default)]
    pub added_rows: RowHistory,

    /// Rows removed by a later change (`#BTRANS`).
    #[builder(default)]
    pub removed_rows: RowHistory,
}

impl Verification {
    /// Sum of the current rows. Zero for a balanced voucher, `None` if the sum overflows.
    pub fn balance(&self) -> Option<Decimal> {
        self.rows
            .iter()
            .try_fold(Decimal::ZERO, |sum, row| sum.checked_add(row.amount))
    }

    pub fn is_balanced(&self) -> bool {
        self.balance().map_or(false, |sum| sum.is_zero())
    }
}

/// A transaction row of a [`Verification`].
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct VerificationRow {
    #[builder(setter(into))]
    pub account: String,

    #[builder(default)]
    pub objects: ObjectList,

    pub amount: Decimal,

    #[builder(default, setter(strip_option))]
    pub transaction_date: Option<NaiveDate>,

    #[builder(default, setter(strip_option, into))]
    pub text: Option<String>,

    #[builder(default, setter(strip_option))]
    pub quantity: Option<Decimal>,

    #[builder(default, setter(strip_option, into))]
    pub user: Option<String>,

    /// Position among the current rows, used to match history rows to the row they amend.
    #[builder(default)]
    pub sequence: u32,
}
