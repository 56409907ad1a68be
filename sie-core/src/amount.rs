use rust_decimal::Decimal;
use typed_builder::TypedBuilder;

use super::dimension::ObjectList;
use super::keyword::Keyword;

/// Kind of a [`PeriodSummary`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AmountKind {
    /// Account balance at the start of the year (`#IB`).
    IncomingBalance,
    /// Account balance at the end of the year (`#UB`).
    OutgoingBalance,
    /// Object balance at the start of the year (`#OIB`).
    ObjectIncomingBalance,
    /// Object balance at the end of the year (`#OUB`).
    ObjectOutgoingBalance,
    /// Yearly result of a cost or income account (`#RES`).
    Result,
    /// Change during a period (`#PSALDO`).
    PeriodChange,
    /// Budgeted change during a period (`#PBUDGET`).
    PeriodBudgetChange,
}

impl AmountKind {
    pub fn keyword(self) -> Keyword {
        match self {
            AmountKind::IncomingBalance => Keyword::Ib,
            AmountKind::OutgoingBalance => Keyword::Ub,
            AmountKind::ObjectIncomingBalance => Keyword::Oib,
            AmountKind::ObjectOutgoingBalance => Keyword::Oub,
            AmountKind::Result => Keyword::Res,
            AmountKind::PeriodChange => Keyword::Psaldo,
            AmountKind::PeriodBudgetChange => Keyword::Pbudget,
        }
    }

    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::Ib => Some(AmountKind::IncomingBalance),
            Keyword::Ub => Some(AmountKind::OutgoingBalance),
            Keyword::Oib => Some(AmountKind::ObjectIncomingBalance),
            Keyword::Oub => Some(AmountKind::ObjectOutgoingBalance),
            Keyword::Res => Some(AmountKind::Result),
            Keyword::Psaldo => Some(AmountKind::PeriodChange),
            Keyword::Pbudget => Some(AmountKind::PeriodBudgetChange),
            _ => None,
        }
    }

    /// Changes carry a period; balances must not.
    pub fn is_change(self) -> bool {
        matches!(
            self,
            AmountKind::PeriodChange | AmountKind::PeriodBudgetChange
        )
    }

    /// Whether the post carries an object list.
    pub fn has_objects(self) -> bool {
        !matches!(
            self,
            AmountKind::IncomingBalance | AmountKind::OutgoingBalance | AmountKind::Result
        )
    }
}

/// The balance, result or change of an account or object.
///
/// ```text
/// #IB 0 1221 421457.53
/// #OUB 0 2081 {7 "KalleB"} 999 1.3
/// #PSALDO 0 202101 3041 {} -1200.00
/// ```
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct PeriodSummary {
    pub kind: AmountKind,

    /// Year as declared by `#RAR`, typically `0` for the current year.
    #[builder(setter(into))]
    pub year_index: String,

    /// Month as `yyyyMM`, only for changes.
    #[builder(default, setter(strip_option, into))]
    pub period: Option<String>,

    #[builder(setter(into))]
    pub account: String,

    /// Objects, only for kinds that carry an object list.
    #[builder(default, setter(strip_option))]
    pub objects: Option<ObjectList>,

    pub amount: Decimal,

    #[builder(default, setter(strip_option))]
    pub quantity: Option<Decimal>,
}
