use std::fmt;

/// The post labels understood by this crate.
///
/// SIE is open-ended: labels outside this set are valid and map to [`Keyword::Unknown`], which
/// readers skip.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Keyword {
    Flagga,
    Ksumma,
    Program,
    Format,
    Gen,
    Sietyp,
    Prosa,
    Ftyp,
    Fnr,
    Orgnr,
    Bkod,
    Adress,
    Fnamn,
    Rar,
    Taxar,
    Omfattn,
    Kptyp,
    Valuta,
    Konto,
    Ktyp,
    Enhet,
    Sru,
    Dim,
    Underdim,
    Objekt,
    Ib,
    Ub,
    Oib,
    Oub,
    Res,
    Psaldo,
    Pbudget,
    Ver,
    Trans,
    Rtrans,
    Btrans,
    Unknown,
}

impl Keyword {
    /// The label as written in a file, including the leading `#`.
    pub fn as_str(self) -> &'static str {
        use Keyword::*;
        match self {
            Flagga => "#FLAGGA",
            Ksumma => "#KSUMMA",
            Program => "#PROGRAM",
            Format => "#FORMAT",
            Gen => "#GEN",
            Sietyp => "#SIETYP",
            Prosa => "#PROSA",
            Ftyp => "#FTYP",
            Fnr => "#FNR",
            Orgnr => "#ORGNR",
            Bkod => "#BKOD",
            Adress => "#ADRESS",
            Fnamn => "#FNAMN",
            Rar => "#RAR",
            Taxar => "#TAXAR",
            Omfattn => "#OMFATTN",
            Kptyp => "#KPTYP",
            Valuta => "#VALUTA",
            Konto => "#KONTO",
            Ktyp => "#KTYP",
            Enhet => "#ENHET",
            Sru => "#SRU",
            Dim => "#DIM",
            Underdim => "#UNDERDIM",
            Objekt => "#OBJEKT",
            Ib => "#IB",
            Ub => "#UB",
            Oib => "#OIB",
            Oub => "#OUB",
            Res => "#RES",
            Psaldo => "#PSALDO",
            Pbudget => "#PBUDGET",
            Ver => "#VER",
            Trans => "#TRANS",
            Rtrans => "#RTRANS",
            Btrans => "#BTRANS",
            Unknown => "",
        }
    }
}

impl From<&str> for Keyword {
    fn from(s: &str) -> Self {
        use Keyword::*;
        match s {
            "#FLAGGA" => Flagga,
            "#KSUMMA" => Ksumma,
            "#PROGRAM" => Program,
            "#FORMAT" => Format,
            "#GEN" => Gen,
            "#SIETYP" => Sietyp,
            "#PROSA" => Prosa,
            "#FTYP" => Ftyp,
            "#FNR" => Fnr,
            "#ORGNR" => Orgnr,
            "#BKOD" => Bkod,
            "#ADRESS" => Adress,
            "#FNAMN" => Fnamn,
            "#RAR" => Rar,
            "#TAXAR" => Taxar,
            "#OMFATTN" => Omfattn,
            "#KPTYP" => Kptyp,
            "#VALUTA" => Valuta,
            "#KONTO" => Konto,
            "#KTYP" => Ktyp,
            "#ENHET" => Enhet,
            "#SRU" => Sru,
            "#DIM" => Dim,
            "#UNDERDIM" => Underdim,
            "#OBJEKT" => Objekt,
            "#IB" => Ib,
            "#UB" => Ub,
            "#OIB" => Oib,
            "#OUB" => Oub,
            "#RES" => Res,
            "#PSALDO" => Psaldo,
            "#PBUDGET" => Pbudget,
            "#VER" => Ver,
            "#TRANS" => Trans,
            "#RTRANS" => Rtrans,
            "#BTRANS" => Btrans,
            _ => Unknown,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
