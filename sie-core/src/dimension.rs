use indexmap::IndexMap;
use typed_builder::TypedBuilder;

/// Objects referenced by an amount, keyed by dimension code.
///
/// Written as an alternating key/value list in braces: `{1 Nord 6 P1}`.
pub type ObjectList = IndexMap<String, String>;

/// A classification axis, e.g. cost center or project, with its objects.
///
/// ```text
/// #DIM 1 Resultatenhet
/// #UNDERDIM 21 Avdelning 1
/// #OBJEKT 1 Nord "Kontor Nord"
/// ```
///
/// Dimensions 1 to 19 are reserved by the format and may be used without a `#DIM` declaration.
#[derive(Clone, Debug, Default, Eq, PartialEq, TypedBuilder)]
pub struct Dimension {
    #[builder(default, setter(into))]
    pub name: String,

    /// Parent dimension code, set for sub-dimensions.
    #[builder(default, setter(strip_option, into))]
    pub parent: Option<String>,

    /// Object names keyed by object code.
    #[builder(default)]
    pub objects: IndexMap<String, String>,
}
