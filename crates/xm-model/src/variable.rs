//! `Variable` — one slot of agent memory, message payload, ADT member or
//! environment constant.
//!
//! The parser stores exactly what the document said: the type may carry an
//! `_array` suffix (dynamic array) and the name may carry a `[N]` suffix
//! (static array).  The validator strips both suffixes, sets the flags, and
//! resolves the `constant` attribute.

/// A typed, named memory slot.
///
/// `type_name` and `name` are raw until the owning model is validated; the
/// boolean flags and `static_array_size` are only meaningful afterwards.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    /// Data type name.  May end in `_array` before validation.
    pub type_name: String,

    /// Variable name.  May end in `[N]` before validation.
    pub name: String,

    /// Raw `constant` attribute (`"true"`/`"false"`), if the document set one.
    pub constant_str: Option<String>,

    /// The type carried an `_array` suffix: a dynamic array.
    pub is_dynamic_array: bool,

    /// The name carried a `[N]` suffix: a fixed-size array.
    pub is_static_array: bool,

    /// Element count of a static array.  `>= 1` once validated.
    pub static_array_size: u32,

    /// Resolved `constant` attribute.
    pub is_constant: bool,

    /// The variable is, or (via an ADT) transitively contains, a dynamic
    /// array.  Positions that forbid dynamic arrays check this flag.
    pub holds_dynamic_array: bool,

    /// The type resolved to a user-declared abstract data type.
    pub has_adt_type: bool,
}

impl Variable {
    /// A raw variable as the parser would hand it over.
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Raw variable with a `constant` attribute string attached.
    pub fn with_constant(type_name: impl Into<String>, name: impl Into<String>, c: &str) -> Self {
        Self {
            constant_str: Some(c.to_owned()),
            ..Self::new(type_name, name)
        }
    }
}

/// `true` if a variable called `name` exists in `variables`.
pub fn variable_exists(name: &str, variables: &[Variable]) -> bool {
    variables.iter().any(|v| v.name == name)
}
