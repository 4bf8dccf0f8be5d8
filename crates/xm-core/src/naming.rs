//! Identifier rules shared by every entity kind in a model.
//!
//! Agents, functions, states, variables, data types, messages and time units
//! all use the same character set: ASCII letters, digits, underscore and
//! hyphen.  Nothing else — in particular no dots, which are reserved for the
//! `parent.name` full-name convention, and no `a.`/`m.` operand prefixes.

/// The built-in base time unit.  Every other time unit resolves to it, and
/// no user-declared time unit may take this name.
pub const ITERATION_UNIT: &str = "iteration";

/// `true` if `name` is a non-empty string of `[A-Za-z0-9_-]`.
///
/// ```
/// assert!(xm_core::name_is_allowed("move_agent"));
/// assert!(!xm_core::name_is_allowed("a.b"));
/// ```
pub fn name_is_allowed(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
