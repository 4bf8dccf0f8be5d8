//! Variable processing and checks.
//!
//! Raw variables carry two suffix conventions from the document: a type
//! ending in `_array` declares a dynamic array, and a name ending in `[N]`
//! declares a static array of size `N`.  Processing strips both and sets the
//! flags; checking then runs on the cleaned names.

use rustc_hash::{FxHashMap, FxHashSet};
use xm_model::{DataType, Variable, FUNDAMENTAL_TYPES};

use crate::report::{ValidationError, ValidationReport};

/// Resolvable type names plus which ADTs transitively hold dynamic arrays.
/// Built up by the data-type pass, read by every later pass.
#[derive(Clone, Debug)]
pub struct TypeContext {
    allowed: FxHashSet<String>,
    adt_holds_dynamic: FxHashMap<String, bool>,
}

impl TypeContext {
    /// A context with only the fundamental types registered.
    pub fn fundamentals() -> Self {
        Self {
            allowed: FUNDAMENTAL_TYPES.iter().map(|s| s.to_string()).collect(),
            adt_holds_dynamic: FxHashMap::default(),
        }
    }

    pub fn is_allowed(&self, type_name: &str) -> bool {
        self.allowed.contains(type_name)
    }

    pub fn is_adt(&self, type_name: &str) -> bool {
        self.adt_holds_dynamic.contains_key(type_name)
    }

    pub fn adt_holds_dynamic(&self, type_name: &str) -> bool {
        self.adt_holds_dynamic.get(type_name).copied().unwrap_or(false)
    }

    pub fn register_adt(&mut self, name: &str, holds_dynamic: bool) {
        self.allowed.insert(name.to_owned());
        self.adt_holds_dynamic.insert(name.to_owned(), holds_dynamic);
    }

    /// Names of all registered ADTs.
    pub fn adt_names(&self) -> impl Iterator<Item = &str> {
        self.adt_holds_dynamic.keys().map(String::as_str)
    }
}

/// Process then check a variable list.
///
/// `allow_dynamic_arrays` is true for agent memory and ADT members, false
/// for message payloads and environment constants.
pub fn process_and_validate(
    variables: &mut [Variable],
    ctx: &TypeContext,
    allow_dynamic_arrays: bool,
    report: &mut ValidationReport,
) {
    for variable in variables.iter_mut() {
        process_variable(variable, ctx, report);
    }
    for (i, variable) in variables.iter().enumerate() {
        check_name(variable, i, variables, report);
        check_type(variable, ctx, allow_dynamic_arrays, report);
    }
}

// ── Processing ────────────────────────────────────────────────────────────────

fn process_variable(variable: &mut Variable, ctx: &TypeContext, report: &mut ValidationReport) {
    process_dynamic_array(variable);
    process_static_array(variable, report);

    if ctx.is_adt(&variable.type_name) {
        variable.has_adt_type = true;
        if ctx.adt_holds_dynamic(&variable.type_name) {
            variable.holds_dynamic_array = true;
        }
    }

    if let Some(constant) = &variable.constant_str {
        match constant.as_str() {
            "true" => variable.is_constant = true,
            "false" => variable.is_constant = false,
            other => report.push(ValidationError::InvalidConstant {
                variable: variable.name.clone(),
                value: other.to_owned(),
            }),
        }
    }
}

/// Strip a trailing `_array` from the type and flag the dynamic array.
fn process_dynamic_array(variable: &mut Variable) {
    if let Some(base) = variable.type_name.strip_suffix("_array") {
        if !base.is_empty() {
            variable.type_name = base.to_owned();
            variable.is_dynamic_array = true;
            variable.holds_dynamic_array = true;
        }
    }
}

/// Strip a trailing `[N]` from the name and record the static size.
/// The close bracket must be the final character; anything else is left for
/// the name check to reject.
fn process_static_array(variable: &mut Variable, report: &mut ValidationReport) {
    let Some(open) = variable.name.find('[') else { return };
    if !variable.name.ends_with(']') {
        return;
    }
    let size_str = &variable.name[open + 1..variable.name.len() - 1];
    match size_str.parse::<i64>() {
        Ok(size) if size >= 1 => {
            variable.is_static_array = true;
            variable.static_array_size = size as u32;
        }
        Ok(size) => report.push(ValidationError::InvalidArraySize {
            variable: variable.name.clone(),
            value: size.to_string(),
        }),
        Err(_) => report.push(ValidationError::InvalidArraySize {
            variable: variable.name.clone(),
            value: size_str.to_owned(),
        }),
    }
    variable.name.truncate(open);
}

// ── Checks ────────────────────────────────────────────────────────────────────

fn check_name(
    variable: &Variable,
    index: usize,
    variables: &[Variable],
    report: &mut ValidationReport,
) {
    if !xm_core::name_is_allowed(&variable.name) {
        report.push(ValidationError::InvalidName {
            kind: "variable",
            name: variable.name.clone(),
        });
    }
    let duplicated = variables
        .iter()
        .enumerate()
        .any(|(j, other)| j != index && other.name == variable.name);
    if duplicated && variables[..index].iter().all(|v| v.name != variable.name) {
        // Report each duplicated name once, at its first occurrence.
        report.push(ValidationError::DuplicateName {
            kind: "variable",
            name: variable.name.clone(),
        });
    }
}

fn check_type(
    variable: &Variable,
    ctx: &TypeContext,
    allow_dynamic_arrays: bool,
    report: &mut ValidationReport,
) {
    if !ctx.is_allowed(&variable.type_name) {
        report.push(ValidationError::InvalidType {
            variable: variable.name.clone(),
            type_name: variable.type_name.clone(),
        });
    }

    if !allow_dynamic_arrays && variable.holds_dynamic_array {
        report.push(ValidationError::DynamicArrayNotAllowed {
            variable: variable.name.clone(),
            type_name: variable.type_name.clone(),
            position: if variable.is_dynamic_array {
                "declared directly"
            } else {
                "held via data type"
            },
        });
    }
}

// ── Data types ────────────────────────────────────────────────────────────────

/// Validate one ADT and register it into `ctx` when its name is usable.
pub fn validate_adt(adt: &mut DataType, ctx: &mut TypeContext, report: &mut ValidationReport) {
    let mut name_ok = true;
    if !xm_core::name_is_allowed(&adt.name) {
        report.push(ValidationError::InvalidName {
            kind: "data type",
            name: adt.name.clone(),
        });
        name_ok = false;
    }
    if ctx.is_allowed(&adt.name) {
        report.push(ValidationError::DuplicateName {
            kind: "data type",
            name: adt.name.clone(),
        });
        name_ok = false;
    }
    if !name_ok {
        return;
    }

    process_and_validate(&mut adt.variables, ctx, true, report);
    adt.holds_dynamic_array = adt.variables.iter().any(|v| v.holds_dynamic_array);
    ctx.register_adt(&adt.name, adt.holds_dynamic_array);
}
