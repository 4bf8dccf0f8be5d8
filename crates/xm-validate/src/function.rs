//! Transition-function validation: memory access, names, guard conditions
//! and message communication.

use rustc_hash::FxHashSet;
use tracing::warn;
use xm_model::{Function, IOput, Message, TimeUnit, Variable};

use crate::condition::{lower, ConditionScope};
use crate::options::MemoryAccessPolicy;
use crate::report::{ValidationError, ValidationReport};

/// Everything a function is validated against.
pub struct FunctionScope<'a> {
    pub agent_name: &'a str,
    pub agent_vars: &'a [Variable],
    pub messages: &'a [Message],
    pub time_units: &'a [TimeUnit],
    pub policy: MemoryAccessPolicy,
}

/// Validate one function in place: resolve its memory access, check its
/// names, lower its guard, and bind its inputs and outputs.
pub fn validate_function(
    function: &mut Function,
    scope: &FunctionScope<'_>,
    report: &mut ValidationReport,
) {
    resolve_memory_access(function, scope, report);

    if !xm_core::name_is_allowed(&function.name) {
        report.push(ValidationError::InvalidName {
            kind: "function",
            name: function.name.clone(),
        });
    }
    for state in [&function.current_state, &function.next_state] {
        if !xm_core::name_is_allowed(state) {
            report.push(ValidationError::InvalidName {
                kind: "state",
                name: state.clone(),
            });
        }
    }

    lower_guard(function, scope, report);

    let function_name = function.name.clone();
    let inputs = std::mem::take(&mut function.inputs);
    let outputs = std::mem::take(&mut function.outputs);
    function.inputs = inputs
        .into_iter()
        .map(|io| validate_ioput(io, &function_name, scope, report))
        .collect();
    function.outputs = outputs
        .into_iter()
        .map(|io| validate_ioput(io, &function_name, scope, report))
        .collect();
}

// ── Memory access ─────────────────────────────────────────────────────────────

/// When a function declares no memory access, the lenient policy promotes
/// every agent variable to read-write — safe, but it serialises the function
/// against the whole agent, so it is worth a warning.  The strict policy
/// rejects the function outright.
fn resolve_memory_access(
    function: &mut Function,
    scope: &FunctionScope<'_>,
    report: &mut ValidationReport,
) {
    if !function.memory_access_info_available {
        match scope.policy {
            MemoryAccessPolicy::Lenient => {
                warn!(
                    agent = scope.agent_name,
                    function = %function.name,
                    "no memory access declared; promoting all agent memory to read-write"
                );
                function.read_write_vars =
                    scope.agent_vars.iter().map(|v| v.name.clone()).collect();
            }
            MemoryAccessPolicy::Strict => {
                report.push(ValidationError::MemoryAccessViolation {
                    agent: scope.agent_name.to_owned(),
                    function: function.name.clone(),
                    reason: "no memory access declared (strict policy)".to_owned(),
                });
            }
        }
        return;
    }

    let mut used: FxHashSet<&str> = FxHashSet::default();
    for name in function.read_only_vars.iter().chain(&function.read_write_vars) {
        if !scope.agent_vars.iter().any(|v| v.name == *name) {
            report.push(ValidationError::MemoryAccessViolation {
                agent: scope.agent_name.to_owned(),
                function: function.name.clone(),
                reason: format!("variable '{name}' is not in agent memory"),
            });
        }
        if !used.insert(name.as_str()) {
            report.push(ValidationError::MemoryAccessViolation {
                agent: scope.agent_name.to_owned(),
                function: function.name.clone(),
                reason: format!("variable '{name}' mentioned more than once"),
            });
        }
    }
}

// ── Guard condition ───────────────────────────────────────────────────────────

/// Lower the raw guard, keeping the def in place on failure so downstream
/// branch checks still see a guarded transition.
fn lower_guard(function: &mut Function, scope: &FunctionScope<'_>, report: &mut ValidationReport) {
    let Some(def) = function.condition_def.clone() else { return };
    let cond_scope = ConditionScope {
        context: format!(
            "function '{}' of agent '{}'",
            function.name, scope.agent_name
        ),
        agent_vars: scope.agent_vars,
        message: None,
        time_units: scope.time_units,
    };
    if let Some(condition) = lower(&def, &cond_scope, report) {
        function.condition = Some(condition);
        function.condition_def = None;
    }
}

// ── Communication ─────────────────────────────────────────────────────────────

fn validate_ioput(
    mut ioput: IOput,
    function_name: &str,
    scope: &FunctionScope<'_>,
    report: &mut ValidationReport,
) -> IOput {
    let message = scope.messages.iter().find(|m| m.name == ioput.message_name);
    if message.is_none() {
        report.push(ValidationError::InvalidIOput {
            message: ioput.message_name.clone(),
            reason: "message name is not valid".to_owned(),
        });
    }

    if let Some(def) = ioput.filter_def.clone() {
        let cond_scope = ConditionScope {
            context: format!(
                "filter of message '{}' in function '{}' of agent '{}'",
                ioput.message_name, function_name, scope.agent_name
            ),
            agent_vars: scope.agent_vars,
            message,
            time_units: scope.time_units,
        };
        if let Some(filter) = lower(&def, &cond_scope, report) {
            ioput.filter = Some(filter);
            ioput.filter_def = None;
        }
    }

    if let Some(sort) = &ioput.sort {
        match message {
            Some(message) if !message.has_variable(&sort.key) => {
                report.push(ValidationError::InvalidIOput {
                    message: ioput.message_name.clone(),
                    reason: format!("sort key is not a valid message variable: '{}'", sort.key),
                });
            }
            None => {
                report.push(ValidationError::InvalidIOput {
                    message: ioput.message_name.clone(),
                    reason: format!(
                        "cannot validate sort key '{}' as the message type is invalid",
                        sort.key
                    ),
                });
            }
            _ => {}
        }
        if sort.order != "ascend" && sort.order != "descend" {
            report.push(ValidationError::InvalidIOput {
                message: ioput.message_name.clone(),
                reason: format!("sort order is not 'ascend' or 'descend': '{}'", sort.order),
            });
        }
    }

    if let Some(random) = &ioput.random_str {
        match random.as_str() {
            "true" => ioput.random = Some(true),
            "false" => ioput.random = Some(false),
            other => report.push(ValidationError::InvalidIOput {
                message: ioput.message_name.clone(),
                reason: format!("random is not 'true' or 'false': '{other}'"),
            }),
        }
    }

    if ioput.sort.is_some() && ioput.random == Some(true) {
        report.push(ValidationError::InvalidIOput {
            message: ioput.message_name.clone(),
            reason: "input cannot be sorted and random at the same time".to_owned(),
        });
    }

    ioput
}
