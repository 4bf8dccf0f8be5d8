//! Lowering raw condition trees into resolved ones.
//!
//! Operator tokens resolve to typed operators, `a.`/`m.` operands bind
//! against agent memory and message payloads, bare operands must parse as
//! doubles, and time fields bind or parse likewise.  Every agent variable
//! bound anywhere in the tree is collected bottom-up and cached on the root.
//!
//! The def shape already forces each comparison's sides to both be operands
//! and each compound's sides to both be conditions, so the "mixed sides"
//! fault of free-form documents cannot reach this code.

use std::collections::BTreeSet;

use xm_model::{
    Comparison, Condition, ConditionDef, ConditionExpr, Logical, Message, Operand, TimePhase,
    TimeUnit, Variable,
};

use crate::report::{ValidationError, ValidationReport};

/// What names a condition may bind against, plus a human-readable location
/// for diagnostics.
pub struct ConditionScope<'a> {
    /// E.g. `"function 'f' of agent 'A'"`.
    pub context: String,
    pub agent_vars: &'a [Variable],
    /// Present when lowering a message filter; `m.` operands need it.
    pub message: Option<&'a Message>,
    pub time_units: &'a [TimeUnit],
}

impl ConditionScope<'_> {
    fn error(&self, reason: impl Into<String>) -> ValidationError {
        ValidationError::InvalidCondition {
            context: self.context.clone(),
            reason: reason.into(),
        }
    }

    fn has_agent_var(&self, name: &str) -> bool {
        self.agent_vars.iter().any(|v| v.name == name)
    }
}

/// Lower `def`, accumulating diagnostics.  Returns `None` when anything in
/// the tree failed; all faults are still reported.
pub fn lower(
    def: &ConditionDef,
    scope: &ConditionScope<'_>,
    report: &mut ValidationReport,
) -> Option<Condition> {
    let mut reads = BTreeSet::new();
    let expr = lower_expr(def, scope, &mut reads, report)?;
    Some(Condition { expr, read_only_vars: reads })
}

fn lower_expr(
    def: &ConditionDef,
    scope: &ConditionScope<'_>,
    reads: &mut BTreeSet<String>,
    report: &mut ValidationReport,
) -> Option<ConditionExpr> {
    match def {
        ConditionDef::Not(inner) => {
            let inner = lower_expr(inner, scope, reads, report)?;
            Some(ConditionExpr::Not(Box::new(inner)))
        }

        ConditionDef::Values { lhs, op, rhs } => {
            let lhs = lower_operand(lhs, scope, reads, report);
            let rhs = lower_operand(rhs, scope, reads, report);
            let op = match Comparison::from_symbol(op) {
                Some(op) => Some(op),
                None => {
                    report.push(scope.error(format!("op value not recognised: '{op}'")));
                    None
                }
            };
            Some(ConditionExpr::Values { lhs: lhs?, op: op?, rhs: rhs? })
        }

        ConditionDef::Nested { lhs, op, rhs } => {
            let lhs = lower_expr(lhs, scope, reads, report);
            let rhs = lower_expr(rhs, scope, reads, report);
            let op = match Logical::from_symbol(op) {
                Some(op) => Some(op),
                None => {
                    report.push(scope.error(format!("op value not recognised: '{op}'")));
                    None
                }
            };
            Some(ConditionExpr::Compound {
                lhs: Box::new(lhs?),
                op: op?,
                rhs: Box::new(rhs?),
            })
        }

        ConditionDef::Time { period, phase, duration } => {
            lower_time(period, phase, duration.as_deref(), scope, reads, report)
        }
    }
}

fn lower_operand(
    raw: &str,
    scope: &ConditionScope<'_>,
    reads: &mut BTreeSet<String>,
    report: &mut ValidationReport,
) -> Option<Operand> {
    if let Some(name) = raw.strip_prefix("a.") {
        if !scope.has_agent_var(name) {
            report.push(scope.error(format!("value is not a valid agent variable: '{name}'")));
            return None;
        }
        reads.insert(name.to_owned());
        return Some(Operand::AgentVar(name.to_owned()));
    }

    if let Some(name) = raw.strip_prefix("m.") {
        let Some(message) = scope.message else {
            report.push(scope.error(format!(
                "cannot validate value '{name}' as the message type is invalid"
            )));
            return None;
        };
        if !message.has_variable(name) {
            report.push(scope.error(format!("value is not a valid message variable: '{name}'")));
            return None;
        }
        return Some(Operand::MessageVar(name.to_owned()));
    }

    match raw.parse::<f64>() {
        Ok(value) => Some(Operand::Literal(value)),
        Err(_) => {
            report.push(scope.error(format!("value not variable or number: '{raw}'")));
            None
        }
    }
}

fn lower_time(
    period: &str,
    phase: &str,
    duration: Option<&str>,
    scope: &ConditionScope<'_>,
    reads: &mut BTreeSet<String>,
    report: &mut ValidationReport,
) -> Option<ConditionExpr> {
    let mut ok = true;

    if !scope.time_units.iter().any(|t| t.name == period) {
        report.push(scope.error(format!("time period is not a valid time unit: '{period}'")));
        ok = false;
    }

    let phase = if let Some(name) = phase.strip_prefix("a.") {
        if scope.has_agent_var(name) {
            reads.insert(name.to_owned());
            Some(TimePhase::AgentVar(name.to_owned()))
        } else {
            report.push(scope.error(format!(
                "time phase variable is not a valid agent variable: '{name}'"
            )));
            ok = false;
            None
        }
    } else {
        match phase.parse::<i32>() {
            Ok(value) => Some(TimePhase::Value(value)),
            Err(_) => {
                report.push(
                    scope.error(format!("time phase is not a variable or integer: '{phase}'")),
                );
                ok = false;
                None
            }
        }
    };

    let duration = match duration {
        None => None,
        Some(raw) => match raw.parse::<i32>() {
            Ok(value) => Some(value),
            Err(_) => {
                report.push(scope.error(format!("time duration is not an integer: '{raw}'")));
                ok = false;
                None
            }
        },
    };

    if !ok {
        return None;
    }
    Some(ConditionExpr::Time {
        period: period.to_owned(),
        phase: phase?,
        duration,
    })
}
