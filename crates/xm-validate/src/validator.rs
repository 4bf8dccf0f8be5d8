//! The validation pipeline.

use std::mem;
use std::path::PathBuf;

use rustc_hash::FxHashSet;
use tracing::{debug, warn};
use xm_core::ITERATION_UNIT;
use xm_graph::{DependencyGraph, ModelGraph, StateGraph};
use xm_model::{Agent, Model, StartStateResolution};

use crate::function::{validate_function, FunctionScope};
use crate::options::{MemoryAccessPolicy, ValidationOptions};
use crate::report::{ValidationError, ValidationReport};
use crate::variables::{process_and_validate, validate_adt, TypeContext};

/// A model that passed every check, plus the per-agent state graphs the
/// checks produced.  Dependency-graph construction starts from here.
#[derive(Debug)]
pub struct ValidatedModel {
    pub model: Model,
    /// One state graph per agent, in `model.agents` order.
    pub state_graphs: Vec<StateGraph>,
}

/// Run every validation pass over `model`.
///
/// Errors accumulate — the returned report lists every problem found, in
/// declaration order.  On success the model is marked validated.
pub fn validate(
    mut model: Model,
    options: &ValidationOptions,
) -> Result<ValidatedModel, ValidationReport> {
    let mut report = ValidationReport::new();

    check_included_models(&model.included_models, &mut report);
    check_function_files(&model.function_files, &mut report);

    // ── Data types ────────────────────────────────────────────────────────
    let mut ctx = TypeContext::fundamentals();
    let mut data_types = mem::take(&mut model.data_types);
    for adt in &mut data_types {
        validate_adt(adt, &mut ctx, &mut report);
    }
    model.data_types = data_types;
    let adt_names: Vec<String> = ctx.adt_names().map(str::to_owned).collect();
    for name in adt_names {
        model.register_allowed_type(name);
    }

    // ── Environment constants ─────────────────────────────────────────────
    let mut constants = mem::take(&mut model.constants);
    process_and_validate(&mut constants, &ctx, false, &mut report);
    model.constants = constants;

    // ── Time units ────────────────────────────────────────────────────────
    check_time_units(&mut model, &mut report);

    // ── Agents ────────────────────────────────────────────────────────────
    let mut agents = mem::take(&mut model.agents);
    check_duplicates(agents.iter().map(|a| a.name.as_str()), "agent", &mut report);
    let mut state_graphs = Vec::with_capacity(agents.len());
    for agent in &mut agents {
        validate_agent(
            agent,
            &ctx,
            &model,
            options.memory_access,
            &mut state_graphs,
            &mut report,
        );
    }
    model.agents = agents;

    // ── Messages ──────────────────────────────────────────────────────────
    let mut messages = mem::take(&mut model.messages);
    check_duplicates(
        messages.iter().map(|m| m.name.as_str()),
        "message",
        &mut report,
    );
    for message in &mut messages {
        if !xm_core::name_is_allowed(&message.name) {
            report.push(ValidationError::InvalidName {
                kind: "message",
                name: message.name.clone(),
            });
        }
        process_and_validate(&mut message.variables, &ctx, false, &mut report);
    }
    model.messages = messages;

    // ── Model graph ───────────────────────────────────────────────────────
    //
    // Only attempted on an otherwise clean model: missing state graphs or
    // broken memory-access sets would make the dependency analysis unsound.
    if report.is_empty() {
        let dep_graphs: Vec<DependencyGraph> = model
            .agents
            .iter()
            .zip(&state_graphs)
            .map(|(agent, sg)| DependencyGraph::build(sg, &agent.variable_names()))
            .collect();
        if let Err(error) = ModelGraph::build(&model.name, &dep_graphs) {
            report.push(error.into());
        }
    }

    if report.is_empty() {
        debug!(model = %model.name, agents = model.agents.len(), "model validated");
        model.mark_validated();
        Ok(ValidatedModel { model, state_graphs })
    } else {
        Err(report)
    }
}

// ── Environment-level passes ──────────────────────────────────────────────────

fn check_included_models(paths: &[PathBuf], report: &mut ValidationReport) {
    let mut seen: FxHashSet<&PathBuf> = FxHashSet::default();
    for path in paths {
        let extension_ok = path
            .extension()
            .is_some_and(|e| e == "xml" || e == "XML");
        if !extension_ok {
            report.push(ValidationError::IncludedModelProblem {
                path: path.display().to_string(),
                reason: "file extension is not '.xml' or '.XML'".to_owned(),
            });
        }
        if !seen.insert(path) {
            report.push(ValidationError::IncludedModelProblem {
                path: path.display().to_string(),
                reason: "included more than once".to_owned(),
            });
        }
    }
}

fn check_function_files(paths: &[String], report: &mut ValidationReport) {
    for path in paths {
        if !path.ends_with(".cpp") {
            report.push(ValidationError::InvalidFunctionFile { path: path.clone() });
        }
    }
}

fn check_time_units(model: &mut Model, report: &mut ValidationReport) {
    let mut units = mem::take(&mut model.time_units);
    let names: Vec<String> = units.iter().map(|t| t.name.clone()).collect();

    for (i, unit) in units.iter_mut().enumerate() {
        // Period must parse and be at least one iteration.
        match unit.period_str.parse::<i32>() {
            Ok(period) if period >= 1 => unit.period = period,
            Ok(period) => report.push(ValidationError::InvalidTimeUnit {
                name: unit.name.clone(),
                reason: format!("period value is not valid: '{period}'"),
            }),
            Err(_) => report.push(ValidationError::InvalidTimeUnit {
                name: unit.name.clone(),
                reason: format!("period is not an integer: '{}'", unit.period_str),
            }),
        }

        // Unit must be the base unit or another declared time unit.
        let unit_ok = unit.unit == ITERATION_UNIT
            || names
                .iter()
                .enumerate()
                .any(|(j, n)| j != i && *n == unit.unit);
        if !unit_ok {
            report.push(ValidationError::InvalidTimeUnit {
                name: unit.name.clone(),
                reason: format!("unit is not valid: '{}'", unit.unit),
            });
        }

        if !xm_core::name_is_allowed(&unit.name) {
            report.push(ValidationError::InvalidName {
                kind: "time unit",
                name: unit.name.clone(),
            });
        }
        if unit.name == ITERATION_UNIT {
            report.push(ValidationError::InvalidTimeUnit {
                name: unit.name.clone(),
                reason: "name cannot be 'iteration'".to_owned(),
            });
        }
    }

    // Name collisions: an exact duplicate (same unit and period) is dropped
    // with a warning; a redefinition is an error.
    let mut kept: Vec<xm_model::TimeUnit> = Vec::with_capacity(units.len());
    for unit in units {
        let same_definition = kept
            .iter()
            .find(|k| k.name == unit.name)
            .map(|k| k.unit == unit.unit && k.period == unit.period);
        match same_definition {
            None => kept.push(unit),
            Some(true) => warn!(name = %unit.name, "dropping exact duplicate time unit"),
            Some(false) => report.push(ValidationError::DuplicateName {
                kind: "time unit",
                name: unit.name.clone(),
            }),
        }
    }

    // Unit chains must ground out at the base unit without looping.
    for unit in &kept {
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut current = unit.unit.as_str();
        while current != ITERATION_UNIT {
            if !visited.insert(current) {
                report.push(ValidationError::InvalidTimeUnit {
                    name: unit.name.clone(),
                    reason: "unit chain is recursive".to_owned(),
                });
                break;
            }
            match kept.iter().find(|k| k.name == current) {
                Some(next) => current = next.unit.as_str(),
                None => break, // unresolved unit already reported above
            }
        }
    }

    model.time_units = kept;
}

// ── Agents ────────────────────────────────────────────────────────────────────

fn validate_agent(
    agent: &mut Agent,
    ctx: &TypeContext,
    model: &Model,
    policy: MemoryAccessPolicy,
    state_graphs: &mut Vec<StateGraph>,
    report: &mut ValidationReport,
) {
    if !xm_core::name_is_allowed(&agent.name) {
        report.push(ValidationError::InvalidName {
            kind: "agent",
            name: agent.name.clone(),
        });
    }

    process_and_validate(&mut agent.variables, ctx, true, report);

    let mut functions = mem::take(&mut agent.functions);
    let scope = FunctionScope {
        agent_name: &agent.name,
        agent_vars: &agent.variables,
        messages: &model.messages,
        time_units: &model.time_units,
        policy,
    };
    for function in &mut functions {
        validate_function(function, &scope, report);
    }
    agent.functions = functions;

    validate_state_machine(agent, state_graphs, report);
}

/// Derive the start/end states, build the state graph and run its checks.
fn validate_state_machine(
    agent: &mut Agent,
    state_graphs: &mut Vec<StateGraph>,
    report: &mut ValidationReport,
) {
    match agent.resolve_start_state() {
        StartStateResolution::One(state) => agent.start_state = Some(state),
        StartStateResolution::None => {
            report.push(xm_graph::GraphError::NoStartState { agent: agent.name.clone() }.into());
            return;
        }
        StartStateResolution::Multiple(states) => {
            report.push(
                xm_graph::GraphError::MultipleStartStates {
                    agent: agent.name.clone(),
                    states,
                }
                .into(),
            );
            return;
        }
    }
    agent.end_states = agent.derive_end_states();

    let state_graph = match StateGraph::build(agent) {
        Ok(graph) => graph,
        Err(error) => {
            report.push(error.into());
            return;
        }
    };
    if let Err(error) = state_graph.check_cycles() {
        report.push(error.into());
        return;
    }
    report.extend(
        state_graph
            .check_branch_conditions()
            .into_iter()
            .map(Into::into),
    );
    state_graphs.push(state_graph);
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Report each name that occurs more than once, once, at its first
/// occurrence.
fn check_duplicates<'a>(
    names: impl Iterator<Item = &'a str>,
    kind: &'static str,
    report: &mut ValidationReport,
) {
    let names: Vec<&str> = names.collect();
    let mut reported: FxHashSet<&str> = FxHashSet::default();
    for (i, name) in names.iter().enumerate() {
        if names[i + 1..].contains(name) && reported.insert(name) {
            report.push(ValidationError::DuplicateName {
                kind,
                name: (*name).to_owned(),
            });
        }
    }
}
