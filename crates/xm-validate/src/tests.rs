//! Unit tests for xm-validate.

use xm_model::{
    Agent, ConditionDef, DataType, Function, IOput, Message, Model, TimeUnit, Variable,
};

use crate::report::ValidationError;
use crate::{validate, MemoryAccessPolicy, ValidationOptions};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn opts() -> ValidationOptions {
    ValidationOptions::default()
}

/// A small but complete model: one agent posting and reading a message.
fn valid_model() -> Model {
    let mut model = Model::new("circles");
    model.add_message(Message::new(
        "location",
        vec![Variable::new("double", "px"), Variable::new("double", "py")],
    ));
    model.add_agent(
        Agent::new("Circle")
            .with_variable(Variable::new("double", "x"))
            .with_variable(Variable::new("double", "y"))
            .with_function(
                Function::new("outputdata", "start", "s1")
                    .with_memory_access(&["x", "y"], &[])
                    .with_output(IOput::new("location")),
            )
            .with_function(
                Function::new("inputdata", "s1", "s2")
                    .with_memory_access(&[], &["x", "y"])
                    .with_input(IOput::new("location")),
            ),
    );
    model
}

fn values(lhs: &str, op: &str, rhs: &str) -> ConditionDef {
    ConditionDef::Values {
        lhs: lhs.to_owned(),
        op: op.to_owned(),
        rhs: rhs.to_owned(),
    }
}

// ── Whole-model validation ────────────────────────────────────────────────────

#[cfg(test)]
mod pipeline {
    use super::*;

    #[test]
    fn valid_model_passes_and_is_marked() {
        let validated = validate(valid_model(), &opts()).unwrap();
        assert!(validated.model.is_validated());
        assert_eq!(validated.state_graphs.len(), 1);
    }

    #[test]
    fn revalidation_is_a_no_op() {
        let once = validate(valid_model(), &opts()).unwrap();
        let twice = validate(once.model, &opts()).unwrap();
        assert!(twice.model.is_validated());
    }

    #[test]
    fn errors_accumulate_across_passes() {
        let mut model = valid_model();
        model.add_function_file("funcs.c"); // wrong extension
        model.add_time_unit(TimeUnit::new("day", "fortnight", "x")); // two faults
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.len() >= 3, "got only {report}");
    }

    #[test]
    fn report_display_counts_errors() {
        let mut model = valid_model();
        model.add_function_file("funcs.c");
        let report = validate(model, &opts()).unwrap_err();
        let text = report.to_string();
        assert!(text.contains("funcs.c"));
        assert!(text.ends_with("1 error found."));
    }

    #[test]
    fn duplicate_agent_names_rejected() {
        let mut model = valid_model();
        let dup = model.agents[0].clone();
        model.add_agent(dup);
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::DuplicateName { kind: "agent", name } if name == "Circle"
        )));
    }

    #[test]
    fn included_model_extension_and_duplicates_checked() {
        let mut model = valid_model();
        model.add_included_model("sub/other.xml");
        model.add_included_model("sub/other.xml");
        model.add_included_model("sub/third.txt");
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::IncludedModelProblem { reason, .. }
                if reason.contains("more than once")
        )));
        assert!(report.any(|e| matches!(
            e,
            ValidationError::IncludedModelProblem { path, .. } if path.contains("third")
        )));
    }

    #[test]
    fn function_files_must_be_cpp() {
        let mut model = valid_model();
        model.add_function_file("agent_functions.cpp");
        let validated = validate(model, &opts());
        assert!(validated.is_ok());
    }
}

// ── Variables and data types ──────────────────────────────────────────────────

#[cfg(test)]
mod variables {
    use super::*;

    #[test]
    fn array_suffix_stripped_and_flagged() {
        let mut model = valid_model();
        model.agents[0].variables.push(Variable::new("int_array", "neighbours"));
        let validated = validate(model, &opts()).unwrap();
        let var = &validated.model.agents[0].variables[2];
        assert_eq!(var.type_name, "int");
        assert!(var.is_dynamic_array);
        assert!(var.holds_dynamic_array);
    }

    #[test]
    fn static_array_size_parsed() {
        let mut model = valid_model();
        model.agents[0].variables.push(Variable::new("int", "grid[16]"));
        let validated = validate(model, &opts()).unwrap();
        let var = &validated.model.agents[0].variables[2];
        assert_eq!(var.name, "grid");
        assert!(var.is_static_array);
        assert_eq!(var.static_array_size, 16);
    }

    #[test]
    fn zero_static_array_rejected() {
        let mut model = valid_model();
        model.agents[0].variables.push(Variable::new("int", "grid[0]"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(e, ValidationError::InvalidArraySize { .. })));
    }

    #[test]
    fn non_integer_static_array_rejected() {
        let mut model = valid_model();
        model.agents[0].variables.push(Variable::new("int", "grid[many]"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidArraySize { value, .. } if value == "many"
        )));
    }

    #[test]
    fn unknown_type_rejected() {
        let mut model = valid_model();
        model.agents[0].variables.push(Variable::new("quaternion", "q"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidType { type_name, .. } if type_name == "quaternion"
        )));
    }

    #[test]
    fn bad_constant_rejected() {
        let mut model = valid_model();
        model.add_constant(Variable::with_constant("int", "max_agents", "yes"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(e, ValidationError::InvalidConstant { .. })));
    }

    #[test]
    fn message_variables_forbid_dynamic_arrays() {
        let mut model = valid_model();
        model.messages[0].variables.push(Variable::new("double_array", "trail"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::DynamicArrayNotAllowed { position: "declared directly", .. }
        )));
    }

    #[test]
    fn adt_registered_and_usable() {
        let mut model = valid_model();
        model.add_data_type(DataType::adt(
            "position",
            vec![Variable::new("double", "px"), Variable::new("double", "py")],
        ));
        model.agents[0].variables.push(Variable::new("position", "home"));
        let validated = validate(model, &opts()).unwrap();
        let var = &validated.model.agents[0].variables[2];
        assert!(var.has_adt_type);
        assert!(!var.holds_dynamic_array);
    }

    #[test]
    fn adt_holding_dynamic_array_propagates() {
        let mut model = valid_model();
        model.add_data_type(DataType::adt(
            "path",
            vec![Variable::new("double_array", "points")],
        ));
        // A message variable of that ADT must be rejected.
        model.messages[0].variables.push(Variable::new("path", "route"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::DynamicArrayNotAllowed { position: "held via data type", .. }
        )));
    }

    #[test]
    fn adt_clashing_with_fundamental_rejected() {
        let mut model = valid_model();
        model.add_data_type(DataType::adt("int", vec![]));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::DuplicateName { kind: "data type", name } if name == "int"
        )));
    }

    #[test]
    fn duplicate_variable_names_rejected() {
        let mut model = valid_model();
        model.agents[0].variables.push(Variable::new("int", "x"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::DuplicateName { kind: "variable", name } if name == "x"
        )));
    }
}

// ── Time units ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod time_units {
    use super::*;

    #[test]
    fn chain_to_iteration_accepted() {
        let mut model = valid_model();
        model.add_time_unit(TimeUnit::new("day", "iteration", "24"));
        model.add_time_unit(TimeUnit::new("week", "day", "7"));
        let validated = validate(model, &opts()).unwrap();
        assert_eq!(validated.model.time_units[0].period, 24);
        assert_eq!(validated.model.time_units[1].period, 7);
    }

    #[test]
    fn period_below_one_rejected() {
        let mut model = valid_model();
        model.add_time_unit(TimeUnit::new("day", "iteration", "0"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(e, ValidationError::InvalidTimeUnit { .. })));
    }

    #[test]
    fn reserved_name_rejected() {
        let mut model = valid_model();
        model.add_time_unit(TimeUnit::new("iteration", "iteration", "1"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidTimeUnit { reason, .. }
                if reason.contains("cannot be 'iteration'")
        )));
    }

    #[test]
    fn unknown_unit_rejected() {
        let mut model = valid_model();
        model.add_time_unit(TimeUnit::new("day", "fortnight", "2"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidTimeUnit { reason, .. } if reason.contains("fortnight")
        )));
    }

    #[test]
    fn exact_duplicate_dropped_silently() {
        let mut model = valid_model();
        model.add_time_unit(TimeUnit::new("day", "iteration", "24"));
        model.add_time_unit(TimeUnit::new("day", "iteration", "24"));
        let validated = validate(model, &opts()).unwrap();
        assert_eq!(validated.model.time_units.len(), 1);
    }

    #[test]
    fn conflicting_duplicate_rejected() {
        let mut model = valid_model();
        model.add_time_unit(TimeUnit::new("day", "iteration", "24"));
        model.add_time_unit(TimeUnit::new("day", "iteration", "12"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::DuplicateName { kind: "time unit", .. }
        )));
    }

    #[test]
    fn recursive_unit_chain_rejected() {
        let mut model = valid_model();
        model.add_time_unit(TimeUnit::new("day", "week", "1"));
        model.add_time_unit(TimeUnit::new("week", "day", "7"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidTimeUnit { reason, .. } if reason.contains("recursive")
        )));
    }
}

// ── Conditions ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod conditions {
    use super::*;

    fn model_with_guard(def: ConditionDef) -> Model {
        let mut model = valid_model();
        // Branch s1 two ways so the guard is structurally required.
        model.agents[0].functions[1].condition_def = Some(def.clone());
        model.agents[0].functions.push(
            Function::new("idle", "s1", "s3")
                .with_memory_access(&[], &[])
                .with_condition(ConditionDef::Not(Box::new(def))),
        );
        model
    }

    #[test]
    fn agent_variable_binds_and_is_recorded() {
        let model = model_with_guard(values("a.x", "LT", "10"));
        let validated = validate(model, &opts()).unwrap();
        let condition = validated.model.agents[0].functions[1].condition.as_ref().unwrap();
        assert!(condition.read_only_vars.contains("x"));
    }

    #[test]
    fn unknown_agent_variable_rejected() {
        let model = model_with_guard(values("a.z", "LT", "10"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidCondition { reason, .. } if reason.contains("'z'")
        )));
    }

    #[test]
    fn unknown_operator_rejected() {
        let model = model_with_guard(values("a.x", "APPROX", "10"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidCondition { reason, .. } if reason.contains("APPROX")
        )));
    }

    #[test]
    fn uncastable_literal_rejected() {
        let model = model_with_guard(values("a.x", "LT", "ten"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidCondition { reason, .. } if reason.contains("'ten'")
        )));
    }

    #[test]
    fn message_variable_outside_filter_rejected() {
        // Guards have no message scope, so `m.` cannot bind.
        let model = model_with_guard(values("m.px", "LT", "10"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidCondition { reason, .. }
                if reason.contains("message type is invalid")
        )));
    }

    #[test]
    fn nested_condition_collects_reads_from_both_sides() {
        let def = ConditionDef::Nested {
            lhs: Box::new(values("a.x", "GT", "0")),
            op: "AND".to_owned(),
            rhs: Box::new(values("a.y", "LT", "100")),
        };
        let validated = validate(model_with_guard(def), &opts()).unwrap();
        let condition = validated.model.agents[0].functions[1].condition.as_ref().unwrap();
        assert!(condition.read_only_vars.contains("x"));
        assert!(condition.read_only_vars.contains("y"));
    }

    #[test]
    fn time_condition_checks_period_and_binds_phase() {
        let mut model = valid_model();
        model.add_time_unit(TimeUnit::new("day", "iteration", "24"));
        let def = ConditionDef::Time {
            period: "day".to_owned(),
            phase: "a.x".to_owned(),
            duration: Some("3".to_owned()),
        };
        model.agents[0].functions[1].condition_def = Some(def.clone());
        model.agents[0].functions.push(
            Function::new("idle", "s1", "s3")
                .with_memory_access(&[], &[])
                .with_condition(ConditionDef::Not(Box::new(def))),
        );
        let validated = validate(model, &opts()).unwrap();
        let condition = validated.model.agents[0].functions[1].condition.as_ref().unwrap();
        assert!(condition.read_only_vars.contains("x"));
    }

    #[test]
    fn time_condition_with_unknown_period_rejected() {
        let def = ConditionDef::Time {
            period: "epoch".to_owned(),
            phase: "0".to_owned(),
            duration: None,
        };
        let report = validate(model_with_guard(def), &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidCondition { reason, .. } if reason.contains("epoch")
        )));
    }

    #[test]
    fn filter_binds_message_variables() {
        let mut model = valid_model();
        model.agents[0].functions[1].inputs[0] = IOput::new("location")
            .with_filter(values("m.px", "GT", "a.x"));
        let validated = validate(model, &opts()).unwrap();
        let input = &validated.model.agents[0].functions[1].inputs[0];
        let filter = input.filter.as_ref().unwrap();
        assert!(filter.read_only_vars.contains("x"));
    }
}

// ── Memory access ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod memory_access {
    use super::*;

    fn model_without_access_info() -> Model {
        let mut model = valid_model();
        let f = &mut model.agents[0].functions[0];
        f.read_only_vars.clear();
        f.memory_access_info_available = false;
        model
    }

    #[test]
    fn lenient_promotes_all_memory_to_read_write() {
        let validated = validate(model_without_access_info(), &opts()).unwrap();
        let f = &validated.model.agents[0].functions[0];
        assert!(f.read_write_vars.contains("x"));
        assert!(f.read_write_vars.contains("y"));
    }

    #[test]
    fn strict_rejects_undeclared_functions() {
        let report = validate(
            model_without_access_info(),
            &ValidationOptions::strict_memory_access(),
        )
        .unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::MemoryAccessViolation { function, .. } if function == "outputdata"
        )));
    }

    #[test]
    fn strict_accepts_declared_functions() {
        assert!(validate(valid_model(), &ValidationOptions::strict_memory_access()).is_ok());
        assert_eq!(
            ValidationOptions::strict_memory_access().memory_access,
            MemoryAccessPolicy::Strict
        );
    }

    #[test]
    fn unknown_access_variable_rejected() {
        let mut model = valid_model();
        model.agents[0].functions[0].read_only_vars.insert("ghost".to_owned());
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::MemoryAccessViolation { reason, .. } if reason.contains("ghost")
        )));
    }

    #[test]
    fn variable_in_both_sets_rejected() {
        let mut model = valid_model();
        model.agents[0].functions[0].read_write_vars.insert("x".to_owned());
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::MemoryAccessViolation { reason, .. }
                if reason.contains("more than once")
        )));
    }
}

// ── Communication ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod ioputs {
    use super::*;

    #[test]
    fn unknown_message_rejected() {
        let mut model = valid_model();
        model.agents[0].functions[0].outputs.push(IOput::new("velocity"));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidIOput { message, .. } if message == "velocity"
        )));
    }

    #[test]
    fn sort_key_must_be_message_variable() {
        let mut model = valid_model();
        model.agents[0].functions[1].inputs[0] =
            IOput::new("location").with_sort("altitude", "ascend");
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidIOput { reason, .. } if reason.contains("altitude")
        )));
    }

    #[test]
    fn sort_order_must_be_ascend_or_descend() {
        let mut model = valid_model();
        model.agents[0].functions[1].inputs[0] =
            IOput::new("location").with_sort("px", "shuffled");
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidIOput { reason, .. } if reason.contains("shuffled")
        )));
    }

    #[test]
    fn sorted_and_random_together_rejected() {
        let mut model = valid_model();
        model.agents[0].functions[1].inputs[0] = IOput::new("location")
            .with_sort("px", "ascend")
            .with_random("true");
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidIOput { reason, .. } if reason.contains("sorted and random")
        )));
    }

    #[test]
    fn malformed_random_rejected() {
        let mut model = valid_model();
        model.agents[0].functions[1].inputs[0] =
            IOput::new("location").with_random("maybe");
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::InvalidIOput { reason, .. } if reason.contains("maybe")
        )));
    }

    #[test]
    fn random_false_with_sort_accepted() {
        let mut model = valid_model();
        model.agents[0].functions[1].inputs[0] = IOput::new("location")
            .with_sort("px", "descend")
            .with_random("false");
        assert!(validate(model, &opts()).is_ok());
    }
}

// ── State machine faults ──────────────────────────────────────────────────────

#[cfg(test)]
mod state_machine {
    use super::*;
    use xm_graph::GraphError;

    #[test]
    fn missing_start_state_reported() {
        let mut model = Model::new("m");
        model.add_agent(
            Agent::new("Looper")
                .with_function(Function::new("f0", "s0", "s1").with_memory_access(&[], &[]))
                .with_function(Function::new("f1", "s1", "s0").with_memory_access(&[], &[])),
        );
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::Graph(GraphError::NoStartState { agent }) if agent == "Looper"
        )));
    }

    #[test]
    fn unconditional_branch_reported() {
        let mut model = Model::new("m");
        model.add_agent(
            Agent::new("Brancher")
                .with_variable(Variable::new("int", "n"))
                .with_function(
                    Function::new("f_left", "s0", "s1")
                        .with_memory_access(&["n"], &[])
                        .with_condition(values("a.n", "GT", "0")),
                )
                .with_function(
                    Function::new("f_right", "s0", "s2").with_memory_access(&["n"], &[]),
                ),
        );
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::Graph(GraphError::UnconditionalBranch { function, .. })
                if function == "f_right"
        )));
    }

    #[test]
    fn cyclic_state_graph_reported() {
        let mut model = Model::new("m");
        model.add_agent(
            Agent::new("Cycler")
                .with_function(Function::new("enter", "s0", "s1").with_memory_access(&[], &[]))
                .with_function(Function::new("fwd", "s1", "s2").with_memory_access(&[], &[]))
                .with_function(Function::new("back", "s2", "s1").with_memory_access(&[], &[])),
        );
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::Graph(GraphError::CyclicStateGraph { agent, .. })
                if agent == "Cycler"
        )));
    }

    #[test]
    fn cross_agent_message_cycle_reported() {
        let mut model = Model::new("m");
        model.add_message(Message::new("m1", vec![]));
        model.add_message(Message::new("m2", vec![]));
        model.add_agent(Agent::new("A").with_function(
            Function::new("fa", "s0", "s1")
                .with_memory_access(&[], &[])
                .with_input(IOput::new("m2"))
                .with_output(IOput::new("m1")),
        ));
        model.add_agent(Agent::new("B").with_function(
            Function::new("fb", "s0", "s1")
                .with_memory_access(&[], &[])
                .with_input(IOput::new("m1"))
                .with_output(IOput::new("m2")),
        ));
        let report = validate(model, &opts()).unwrap_err();
        assert!(report.any(|e| matches!(
            e,
            ValidationError::Graph(GraphError::CyclicModelGraph { .. })
        )));
    }
}
