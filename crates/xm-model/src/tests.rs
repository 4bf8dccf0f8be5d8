//! Unit tests for xm-model.

use crate::{
    Agent, Comparison, Function, Logical, Message, Model, StartStateResolution, Variable,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn f(name: &str, from: &str, to: &str) -> Function {
    Function::new(name, from, to)
}

// ── Start / end state derivation ──────────────────────────────────────────────

#[cfg(test)]
mod states {
    use super::*;

    #[test]
    fn linear_chain_has_one_start_and_one_end() {
        let agent = Agent::new("A")
            .with_function(f("f0", "s0", "s1"))
            .with_function(f("f1", "s1", "s2"));
        assert_eq!(
            agent.resolve_start_state(),
            StartStateResolution::One("s0".to_owned())
        );
        assert_eq!(
            agent.derive_end_states().into_iter().collect::<Vec<_>>(),
            vec!["s2".to_owned()]
        );
    }

    #[test]
    fn cycle_covering_all_states_has_no_start() {
        let agent = Agent::new("A")
            .with_function(f("f0", "s0", "s1"))
            .with_function(f("f1", "s1", "s0"));
        assert_eq!(agent.resolve_start_state(), StartStateResolution::None);
        assert!(agent.derive_end_states().is_empty());
    }

    #[test]
    fn disjoint_chains_give_multiple_starts() {
        let agent = Agent::new("A")
            .with_function(f("f0", "s0", "s1"))
            .with_function(f("g0", "t0", "t1"));
        match agent.resolve_start_state() {
            StartStateResolution::Multiple(names) => {
                assert_eq!(names, vec!["s0".to_owned(), "t0".to_owned()]);
            }
            other => panic!("expected Multiple, got {other:?}"),
        }
    }

    #[test]
    fn branch_and_join_still_one_start() {
        // s0 branches to s1/s2, both rejoin at s3.
        let agent = Agent::new("A")
            .with_function(f("left", "s0", "s1"))
            .with_function(f("right", "s0", "s2"))
            .with_function(f("join_l", "s1", "s3"))
            .with_function(f("join_r", "s2", "s3"));
        assert_eq!(
            agent.resolve_start_state(),
            StartStateResolution::One("s0".to_owned())
        );
    }
}

// ── Condition operator tokens ─────────────────────────────────────────────────

#[cfg(test)]
mod operators {
    use super::*;

    #[test]
    fn comparison_tokens_resolve() {
        assert_eq!(Comparison::from_symbol("EQ"), Some(Comparison::Eq));
        assert_eq!(Comparison::from_symbol("NEQ"), Some(Comparison::Neq));
        assert_eq!(Comparison::from_symbol("LEQ"), Some(Comparison::Leq));
        assert_eq!(Comparison::from_symbol("GEQ"), Some(Comparison::Geq));
        assert_eq!(Comparison::from_symbol("LT"), Some(Comparison::Lt));
        assert_eq!(Comparison::from_symbol("GT"), Some(Comparison::Gt));
        assert_eq!(Comparison::from_symbol("=="), None);
    }

    #[test]
    fn comparison_renders_c_style() {
        assert_eq!(Comparison::Leq.as_c_op(), "<=");
        assert_eq!(Comparison::Neq.as_c_op(), "!=");
    }

    #[test]
    fn logical_tokens_resolve() {
        assert_eq!(Logical::from_symbol("AND"), Some(Logical::And));
        assert_eq!(Logical::from_symbol("OR"), Some(Logical::Or));
        assert_eq!(Logical::from_symbol("XOR"), None);
        assert_eq!(Logical::And.as_c_op(), "&&");
    }
}

// ── Condition rendering ───────────────────────────────────────────────────────

#[cfg(test)]
mod rendering {
    use std::collections::BTreeSet;

    use crate::{Condition, ConditionExpr, Logical, Operand, TimePhase};

    use super::*;

    fn values(lhs: Operand, op: Comparison, rhs: Operand) -> ConditionExpr {
        ConditionExpr::Values { lhs, op, rhs }
    }

    #[test]
    fn values_render_c_style() {
        let expr = values(
            Operand::AgentVar("x".into()),
            Comparison::Lt,
            Operand::Literal(10.0),
        );
        assert_eq!(expr.to_string(), "a.x < 10");
    }

    #[test]
    fn compound_parenthesises_both_sides() {
        let expr = ConditionExpr::Compound {
            lhs: Box::new(values(
                Operand::AgentVar("x".into()),
                Comparison::Gt,
                Operand::Literal(0.0),
            )),
            op: Logical::And,
            rhs: Box::new(values(
                Operand::MessageVar("range".into()),
                Comparison::Neq,
                Operand::Literal(1.0),
            )),
        };
        assert_eq!(expr.to_string(), "(a.x > 0) && (m.range != 1)");
    }

    #[test]
    fn not_wraps_inner() {
        let expr = ConditionExpr::Not(Box::new(values(
            Operand::AgentVar("x".into()),
            Comparison::Eq,
            Operand::Literal(0.0),
        )));
        assert_eq!(expr.to_string(), "not(a.x == 0)");
    }

    #[test]
    fn time_renders_with_and_without_duration() {
        let with = ConditionExpr::Time {
            period: "day".into(),
            phase: TimePhase::AgentVar("offset".into()),
            duration: Some(3),
        };
        assert_eq!(with.to_string(), "time(day, a.offset, 3)");

        let without = ConditionExpr::Time {
            period: "day".into(),
            phase: TimePhase::Value(4),
            duration: None,
        };
        assert_eq!(without.to_string(), "time(day, 4)");
    }

    #[test]
    fn condition_delegates_to_expr() {
        let condition = Condition {
            expr: values(
                Operand::AgentVar("x".into()),
                Comparison::Geq,
                Operand::Literal(2.5),
            ),
            read_only_vars: BTreeSet::from(["x".to_owned()]),
        };
        assert_eq!(condition.to_string(), "a.x >= 2.5");
    }
}

// ── Time unit resolution ──────────────────────────────────────────────────────

#[cfg(test)]
mod time_units {
    use crate::TimeUnit;

    use super::*;

    fn resolved(name: &str, unit: &str, period: i32) -> TimeUnit {
        let mut tu = TimeUnit::new(name, unit, period.to_string());
        tu.period = period;
        tu
    }

    #[test]
    fn base_unit_is_one_iteration() {
        let m = Model::new("m");
        assert_eq!(m.period_in_iterations("iteration"), Some(1));
    }

    #[test]
    fn chain_multiplies_down_to_iterations() {
        let mut m = Model::new("m");
        m.add_time_unit(resolved("day", "iteration", 24));
        m.add_time_unit(resolved("week", "day", 7));
        assert_eq!(m.period_in_iterations("day"), Some(24));
        assert_eq!(m.period_in_iterations("week"), Some(168));
    }

    #[test]
    fn unknown_unit_is_none() {
        let m = Model::new("m");
        assert_eq!(m.period_in_iterations("epoch"), None);
    }

    #[test]
    fn unresolvable_cycle_is_none() {
        // Validation rejects this shape; resolution must still terminate.
        let mut m = Model::new("m");
        m.add_time_unit(resolved("day", "week", 1));
        m.add_time_unit(resolved("week", "day", 7));
        assert_eq!(m.period_in_iterations("week"), None);
    }
}

// ── Model container ───────────────────────────────────────────────────────────

#[cfg(test)]
mod model {
    use super::*;

    #[test]
    fn fundamentals_pre_registered() {
        let m = Model::new("test");
        assert!(m.is_allowed_type("int"));
        assert!(m.is_allowed_type("double"));
        assert!(!m.is_allowed_type("position"));
    }

    #[test]
    fn registered_adt_becomes_allowed() {
        let mut m = Model::new("test");
        m.register_allowed_type("position");
        assert!(m.is_allowed_type("position"));
    }

    #[test]
    fn message_lookup_by_name() {
        let mut m = Model::new("test");
        m.add_message(Message::new("location", vec![Variable::new("double", "x")]));
        assert!(m.message("location").is_some());
        assert!(m.message("velocity").is_none());
    }

    #[test]
    fn starts_unvalidated() {
        let mut m = Model::new("test");
        assert!(!m.is_validated());
        m.mark_validated();
        assert!(m.is_validated());
    }
}
