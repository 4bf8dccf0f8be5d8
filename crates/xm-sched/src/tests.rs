//! Unit tests for xm-sched.

use std::collections::BTreeSet;

use xm_core::TaskId;
use xm_graph::{DependencyGraph, ModelGraph, StateGraph, TaskKind};
use xm_model::{Agent, Function, IOput, Variable};

use crate::emit::emit_task_list;
use crate::queue::{queue_for, TaskQueue};
use crate::registrar::{register_task_list, BoardOp, IoOp, MemoryAccess, TaskRegistrar};
use crate::SchedResult;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn func(name: &str, from: &str, to: &str, ro: &[&str], rw: &[&str]) -> Function {
    Function::new(name, from, to).with_memory_access(ro, rw)
}

fn dep_graph_for(agent: &Agent) -> DependencyGraph {
    let sg = StateGraph::build(agent).unwrap();
    DependencyGraph::build(&sg, &agent.variable_names())
}

/// Two agents exchanging one message, each writing one variable.
fn sample_model_graph() -> ModelGraph {
    let a = Agent::new("A")
        .with_variable(Variable::new("double", "x"))
        .with_function(func("post", "s0", "s1", &[], &["x"]).with_output(IOput::new("loc")));
    let b = Agent::new("B")
        .with_variable(Variable::new("int", "seen"))
        .with_function(func("read", "s0", "s1", &[], &["seen"]).with_input(IOput::new("loc")));
    let graphs = vec![dep_graph_for(&a), dep_graph_for(&b)];
    ModelGraph::build("pair", &graphs).unwrap()
}

// ── Emission ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod emission {
    use super::*;

    #[test]
    fn ids_are_dense_and_in_dependency_order() {
        let (list, map) = emit_task_list(&sample_model_graph());
        for (i, task) in list.iter().enumerate() {
            assert_eq!(task.id, TaskId(i as u64));
        }
        // Every parent was emitted before its child.
        for (child, parent) in map.iter() {
            assert!(parent < child, "parent {parent} not before child {child}");
        }
    }

    #[test]
    fn start_model_is_first_and_finish_last() {
        let (list, _) = emit_task_list(&sample_model_graph());
        assert_eq!(list.tasks()[0].kind, TaskKind::StartModel);
        assert_eq!(
            list.tasks()[list.len() - 1].kind,
            TaskKind::FinishModel
        );
    }

    #[test]
    fn levels_strictly_increase_along_edges() {
        let (list, map) = emit_task_list(&sample_model_graph());
        for (child, parent) in map.iter() {
            let (c, p) = (list.get(child).unwrap(), list.get(parent).unwrap());
            assert!(p.level < c.level, "{} !< {}", p.full_name(), c.full_name());
        }
        assert!(list.iter().all(|t| t.level >= 1));
    }

    #[test]
    fn emission_is_stable() {
        let mg = sample_model_graph();
        let (first, first_map) = emit_task_list(&mg);
        let (second, second_map) = emit_task_list(&mg);
        let names = |l: &crate::TaskList| -> Vec<String> {
            l.iter().map(|t| t.full_name()).collect()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(
            first_map.iter().collect::<Vec<_>>(),
            second_map.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn emitted_reads_and_writes_are_disjoint() {
        let (list, _) = emit_task_list(&sample_model_graph());
        for task in list.iter() {
            assert!(
                task.read_vars.is_disjoint(&task.write_vars),
                "{} reads and writes overlap",
                task.full_name()
            );
        }
    }

    #[test]
    fn unordered_pairs_touch_disjoint_memory() {
        // The §5 guarantee: if neither task reaches the other, one's writes
        // must not intersect the other's reads or writes (same agent).
        let (list, map) = emit_task_list(&sample_model_graph());
        let n = list.len();
        // Transitive reachability over the id map.
        let mut reach = vec![vec![false; n]; n];
        for (child, parent) in map.iter() {
            reach[parent.index()][child.index()] = true;
        }
        for k in 0..n {
            for i in 0..n {
                if reach[i][k] {
                    for j in 0..n {
                        if reach[k][j] {
                            reach[i][j] = true;
                        }
                    }
                }
            }
        }
        for i in 0..n {
            for j in 0..n {
                if i == j || reach[i][j] || reach[j][i] {
                    continue;
                }
                let (a, b) = (&list.tasks()[i], &list.tasks()[j]);
                if a.parent_name != b.parent_name {
                    continue;
                }
                let b_touches: BTreeSet<_> = b.read_vars.union(&b.write_vars).collect();
                assert!(
                    a.write_vars.iter().all(|w| !b_touches.contains(w)),
                    "{} and {} race",
                    a.full_name(),
                    b.full_name()
                );
            }
        }
    }

    #[test]
    fn sync_precedes_reader_precedes_clear() {
        let (list, map) = emit_task_list(&sample_model_graph());
        let id_of = |kind: TaskKind| {
            list.iter()
                .find(|t| t.kind == kind)
                .map(|t| t.id)
                .unwrap()
        };
        let sync = id_of(TaskKind::MessageSync);
        let clear = id_of(TaskKind::MessageClear);
        let reader = list
            .iter()
            .find(|t| t.kind == TaskKind::Function && t.name == "read")
            .unwrap()
            .id;
        assert!(map.iter().any(|(c, p)| c == reader && p == sync));
        assert!(map.iter().any(|(c, p)| c == clear && p == reader));
    }

    #[test]
    fn promoted_conditions_emit_before_same_level_functions() {
        // Conditions carry priority 5, so within a level they come first.
        let agent = Agent::new("A")
            .with_variable(Variable::new("int", "n"))
            .with_function(func("enter", "s0", "s1", &[], &["n"]))
            .with_function({
                let mut f = func("left", "s1", "s2", &[], &["n"]);
                f.condition = Some(xm_model::Condition {
                    expr: xm_model::ConditionExpr::Values {
                        lhs: xm_model::Operand::AgentVar("n".into()),
                        op: xm_model::Comparison::Gt,
                        rhs: xm_model::Operand::Literal(0.0),
                    },
                    read_only_vars: BTreeSet::from(["n".to_owned()]),
                });
                f
            })
            .with_function({
                let mut f = func("right", "s1", "s3", &[], &["n"]);
                f.condition = Some(xm_model::Condition {
                    expr: xm_model::ConditionExpr::Values {
                        lhs: xm_model::Operand::AgentVar("n".into()),
                        op: xm_model::Comparison::Leq,
                        rhs: xm_model::Operand::Literal(0.0),
                    },
                    read_only_vars: BTreeSet::from(["n".to_owned()]),
                });
                f
            });
        let graphs = vec![dep_graph_for(&agent)];
        let mg = ModelGraph::build("m", &graphs).unwrap();
        let (list, _) = emit_task_list(&mg);
        let condition = list.iter().find(|t| t.kind == TaskKind::Condition).unwrap();
        assert_eq!(condition.priority_level, 5);
        for task in list.iter() {
            if task.level == condition.level && task.id < condition.id {
                assert_eq!(task.kind, TaskKind::Condition);
            }
        }
    }

    #[test]
    fn chain_levels_match_depth() {
        // start -> w1 -> w2 -> io -> finish, every function writing `n`.
        let agent = Agent::new("A")
            .with_variable(Variable::new("int", "n"))
            .with_function(func("w1", "s0", "s1", &[], &["n"]))
            .with_function(func("w2", "s1", "s2", &[], &["n"]));
        let graphs = vec![dep_graph_for(&agent)];
        let mg = ModelGraph::build("chain", &graphs).unwrap();
        let (list, _) = emit_task_list(&mg);

        let level_of = |name: &str| {
            list.iter()
                .find(|t| t.name == name)
                .map(|t| t.level)
                .unwrap()
        };
        assert_eq!(level_of("Start"), 1);
        assert_eq!(level_of("w1"), 2);
        assert_eq!(level_of("w2"), 3);
        assert_eq!(level_of("0"), 4); // the grouped population output
        assert_eq!(level_of("Finish"), 5);
    }

    #[test]
    fn table_renders_one_row_per_task() {
        let (list, _) = emit_task_list(&sample_model_graph());
        let text = list.table().to_string();
        assert_eq!(text.lines().count(), list.len() + 2);
        assert!(text.contains("pair.Start"));
    }
}

// ── Queue mapping ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod queues {
    use super::*;

    #[test]
    fn emitted_kinds_map_to_their_queues() {
        assert_eq!(queue_for(TaskKind::Function), Some(TaskQueue::AgentFunction));
        assert_eq!(queue_for(TaskKind::Condition), Some(TaskQueue::AgentFunction));
        assert_eq!(queue_for(TaskKind::MessageSync), Some(TaskQueue::MessageBoard));
        assert_eq!(queue_for(TaskKind::MessageClear), Some(TaskQueue::MessageBoard));
        assert_eq!(queue_for(TaskKind::IoPopWrite), Some(TaskQueue::Io));
        assert_eq!(queue_for(TaskKind::StartModel), Some(TaskQueue::Io));
        assert_eq!(queue_for(TaskKind::FinishModel), Some(TaskQueue::Io));
    }

    #[test]
    fn structural_kinds_have_no_queue() {
        assert_eq!(queue_for(TaskKind::State), None);
        assert_eq!(queue_for(TaskKind::Message), None);
        assert_eq!(queue_for(TaskKind::StartAgent), None);
    }

    #[test]
    fn every_emitted_task_has_a_queue() {
        let (list, _) = emit_task_list(&sample_model_graph());
        assert!(list.iter().all(|t| queue_for(t.kind).is_some()));
    }
}

// ── Registration ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod registration {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        agent_tasks: Vec<String>,
        io_tasks: Vec<(String, IoOp)>,
        board_tasks: Vec<(String, BoardOp)>,
        dependencies: Vec<(TaskId, TaskId)>,
        finalised: bool,
    }

    impl TaskRegistrar for Recorder {
        fn create_agent_task(
            &mut self,
            task_name: &str,
            _agent_name: &str,
            _function_name: &str,
            access: MemoryAccess<'_>,
        ) -> SchedResult<()> {
            assert!(!self.finalised);
            // Manifest sets must already be disjoint.
            assert!(access.read_only_vars.is_disjoint(access.write_vars));
            self.agent_tasks.push(task_name.to_owned());
            Ok(())
        }

        fn create_io_task(
            &mut self,
            task_name: &str,
            _agent_name: &str,
            vars: &BTreeSet<String>,
            op: IoOp,
        ) -> SchedResult<()> {
            if op == IoOp::Output {
                assert!(!vars.is_empty());
            } else {
                assert!(vars.is_empty());
            }
            self.io_tasks.push((task_name.to_owned(), op));
            Ok(())
        }

        fn create_message_board_task(
            &mut self,
            task_name: &str,
            _message_name: &str,
            op: BoardOp,
        ) -> SchedResult<()> {
            self.board_tasks.push((task_name.to_owned(), op));
            Ok(())
        }

        fn add_dependency(&mut self, child: TaskId, parent: TaskId) -> SchedResult<()> {
            self.dependencies.push((child, parent));
            Ok(())
        }

        fn finalise(&mut self) -> SchedResult<()> {
            self.finalised = true;
            Ok(())
        }
    }

    #[test]
    fn each_task_and_edge_registered_once_then_finalised() {
        let (list, map) = emit_task_list(&sample_model_graph());
        let mut recorder = Recorder::default();
        register_task_list(&list, &map, &mut recorder).unwrap();

        let created =
            recorder.agent_tasks.len() + recorder.io_tasks.len() + recorder.board_tasks.len();
        assert_eq!(created, list.len());
        assert_eq!(recorder.dependencies.len(), map.len());
        assert!(recorder.finalised);

        // No task registered twice.
        let mut names = recorder.agent_tasks.clone();
        names.extend(recorder.io_tasks.iter().map(|(n, _)| n.clone()));
        names.extend(recorder.board_tasks.iter().map(|(n, _)| n.clone()));
        let unique: BTreeSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn board_tasks_carry_sync_and_clear_ops() {
        let (list, map) = emit_task_list(&sample_model_graph());
        let mut recorder = Recorder::default();
        register_task_list(&list, &map, &mut recorder).unwrap();
        let ops: BTreeSet<_> = recorder.board_tasks.iter().map(|(_, op)| *op).collect();
        assert!(ops.contains(&BoardOp::Sync));
        assert!(ops.contains(&BoardOp::Clear));
    }

    #[test]
    fn framing_tasks_use_init_and_fin() {
        let (list, map) = emit_task_list(&sample_model_graph());
        let mut recorder = Recorder::default();
        register_task_list(&list, &map, &mut recorder).unwrap();
        let ops: Vec<_> = recorder.io_tasks.iter().map(|(_, op)| *op).collect();
        assert!(ops.contains(&IoOp::Init));
        assert!(ops.contains(&IoOp::Fin));
        assert!(ops.contains(&IoOp::Output));
    }
}
