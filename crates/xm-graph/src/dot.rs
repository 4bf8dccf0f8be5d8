//! GraphViz output for task graphs.
//!
//! Shape/colour encoding (one glance tells the vertex kind):
//!
//! | Kind                        | Shape         | Fill       |
//! |-----------------------------|---------------|------------|
//! | `Function`                  | rect          | yellow     |
//! | `Condition`                 | invhouse      | yellow     |
//! | start/finish (agent, model) | ellipse       | red        |
//! | `MessageSync`/`MessageClear`| parallelogram | lightblue  |
//! | `IoPopWrite`                | folder        | orange     |
//! | `State`/`Variable`          | ellipse       | white      |
//!
//! Io vertices are labelled with their grouped variable names, sync/clear
//! vertices with a `SYNC:`/`CLEAR:` prefix, framing vertices with their
//! parent.  Blank edges stay unlabelled.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use xm_core::VertexId;

use crate::digraph::TaskGraph;
use crate::task::{Task, TaskKind};

/// Write `graph` in GraphViz dot syntax.
pub fn write_dot<W: Write>(graph: &TaskGraph, out: &mut W) -> io::Result<()> {
    writeln!(out, "digraph {{")?;
    for v in graph.vertices() {
        write_vertex(graph.task(v), v, out)?;
    }
    for e in graph.edge_ids() {
        let (s, t) = (graph.source(e), graph.target(e));
        match graph.dependency(e).graph_label() {
            Some(label) => writeln!(
                out,
                "    n{} -> n{} [label=\"{}\"];",
                s.index(),
                t.index(),
                label
            )?,
            None => writeln!(out, "    n{} -> n{};", s.index(), t.index())?,
        }
    }
    writeln!(out, "}}")
}

/// Write `graph` to a `.dot` file at `path`.
pub fn save_dot(graph: &TaskGraph, path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_dot(graph, &mut out)?;
    out.flush()
}

// ── Vertex rendering ──────────────────────────────────────────────────────────

fn write_vertex<W: Write>(task: &Task, v: VertexId, out: &mut W) -> io::Result<()> {
    let label = match task.kind {
        TaskKind::IoPopWrite => {
            let mut vars = String::new();
            for name in &task.write_vars {
                vars.push_str(name);
                vars.push_str("\\n");
            }
            vars
        }
        TaskKind::MessageSync => format!("SYNC: {}", task.name),
        TaskKind::MessageClear => format!("CLEAR: {}", task.name),
        TaskKind::StartAgent | TaskKind::StartModel => format!("Start\\n{}", task.parent_name),
        TaskKind::FinishAgent | TaskKind::FinishModel => format!("Finish\\n{}", task.parent_name),
        _ => task.name.clone(),
    };

    let style = match task.kind {
        TaskKind::Function => "shape=rect, style=filled, fillcolor=yellow",
        TaskKind::Condition => "shape=invhouse, style=filled, fillcolor=yellow",
        TaskKind::StartAgent
        | TaskKind::FinishAgent
        | TaskKind::StartModel
        | TaskKind::FinishModel => "shape=ellipse, style=filled, fillcolor=red",
        TaskKind::MessageSync | TaskKind::MessageClear | TaskKind::Message => {
            "shape=parallelogram, style=filled, fillcolor=lightblue"
        }
        TaskKind::IoPopWrite => "shape=folder, style=filled, fillcolor=orange",
        TaskKind::State | TaskKind::Variable => "shape=ellipse, style=filled, fillcolor=white",
    };

    writeln!(out, "    n{} [label=\"{}\" {}];", v.index(), label, style)
}
