//! GEXF Export
//!
//! Writes a graph and one strategy assignment as GEXF 1.2 for external
//! visualization tools. Nodes carry a `strategy` attribute (1 cooperate,
//! 0 defect); signed graphs also carry a `sign` edge attribute.

use std::io::{self, Write};

use crate::components::{Graph, StrategyAssignment};

const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gexf xmlns="http://gexf.net/1.2" version="1.2">"#;

/// Writes `graph` with `strategies` as node attributes.
pub fn write_gexf<W: Write>(
    out: &mut W,
    graph: &Graph,
    strategies: &StrategyAssignment,
    description: &str,
) -> io::Result<()> {
    let signed = graph.is_signed();
    let edge_type = if graph.is_directed() {
        "directed"
    } else {
        "undirected"
    };

    writeln!(out, "{}", HEADER)?;
    writeln!(out, "  <meta>")?;
    writeln!(out, "    <creator>coop_sim</creator>")?;
    writeln!(out, "    <description>{}</description>", escape(description))?;
    writeln!(out, "  </meta>")?;
    writeln!(out, "  <graph mode=\"static\" defaultedgetype=\"{}\">", edge_type)?;

    writeln!(out, "    <attributes class=\"node\">")?;
    writeln!(
        out,
        "      <attribute id=\"0\" title=\"strategy\" type=\"integer\"/>"
    )?;
    writeln!(out, "    </attributes>")?;
    if signed {
        writeln!(out, "    <attributes class=\"edge\">")?;
        writeln!(out, "      <attribute id=\"0\" title=\"sign\" type=\"integer\"/>")?;
        writeln!(out, "    </attributes>")?;
    }

    writeln!(out, "    <nodes>")?;
    for (node, strategy) in strategies.iter() {
        let label = graph.label(node);
        writeln!(
            out,
            "      <node id=\"{0}\" label=\"{0}\"><attvalues><attvalue for=\"0\" value=\"{1}\"/></attvalues></node>",
            label,
            strategy.code()
        )?;
    }
    writeln!(out, "    </nodes>")?;

    writeln!(out, "    <edges>")?;
    for (i, edge) in graph.edges().iter().enumerate() {
        let source = graph.label(edge.source);
        let target = graph.label(edge.target);
        match edge.trust {
            Some(sign) if signed => writeln!(
                out,
                "      <edge id=\"{}\" source=\"{}\" target=\"{}\"><attvalues><attvalue for=\"0\" value=\"{}\"/></attvalues></edge>",
                i,
                source,
                target,
                sign.label()
            )?,
            _ => writeln!(
                out,
                "      <edge id=\"{}\" source=\"{}\" target=\"{}\"/>",
                i, source, target
            )?,
        }
    }
    writeln!(out, "    </edges>")?;
    writeln!(out, "  </graph>")?;
    writeln!(out, "</gexf>")?;
    Ok(())
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
