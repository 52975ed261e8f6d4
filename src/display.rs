use crate::chart::Chart;
use crate::edge::Edge;
use crate::feature::{Category, FeatSymbol, FeatValue};
use crate::grammar::{Label, Production, Symbol};
use crate::trees::Tree;

use std::fmt::{self, Write};

impl fmt::Display for Symbol {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Term(t) => write!(w, "'{}'", t),
            Symbol::NonTerm(n) => write!(w, "{}", n),
        }
    }
}

impl fmt::Display for FeatValue {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatValue::Atom(a) => write!(w, "'{}'", a),
            FeatValue::Var(x) => write!(w, "?{}", x),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        write!(w, "{}", self.name)?;
        if self.features.is_empty() {
            return Ok(());
        }
        write!(w, "[")?;
        for (i, (feat, value)) in self.features.iter().enumerate() {
            if i > 0 {
                write!(w, ", ")?;
            }
            match value {
                // boolean features print in their short form
                FeatValue::Atom(a) if a == "+" || a == "-" => write!(w, "{}{}", a, feat)?,
                _ => write!(w, "{}={}", feat, value)?,
            }
        }
        write!(w, "]")
    }
}

impl fmt::Display for FeatSymbol {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatSymbol::Term(t) => write!(w, "'{}'", t),
            FeatSymbol::Cat(c) => write!(w, "{}", c),
        }
    }
}

impl<L: fmt::Display> fmt::Display for Production<L> {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        write!(w, "{} ->", self.lhs)?;
        for l in self.rhs.iter() {
            write!(w, " {}", l)?;
        }
        Ok(())
    }
}

impl<L: Label> fmt::Display for Edge<L> {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        write!(w, "[{}:{}] {}", self.start(), self.end(), self.lhs())?;
        if self.is_leaf() {
            return Ok(());
        }
        write!(w, " ->")?;
        for (i, l) in self.rhs().iter().enumerate() {
            if i == self.dot() {
                write!(w, " *")?;
            }
            write!(w, " {}", l)?;
        }
        if self.is_complete() {
            write!(w, " *")?;
        }
        Ok(())
    }
}

impl<L: fmt::Display> fmt::Display for Tree<L> {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Tree::Leaf(token) => write!(w, "{}", token),
            Tree::Node(label, children) => {
                write!(w, "({}", label)?;
                if children.is_empty() {
                    write!(w, " ")?;
                }
                for child in children {
                    write!(w, " {}", child)?;
                }
                write!(w, ")")
            }
        }
    }
}

fn centered(s: &str, width: usize) -> String {
    let s: String = s.chars().take(width).collect();
    let len = s.chars().count();
    let margin = width - len;
    // odd margins lean left only when the field width is odd too
    let left = margin / 2 + (margin & width & 1);
    let right = margin - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

impl<L: Label> Chart<L> {
    /// One row of the chart diagram: `width` characters per token position,
    /// followed by the edge itself.
    ///
    /// Zero-width edges draw as `#` (complete) or `>` (incomplete); complete
    /// edges spanning the whole input as `[===]`; others as `[---]` or `[--->`.
    pub fn pretty_format_edge(&self, edge: &Edge<L>, width: usize) -> String {
        let (start, end) = edge.span();
        let n = self.num_leaves();
        let cell = width.saturating_sub(1);
        let mut row = String::from("|");
        row.push_str(&format!(".{}", " ".repeat(cell)).repeat(start));

        if start == end {
            row.push(if edge.is_complete() { '#' } else { '>' });
        } else {
            let fill = if edge.is_complete() && edge.span() == (0, n) { "=" } else { "-" };
            row.push('[');
            row.push_str(&fill.repeat(width).repeat(end - start - 1));
            row.push_str(&fill.repeat(cell));
            row.push(if edge.is_complete() { ']' } else { '>' });
        }

        row.push_str(&format!("{}.", " ".repeat(cell)).repeat(n.saturating_sub(end)));
        row.push_str("| ");
        row.push_str(&edge.to_string());
        row
    }

    /// Header naming each token in its column; empty when `width < 2`.
    pub fn pretty_format_leaves(&self, width: usize) -> String {
        if width <= 1 {
            return String::new();
        }
        let mut header = String::from("|.");
        for token in self.leaves() {
            header.push_str(&centered(token, width - 1));
            header.push('.');
        }
        header.push('|');
        header
    }

    /// The leaves header followed by every edge, shortest spans first.
    pub fn pretty_format(&self, width: usize) -> String {
        let mut edges: Vec<&Edge<L>> = self.edges().map(|(_, e)| e).collect();
        edges.sort_by_key(|e| (e.length(), e.start()));
        let mut s = self.pretty_format_leaves(width);
        for edge in edges {
            s.push('\n');
            s.push_str(&self.pretty_format_edge(edge, width));
        }
        s
    }

    pub fn dot(&self) -> DotDigraph<'_, L> {
        DotDigraph { chart: self }
    }

    /// The chart as a Graphviz digraph: one row of nodes per edge, with the
    /// edge drawn between its start and end column.
    pub fn dot_digraph(&self) -> String {
        self.dot().to_string()
    }
}

pub struct DotDigraph<'c, L: Label> {
    chart: &'c Chart<L>,
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl<'c, L: Label> fmt::Display for DotDigraph<'c, L> {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        let chart = self.chart;
        let n = chart.num_leaves();
        let edges: Vec<&Edge<L>> = chart.edges().map(|(_, e)| e).collect();
        // node (x, y) exists unless row y's edge passes over column x
        let visible = |x: usize, y: usize| y == 0 || x <= edges[y - 1].start() || x >= edges[y - 1].end();

        writeln!(w, "digraph chart {{")?;
        writeln!(w, "  rankdir=LR;")?;
        writeln!(w, "  node [height=0.1,width=0.1];")?;
        writeln!(w, "  node [style=filled, color=\"lightgray\"];")?;

        for y in (0..=edges.len()).rev() {
            if y == 0 {
                writeln!(w, "  node [style=filled, color=\"black\"];")?;
            }
            for x in (0..=n).filter(|&x| visible(x, y)) {
                writeln!(w, "  {:04}.{:04} [label=\"\"];", x, y)?;
            }
        }

        writeln!(w, "  x [style=invis]; x->0000.0000 [style=invis];")?;

        for x in 0..=n {
            let mut rank = String::new();
            for y in (0..=edges.len()).filter(|&y| visible(x, y)) {
                write!(rank, " {:04}.{:04}", x, y)?;
            }
            writeln!(w, "  {{rank=same;{}}}", rank)?;
        }

        writeln!(w, "  edge [style=invis, weight=100];")?;
        writeln!(w, "  node [shape=plaintext]")?;
        write!(w, "  0000.0000")?;
        for (x, token) in chart.leaves().iter().enumerate() {
            write!(w, "->\"{}\"->{:04}.0000", escape(token), x + 1)?;
        }
        writeln!(w, ";")?;
        writeln!(w)?;

        writeln!(w, "  edge [style=solid, weight=1];")?;
        for (y, edge) in edges.iter().enumerate() {
            let y = y + 1;
            for x in 0..edge.start() {
                writeln!(w, "  {:04}.{:04} -> {:04}.{:04} [style=\"invis\"];", x, y, x + 1, y)?;
            }
            writeln!(w, "  {:04}.{:04} -> {:04}.{:04} [label=\"{}\"];",
                     edge.start(), y, edge.end(), y, escape(&edge.to_string()))?;
            for x in edge.end()..n {
                writeln!(w, "  {:04}.{:04} -> {:04}.{:04} [style=\"invis\"];", x, y, x + 1, y)?;
            }
        }
        writeln!(w, "}}")
    }
}

#[cfg(test)]
#[path = "tests/display.rs"]
mod tests_for_display;
