use crate::model::BreadcrumbRecord;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};

/// Phase relation graph. `A depends on B` is `A -> B`; `A blocks C` is
/// `C -> A`.
///
/// Nodes are created in sorted name order, so the graph (and every result
/// derived from it) does not depend on the order files were scanned in.
pub struct PhaseGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl PhaseGraph {
    pub fn from_records(records: &[BreadcrumbRecord]) -> Self {
        let names: BTreeSet<&str> = records
            .iter()
            .filter_map(|r| r.phase())
            .chain(records.iter().flat_map(|r| r.referenced_phases()))
            .collect();

        let mut graph = DiGraph::with_capacity(names.len(), 0);
        let mut index = HashMap::with_capacity(names.len());
        for name in names {
            let idx = graph.add_node(name.to_string());
            index.insert(name.to_string(), idx);
        }

        let mut this = Self { graph, index };
        for record in records {
            let Some(phase) = record.phase() else {
                continue;
            };
            for dep in &record.dependencies {
                this.relate(phase, dep);
            }
            for blocked in &record.blocks {
                this.relate(blocked, phase);
            }
        }
        this
    }

    fn relate(&mut self, from: &str, to: &str) {
        if let (Some(&a), Some(&b)) = (self.index.get(from), self.index.get(to)) {
            self.graph.update_edge(a, b, ());
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn depends_on(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Every strongly connected component with more than one phase, plus
    /// self loops. Members are sorted, and so is the list.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut names: Vec<String> =
                    scc.into_iter().map(|n| self.graph[n].clone()).collect();
                names.sort();
                names
            })
            .collect();
        cycles.sort();
        cycles
    }
}
