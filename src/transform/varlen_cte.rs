use crate::cypher_parser::ast::{Direction, PathKind, VarlenRange};

/// Cap applied to unbounded (`*` / `*n..`) traversals so recursion cannot
/// run away on dense graphs.
pub const DEFAULT_MAX_HOPS: u32 = 10;

/// Generates the recursive CTE backing one variable-length relationship.
/// The CTE yields `(source, target, depth, path_ids)` tuples where
/// `path_ids` is a JSON array alternating node and edge ids.
pub struct VarlenCteGenerator<'a> {
    pub cte_name: String,
    pub range: VarlenRange,
    pub rel_types: &'a [&'a str],
    pub direction: Direction,
    pub kind: PathKind,
}

impl<'a> VarlenCteGenerator<'a> {
    pub fn new(
        cte_name: String,
        range: VarlenRange,
        rel_types: &'a [&'a str],
        direction: Direction,
        kind: PathKind,
    ) -> Self {
        VarlenCteGenerator {
            cte_name,
            range,
            rel_types,
            direction,
            kind,
        }
    }

    pub fn min_hops(&self) -> u32 {
        self.range.effective_min()
    }

    pub fn max_hops(&self) -> u32 {
        if self.range.has_max() {
            self.range.max_hops as u32
        } else {
            DEFAULT_MAX_HOPS
        }
    }

    fn type_filter(&self, prefix: &str) -> String {
        if self.rel_types.is_empty() {
            return String::new();
        }
        if self.rel_types.len() == 1 {
            format!(" {} e.type = '{}'", prefix, escape(self.rel_types[0]))
        } else {
            let list = self
                .rel_types
                .iter()
                .map(|t| format!("'{}'", escape(t)))
                .collect::<Vec<_>>()
                .join(", ");
            format!(" {} e.type IN ({})", prefix, list)
        }
    }

    /// Base-case SELECT for one edge orientation.
    fn base_select(&self, reversed: bool) -> String {
        let (src, tgt) = if reversed {
            ("e.target_id", "e.source_id")
        } else {
            ("e.source_id", "e.target_id")
        };
        format!(
            "SELECT {src}, {tgt}, 1, json_array({src}, e.id, {tgt}) FROM edges e{filter}",
            src = src,
            tgt = tgt,
            filter = self.type_filter("WHERE"),
        )
    }

    /// Recursive step for one edge orientation.
    fn step_select(&self, reversed: bool) -> String {
        let (hop_from, hop_to) = if reversed {
            ("e.target_id", "e.source_id")
        } else {
            ("e.source_id", "e.target_id")
        };
        format!(
            "SELECT v.source, {to}, v.depth + 1, \
             json_insert(v.path_ids, '$[#]', e.id, '$[#]', {to}) \
             FROM {name} v JOIN edges e ON {from} = v.target \
             WHERE v.depth < {max}{filter}",
            to = hop_to,
            from = hop_from,
            name = self.cte_name,
            max = self.max_hops(),
            filter = self.type_filter("AND"),
        )
    }

    /// The full CTE definition, ready to join a `WITH RECURSIVE` list.
    pub fn generate(&self) -> String {
        let mut selects: Vec<String> = Vec::new();
        match self.direction {
            Direction::Outgoing => {
                selects.push(self.base_select(false));
                selects.push(self.step_select(false));
            }
            Direction::Incoming => {
                selects.push(self.base_select(true));
                selects.push(self.step_select(true));
            }
            Direction::Either => {
                selects.push(self.base_select(false));
                selects.push(self.base_select(true));
                selects.push(self.step_select(false));
                selects.push(self.step_select(true));
            }
        }

        format!(
            "{name}(source, target, depth, path_ids) AS (\n  {body}\n)",
            name = self.cte_name,
            body = selects.join("\n  UNION ALL\n  "),
        )
    }

    /// Join-site predicate limiting rows to the requested depth window.
    pub fn depth_predicate(&self) -> String {
        format!(
            "{name}.depth >= {min} AND {name}.depth <= {max}",
            name = self.cte_name,
            min = self.min_hops(),
            max = self.max_hops(),
        )
    }

    /// Extra predicate for `shortestPath`/`allShortestPaths`: keep only the
    /// minimum-depth rows per (source, target) pair.
    pub fn shortest_predicate(&self) -> Option<String> {
        match self.kind {
            PathKind::Normal => None,
            PathKind::Shortest | PathKind::AllShortest => Some(format!(
                "{name}.depth = (SELECT MIN(m.depth) FROM {name} m \
                 WHERE m.source = {name}.source AND m.target = {name}.target)",
                name = self.cte_name,
            )),
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('\'', "''")
}
