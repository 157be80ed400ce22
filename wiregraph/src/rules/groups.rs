use std::collections::{BTreeMap, BTreeSet};

use petgraph::visit::Bfs;

use super::{Rule, Scope};
use crate::geometry::GeometryPolicy;
use crate::graph::{GraphState, GroupId, VertexId};

/// Label every connected component touching the scope with one group id.
///
/// Ids are sticky: a component keeps the id most of its vertices already
/// carry, unless that id still lives on in a component outside this pass
/// (the component was split off) or a larger piece claims it. Components the
/// pass never reaches are not touched at all.
pub struct AssignGroups;

impl Rule for AssignGroups {
    fn name(&self) -> &str {
        "assign_groups"
    }

    fn apply(&self, state: &mut GraphState, scope: &Scope, policy: &GeometryPolicy) -> bool {
        // edges crossing the scope count too: a collapse may have removed
        // every vertex inside it
        let seeds = scope.reach(state, policy.epsilon);
        if seeds.is_empty() {
            return false;
        }

        let components = components_from(state, &seeds);
        let winners = claim_existing_groups(state, &components);

        let mut changed = false;
        for (index, component) in components.iter().enumerate() {
            let group = match winners.get(&index) {
                Some(group) => *group,
                None => state.allocate_group(),
            };
            for &vertex in component {
                if state.vertex(vertex).is_some_and(|v| v.group != Some(group)) {
                    state.set_group(vertex, Some(group));
                    changed = true;
                }
            }
        }
        changed
    }
}

/// Full components reachable from the seeds, ordered by their smallest vertex.
///
/// Walks the state's adjacency directly, so the cost is the size of the
/// reached components rather than the whole graph.
fn components_from(state: &GraphState, seeds: &[VertexId]) -> Vec<Vec<VertexId>> {
    let mut seen: BTreeSet<VertexId> = BTreeSet::new();
    let mut components = Vec::new();

    for &seed in seeds {
        if seen.contains(&seed) || !state.contains_vertex(seed) {
            continue;
        }
        let mut component = Vec::new();
        let mut bfs = Bfs::new(state, seed);
        while let Some(v) = bfs.next(state) {
            seen.insert(v);
            component.push(v);
        }
        component.sort();
        components.push(component);
    }

    components.sort_by_key(|c| c.first().copied());
    components
}

/// Decide which component keeps each existing group id: component index -> id.
fn claim_existing_groups(state: &GraphState, components: &[Vec<VertexId>]) -> BTreeMap<usize, GroupId> {
    // group -> [(component index, holders in that component)]
    let mut holders: BTreeMap<GroupId, Vec<(usize, usize)>> = BTreeMap::new();
    for (index, component) in components.iter().enumerate() {
        let mut counts: BTreeMap<GroupId, usize> = BTreeMap::new();
        for &vertex in component {
            if let Some(group) = state.vertex(vertex).and_then(|v| v.group) {
                *counts.entry(group).or_default() += 1;
            }
        }
        for (group, count) in counts {
            holders.entry(group).or_default().push((index, count));
        }
    }

    // component index -> [(group, count)] it won
    let mut won: BTreeMap<usize, Vec<(GroupId, usize)>> = BTreeMap::new();
    for (group, claims) in holders {
        let covered: usize = claims.iter().map(|(_, c)| c).sum();
        if state.group_size(group) > covered {
            // still used by a component outside this pass
            continue;
        }
        // most holders wins; ties go to the earlier component
        let winner = claims
            .iter()
            .copied()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)));
        if let Some((index, count)) = winner {
            won.entry(index).or_default().push((group, count));
        }
    }

    won.into_iter()
        .filter_map(|(index, groups)| {
            groups
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
                .map(|(group, _)| (index, group))
        })
        .collect()
}
