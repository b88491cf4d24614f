//! Per-axis solve pass.
//!
//! Refreshes nominal sizes, simplifies the graph, turns paths into constraints, solves the
//! trunk for its minimum, maximum and preferred extent, solves the loose parts for their
//! preferred extent alone, then restores the graph with every anchor carrying its three solved
//! sizes. A failing trunk degrades the whole axis to a spanning-tree estimate. A failing loose
//! part only resets its own anchors to their nominal sizes. Both flag the axis as conflicted.

use std::collections::{BTreeMap, BTreeSet};

use anchorage_graphlib::alg;
use tracing::{debug, warn};

use crate::anchor::{AnchorSource, AxisGraph, Dependency, Nominal, SizeSource, Solved};
use crate::arena::{AnchorId, ItemId, VertexId};
use crate::model::{ItemRef, MAX_SIZE};
use crate::paths::{GraphPath, center_constraints, find_paths, partition, path_constraints};
use crate::simplex::{Constraint, Ratio, Simplex, SimplexError};
use crate::simplify::{Simplification, restore, simplify};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum SolveState {
    #[default]
    Dirty,
    Simplified,
    Solved,
    Interpolatable,
}

/// Total extent of the layout along one axis at each key size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct KeySizes {
    pub minimum: f64,
    pub preferred: f64,
    pub maximum: f64,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SolveSettings {
    pub simplify: bool,
    pub max_iterations: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Var {
    Anchor(AnchorId),
    Slack(usize),
}

#[derive(Debug, thiserror::Error)]
enum SolveError {
    #[error(transparent)]
    Lp(#[from] SimplexError),
    #[error("the layout's last edge is unreachable from its first edge")]
    Disconnected,
}

const BOUND_TOLERANCE: f64 = 1e-9;

/// Brings `axis` to the interpolatable state. A no-op when nothing changed since the last pass.
pub(crate) fn calculate(axis: &mut AxisGraph, source: &impl SizeSource, settings: SolveSettings) {
    if axis.state == SolveState::Interpolatable {
        return;
    }
    axis.refresh_size_hints(source);

    let record = if settings.simplify {
        simplify(axis)
    } else {
        Simplification::default()
    };
    // Disjoint parallels already collapsed to their larger minimum; solve with that.
    axis.has_conflicts = !record.feasible;
    axis.key_sizes = match solve_graph(axis, settings.max_iterations) {
        Ok(keys) => keys,
        Err(error) => {
            warn!(
                target: "anchorage::solve",
                orientation = ?axis.orientation,
                %error,
                "conflicting anchors, falling back to a spanning-tree estimate"
            );
            axis.has_conflicts = true;
            fallback(axis)
        }
    };
    axis.state = SolveState::Solved;

    restore(axis, record);
    axis.connected = connected_items(axis);
    axis.state = SolveState::Interpolatable;
    debug!(
        target: "anchorage::solve",
        orientation = ?axis.orientation,
        minimum = axis.key_sizes.minimum,
        preferred = axis.key_sizes.preferred,
        maximum = axis.key_sizes.maximum,
        conflicts = axis.has_conflicts,
        "axis solved"
    );
}

fn solve_graph(
    axis: &mut AxisGraph,
    max_iterations: Option<usize>,
) -> Result<KeySizes, SolveError> {
    let paths = find_paths(axis);
    let trunk_path = paths
        .get(&axis.layout.last)
        .and_then(|list| list.first())
        .cloned()
        .ok_or(SolveError::Disconnected)?;

    let mut constraints = path_constraints(&paths);
    constraints.extend(center_constraints(axis));
    let (trunk, loose) = partition(constraints, trunk_path.anchors());
    debug!(
        target: "anchorage::solve",
        orientation = ?axis.orientation,
        vertices = paths.len(),
        trunk = trunk.len(),
        loose = loose.len(),
        "constraints built"
    );

    let keys = solve_trunk(axis, &trunk, &trunk_path, max_iterations)?;
    if !loose.is_empty() {
        let vars = variables_of(&loose);
        let shifts = shifts_for(axis, &vars);
        let mut lp = lift(&loose, &shifts);
        lp.extend(bounds(axis, &vars, &shifts).0);
        match solve_preferred(axis, lp, &vars, &shifts, max_iterations) {
            Ok(preferred) => {
                for (id, value) in preferred {
                    if let Some(anchor) = axis.anchors.get_mut(id) {
                        anchor.solved = Solved::all(value);
                    }
                }
            }
            Err(error) => {
                warn!(
                    target: "anchorage::solve",
                    orientation = ?axis.orientation,
                    %error,
                    "conflicting floating anchors, keeping their nominal sizes"
                );
                axis.has_conflicts = true;
                for &id in &vars {
                    if let Some(anchor) = axis.anchors.get_mut(id) {
                        anchor.solved = Solved::all(clamped(anchor.nominal).at_preferred);
                    }
                }
            }
        }
    }
    Ok(keys)
}

fn solve_trunk(
    axis: &mut AxisGraph,
    constraints: &[Constraint<AnchorId>],
    trunk_path: &GraphPath,
    max_iterations: Option<usize>,
) -> Result<KeySizes, SolveError> {
    if constraints.is_empty() {
        for (id, sign) in trunk_path.terms() {
            let Some(anchor) = axis.anchors.get_mut(id) else {
                continue;
            };
            let n = anchor.nominal;
            anchor.solved = if sign > 0.0 {
                Solved {
                    at_minimum: n.min,
                    at_preferred: n.pref,
                    at_maximum: n.max,
                }
            } else {
                Solved {
                    at_minimum: n.max,
                    at_preferred: n.pref,
                    at_maximum: n.min,
                }
            };
        }
        return Ok(path_extent(axis, trunk_path));
    }

    let mut vars = variables_of(constraints);
    vars.extend(trunk_path.anchors());
    let shifts = shifts_for(axis, &vars);

    let mut lp = lift(constraints, &shifts);
    let (bounded, has_upper) = bounds(axis, &vars, &shifts);
    lp.extend(bounded);
    let objective: Vec<(Var, f64)> = trunk_path
        .terms()
        .map(|(id, sign)| (Var::Anchor(id), sign))
        .collect();
    if !has_upper {
        let mut guard = Constraint::new(Ratio::LessOrEqual, MAX_SIZE);
        for &(var, sign) in &objective {
            guard.add(var, sign);
            if let Var::Anchor(id) = var {
                guard.constant += sign * shifts.get(&id).copied().unwrap_or_default();
            }
        }
        lp.push(guard);
    }

    let mut simplex = Simplex::new().with_max_iterations(max_iterations);
    simplex.set_constraints(&lp)?;
    simplex.set_objective(objective.iter().copied());
    simplex.solve_min()?;
    let at_minimum = read_back(&simplex, &vars, &shifts);
    simplex.solve_max()?;
    let at_maximum = read_back(&simplex, &vars, &shifts);
    let at_preferred = solve_preferred(axis, lp, &vars, &shifts, max_iterations)?;

    for &id in &vars {
        if let Some(anchor) = axis.anchors.get_mut(id) {
            anchor.solved = Solved {
                at_minimum: at_minimum.get(&id).copied().unwrap_or_default(),
                at_preferred: at_preferred.get(&id).copied().unwrap_or_default(),
                at_maximum: at_maximum.get(&id).copied().unwrap_or_default(),
            };
        }
    }
    Ok(path_extent(axis, trunk_path))
}

/// Minimizes the weighted deviation of every variable from its preferred size.
///
/// Each variable `x` gets `x + shrink - grow = pref`, split into a soft part (inside the
/// preferred range, weight 1) and a hard part (beyond it, weight N) per direction.
fn solve_preferred(
    axis: &AxisGraph,
    mut lp: Vec<Constraint<Var>>,
    vars: &BTreeSet<AnchorId>,
    shifts: &BTreeMap<AnchorId, f64>,
    max_iterations: Option<usize>,
) -> Result<BTreeMap<AnchorId, f64>, SolveError> {
    let hard = vars.len() as f64;
    let mut objective = Vec::new();
    let mut slacks = 0;
    for &id in vars {
        let Some(anchor) = axis.anchors.get(id) else {
            continue;
        };
        if anchor.is_structural() {
            continue;
        }
        let n = anchor.nominal;
        let shift = shifts.get(&id).copied().unwrap_or_default();
        let mut target = Constraint::new(Ratio::Equal, n.pref + shift).with(Var::Anchor(id), 1.0);
        for (range, coefficient, weight) in [
            (n.pref - n.min_pref, 1.0, 1.0),
            (n.min_pref - n.min, 1.0, hard),
            (n.max_pref - n.pref, -1.0, 1.0),
            (n.max - n.max_pref, -1.0, hard),
        ] {
            if range <= BOUND_TOLERANCE {
                continue;
            }
            let slack = Var::Slack(slacks);
            slacks += 1;
            target.add(slack, coefficient);
            lp.push(Constraint::new(Ratio::LessOrEqual, range).with(slack, 1.0));
            objective.push((slack, weight));
        }
        lp.push(target);
    }

    let mut simplex = Simplex::new().with_max_iterations(max_iterations);
    simplex.set_constraints(&lp)?;
    simplex.set_objective(objective);
    simplex.solve_min()?;
    Ok(read_back(&simplex, vars, shifts))
}

fn variables_of(constraints: &[Constraint<AnchorId>]) -> BTreeSet<AnchorId> {
    constraints
        .iter()
        .flat_map(|c| c.variables.keys().copied())
        .collect()
}

/// Offsets mapping each variable's (possibly negative) minimum onto zero.
fn shifts_for(axis: &AxisGraph, vars: &BTreeSet<AnchorId>) -> BTreeMap<AnchorId, f64> {
    vars.iter()
        .filter_map(|&id| {
            let min = axis.anchors.get(id)?.nominal.min.max(-MAX_SIZE);
            (min < 0.0).then_some((id, -min))
        })
        .collect()
}

fn lift(
    constraints: &[Constraint<AnchorId>],
    shifts: &BTreeMap<AnchorId, f64>,
) -> Vec<Constraint<Var>> {
    constraints
        .iter()
        .map(|c| {
            let mut out = Constraint::new(c.ratio, c.constant);
            for (&id, &coefficient) in &c.variables {
                out.add(Var::Anchor(id), coefficient);
                out.constant += coefficient * shifts.get(&id).copied().unwrap_or_default();
            }
            out
        })
        .collect()
}

/// `min <= x <= max` for every variable; also reports whether any upper bound was emitted.
fn bounds(
    axis: &AxisGraph,
    vars: &BTreeSet<AnchorId>,
    shifts: &BTreeMap<AnchorId, f64>,
) -> (Vec<Constraint<Var>>, bool) {
    let mut out = Vec::new();
    let mut has_upper = false;
    for &id in vars {
        let Some(anchor) = axis.anchors.get(id) else {
            continue;
        };
        if anchor.dependency == Dependency::Slave && anchor.source().is_some() {
            continue;
        }
        let shift = shifts.get(&id).copied().unwrap_or_default();
        let min = anchor.nominal.min.clamp(-MAX_SIZE, MAX_SIZE) + shift;
        let max = anchor.nominal.max.clamp(-MAX_SIZE, MAX_SIZE) + shift;
        let var = Var::Anchor(id);
        if (max - min).abs() <= BOUND_TOLERANCE {
            out.push(Constraint::new(Ratio::Equal, min).with(var, 1.0));
            has_upper = true;
            continue;
        }
        if min > 0.0 {
            out.push(Constraint::new(Ratio::MoreOrEqual, min).with(var, 1.0));
        }
        if !anchor.is_structural() {
            out.push(Constraint::new(Ratio::LessOrEqual, max).with(var, 1.0));
            has_upper = true;
        }
    }
    (out, has_upper)
}

fn read_back(
    simplex: &Simplex<Var>,
    vars: &BTreeSet<AnchorId>,
    shifts: &BTreeMap<AnchorId, f64>,
) -> BTreeMap<AnchorId, f64> {
    vars.iter()
        .map(|&id| {
            let shift = shifts.get(&id).copied().unwrap_or_default();
            (id, simplex.value(Var::Anchor(id)) - shift)
        })
        .collect()
}

fn path_extent(axis: &AxisGraph, path: &GraphPath) -> KeySizes {
    let mut keys = KeySizes::default();
    for (id, sign) in path.terms() {
        let Some(anchor) = axis.anchors.get(id) else {
            continue;
        };
        keys.minimum += sign * anchor.solved.at_minimum;
        keys.preferred += sign * anchor.solved.at_preferred;
        keys.maximum += sign * anchor.solved.at_maximum;
    }
    keys
}

/// Nominal sizes with the preferred size pulled into `[min, max]`.
fn clamped(n: Nominal) -> Solved {
    let max = n.max.max(n.min);
    Solved {
        at_minimum: n.min,
        at_preferred: n.pref.clamp(n.min, max),
        at_maximum: max,
    }
}

/// Every top-level anchor takes its nominal sizes; the layout extent is read along one
/// breadth-first route from the first to the last layout vertex, and the layout's own extent
/// anchors are then set to match it.
fn fallback(axis: &mut AxisGraph) -> KeySizes {
    for (_, anchor) in axis.anchors.iter_mut() {
        if anchor.parent.is_none() {
            anchor.solved = clamped(anchor.nominal);
        }
    }

    let (first, last) = (axis.layout.first, axis.layout.last);
    let route = route(axis, first, last, true).or_else(|| route(axis, first, last, false));
    let mut keys = KeySizes::default();
    for (v, w) in route.unwrap_or_default() {
        let Some(anchor) = axis
            .anchor_between(v, w)
            .and_then(|id| axis.anchors.get_mut(id))
        else {
            continue;
        };
        if anchor.from != v {
            let s = anchor.solved;
            anchor.solved = Solved {
                at_minimum: s.at_maximum,
                at_preferred: s.at_preferred,
                at_maximum: s.at_minimum,
            };
        }
        let sign = if anchor.from == v { 1.0 } else { -1.0 };
        keys.minimum += sign * anchor.solved.at_minimum;
        keys.preferred += sign * anchor.solved.at_preferred;
        keys.maximum += sign * anchor.solved.at_maximum;
    }
    keys.maximum = keys.maximum.max(keys.minimum);
    keys.preferred = keys.preferred.clamp(keys.minimum, keys.maximum);

    // The layout extent (or each half of it) always points from the first edge towards the
    // last, so it takes the route's sizes as they are.
    let extent = Solved {
        at_minimum: keys.minimum,
        at_preferred: keys.preferred,
        at_maximum: keys.maximum,
    };
    for (_, anchor) in axis.anchors.iter_mut() {
        if anchor.parent.is_some() || !anchor.is_structural() {
            continue;
        }
        let half = matches!(anchor.source(), Some(AnchorSource::Item { half: true, .. }));
        anchor.solved = if half {
            Solved {
                at_minimum: extent.at_minimum / 2.0,
                at_preferred: extent.at_preferred / 2.0,
                at_maximum: extent.at_maximum / 2.0,
            }
        } else {
            extent
        };
    }
    keys
}

/// Vertex pairs along the breadth-first tree route from `from` to `to`.
fn route(
    axis: &AxisGraph,
    from: VertexId,
    to: VertexId,
    avoid_structural: bool,
) -> Option<Vec<(VertexId, VertexId)>> {
    let tree = alg::breadth_first_tree_with(&axis.graph, from, |_, _, &id| {
        !avoid_structural || axis.anchors.get(id).is_some_and(|a| !a.is_structural())
    });
    let parents: BTreeMap<VertexId, VertexId> = tree.into_iter().map(|(p, c)| (c, p)).collect();
    let mut steps = Vec::new();
    let mut cur = to;
    while cur != from {
        let parent = *parents.get(&cur)?;
        steps.push((parent, cur));
        cur = parent;
    }
    steps.reverse();
    Some(steps)
}

fn connected_items(axis: &AxisGraph) -> BTreeSet<ItemId> {
    let first = axis.layout.first;
    std::iter::once(first)
        .chain(alg::breadth_first_tree(&axis.graph, first).into_iter().map(|(_, w)| w))
        .filter_map(|v| match axis.point_of(v)?.item {
            ItemRef::Item(id) => Some(id),
            ItemRef::Layout => None,
        })
        .collect()
}
