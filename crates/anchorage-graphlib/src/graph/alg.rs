//! Traversal helpers over [`Graph`].

use super::Graph;
use std::collections::{BTreeSet, VecDeque};
use std::hash::Hash;

/// Connected components, each sorted ascending, ordered by their smallest vertex.
pub fn components<V, E>(g: &Graph<V, E>) -> Vec<Vec<V>>
where
    V: Copy + Ord + Hash,
{
    let mut visited: BTreeSet<V> = BTreeSet::new();
    let mut out: Vec<Vec<V>> = Vec::new();
    for start in g.vertices() {
        if !visited.insert(start) {
            continue;
        }
        let mut component = vec![start];
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            for w in g.neighbors(v) {
                if visited.insert(w) {
                    component.push(w);
                    stack.push(w);
                }
            }
        }
        component.sort();
        out.push(component);
    }
    out
}

/// Breadth-first spanning tree rooted at `root`, as `(parent, child)` pairs in visit order.
pub fn breadth_first_tree<V, E>(g: &Graph<V, E>, root: V) -> Vec<(V, V)>
where
    V: Copy + Ord + Hash,
{
    breadth_first_tree_with(g, root, |_, _, _| true)
}

/// Like [`breadth_first_tree`], but only follows edges accepted by `follow(from, to, data)`.
pub fn breadth_first_tree_with<V, E, F>(g: &Graph<V, E>, root: V, mut follow: F) -> Vec<(V, V)>
where
    V: Copy + Ord + Hash,
    F: FnMut(V, V, &E) -> bool,
{
    let mut visited: BTreeSet<V> = BTreeSet::new();
    let mut queue: VecDeque<V> = VecDeque::new();
    let mut out: Vec<(V, V)> = Vec::new();
    visited.insert(root);
    queue.push_back(root);
    while let Some(v) = queue.pop_front() {
        for w in g.neighbors(v) {
            if visited.contains(&w) {
                continue;
            }
            let Some(data) = g.edge_data(v, w) else {
                continue;
            };
            if !follow(v, w, data) {
                continue;
            }
            visited.insert(w);
            out.push((v, w));
            queue.push_back(w);
        }
    }
    out
}
