use tracing::{debug, debug_span};

use super::{Lattice, LatticeError};

/// Sort the nodes reachable from `root` in reverse topological order.
///
/// A node is emitted only after every node reachable from it, so the sink
/// comes first and `root` last. The traversal is an iterative depth-first
/// search following outgoing links; a node reached along several paths is
/// visited once. The reachable subgraph must be acyclic.
pub fn topological_sort(lattice: &Lattice, root: usize) -> Result<Vec<usize>, LatticeError> {
    if root >= lattice.nodes().len() {
        return Err(LatticeError::NodeNotFound(root));
    }
    Ok(post_order(lattice, root))
}

/// Nodes reachable from the start node, start first.
pub fn forward_order(lattice: &Lattice) -> Vec<usize> {
    let mut order = post_order(lattice, lattice.start_node().index);
    order.reverse();
    order
}

fn post_order(lattice: &Lattice, root: usize) -> Vec<usize> {
    let _span = debug_span!("topological_sort", root).entered();
    let nodes = lattice.nodes();
    let links = lattice.links();
    let mut visited = vec![false; nodes.len()];
    let mut reverse_sort = Vec::with_capacity(nodes.len());
    // (node, position of the next out-link to follow)
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
    visited[root] = true;

    while let Some((node, next)) = stack.last_mut() {
        let out_links = &nodes[*node].out_links;
        if let Some(&link) = out_links.get(*next) {
            *next += 1;
            let child = links[link].end;
            if !visited[child] {
                visited[child] = true;
                stack.push((child, 0));
            }
        } else {
            reverse_sort.push(*node);
            stack.pop();
        }
    }

    debug!(sorted = reverse_sort.len());
    reverse_sort
}
