//! A Vantage-Point tree metric index: build once over an immutable set of
//! identifiers plus a distance function, then answer epsilon-radius
//! neighbor queries using triangle-inequality pruning. Safe to query
//! concurrently once built, since nothing about the tree mutates after
//! construction.

/// Maximum number of items a leaf may hold before it's worth splitting
/// further. Small buckets are scanned linearly rather than recursed into.
const LEAF_CAPACITY: usize = 8;

enum Node<T> {
    Leaf(Vec<T>),
    Inner {
        pivot: T,
        threshold: f64,
        inside: Box<Node<T>>,
        outside: Box<Node<T>>,
    },
}

fn build_node<T, D>(mut points: Vec<T>, distance: &D) -> Option<Node<T>>
where
    T: Clone,
    D: Fn(&T, &T) -> f64,
{
    if points.is_empty() {
        return None;
    }
    if points.len() <= LEAF_CAPACITY {
        return Some(Node::Leaf(points));
    }

    // Deterministic pivot choice: fine for the hash-space point sets this
    // pipeline builds, which have no adversarial ordering.
    let pivot = points.remove(0);

    let mut with_dist: Vec<(T, f64)> = points
        .into_iter()
        .map(|p| {
            let d = distance(&pivot, &p);
            (p, d)
        })
        .collect();
    with_dist.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    let mid = with_dist.len() / 2;
    let threshold = with_dist[mid].1;

    let (inside_pairs, outside_pairs): (Vec<_>, Vec<_>) =
        with_dist.into_iter().partition(|(_, d)| *d <= threshold);

    let inside: Vec<T> = inside_pairs.into_iter().map(|(p, _)| p).collect();
    let outside: Vec<T> = outside_pairs.into_iter().map(|(p, _)| p).collect();

    let inside_node = build_node(inside, distance).unwrap_or(Node::Leaf(vec![]));
    let outside_node = build_node(outside, distance).unwrap_or(Node::Leaf(vec![]));

    Some(Node::Inner {
        pivot,
        threshold,
        inside: Box::new(inside_node),
        outside: Box::new(outside_node),
    })
}

pub struct VpTree<T, D> {
    root: Option<Node<T>>,
    distance: D,
}

impl<T, D> VpTree<T, D>
where
    T: Clone,
    D: Fn(&T, &T) -> f64,
{
    /// Builds a VP-tree over `points` using `distance` as the metric. The
    /// distance function is expected to be a true metric (symmetric,
    /// triangle-inequality-respecting) or neighbor queries will silently
    /// miss results.
    pub fn build(points: Vec<T>, distance: D) -> Self {
        let root = build_node(points, &distance);
        Self { root, distance }
    }

    /// Returns every point within `eps` of `query` (distance as computed by
    /// the tree's metric), pruning subtrees the triangle inequality rules
    /// out.
    pub fn neighbors_within(&self, query: &T, eps: f64) -> Vec<T> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            self.visit(root, query, eps, &mut out);
        }
        out
    }

    fn visit(&self, node: &Node<T>, query: &T, eps: f64, out: &mut Vec<T>) {
        match node {
            Node::Leaf(items) => {
                for item in items {
                    if (self.distance)(query, item) <= eps {
                        out.push(item.clone());
                    }
                }
            }
            Node::Inner {
                pivot,
                threshold,
                inside,
                outside,
            } => {
                let d = (self.distance)(query, pivot);
                if d <= eps {
                    out.push(pivot.clone());
                }
                if d - eps <= *threshold {
                    self.visit(inside, query, eps, out);
                }
                if d + eps >= *threshold {
                    self.visit(outside, query, eps, out);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::prelude::*;

    fn linear_scan(points: &[f64], query: f64, eps: f64) -> Vec<f64> {
        points
            .iter()
            .copied()
            .filter(|p| (p - query).abs() <= eps)
            .collect()
    }

    #[test]
    fn test_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(9);
        let points: Vec<f64> = (0..300).map(|_| rng.random_range(0.0..100.0)).collect();

        let dist = |a: &f64, b: &f64| (a - b).abs();
        let tree = VpTree::build(points.clone(), dist);

        for _ in 0..50 {
            let query = rng.random_range(0.0..100.0);
            let eps = rng.random_range(0.1..5.0);

            let mut expected = linear_scan(&points, query, eps);
            let mut actual = tree.neighbors_within(&query, eps);

            expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
            actual.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(expected.len(), actual.len());
        }
    }

    #[test]
    fn test_empty_tree() {
        let dist = |a: &f64, b: &f64| (a - b).abs();
        let tree: VpTree<f64, _> = VpTree::build(vec![], dist);
        assert!(tree.is_empty());
        assert!(tree.neighbors_within(&1.0, 5.0).is_empty());
    }

    #[test]
    fn test_triangle_inequality_pruning_is_exhaustive() {
        // Points clustered tightly with one outlier: make sure the outlier
        // doesn't get pruned away incorrectly when querying near the
        // cluster with a large eps that should reach it.
        let points = vec![0.0, 0.1, 0.2, 0.3, 50.0];
        let dist = |a: &f64, b: &f64| (a - b).abs();
        let tree = VpTree::build(points, dist);
        let found = tree.neighbors_within(&0.0, 50.0);
        assert_eq!(found.len(), 5);
    }
}
