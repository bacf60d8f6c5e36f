//! Linear-time selection (Hoare's quickselect), used by [`crate::dct_hasher`]
//! to find the median AC coefficient without a full sort.

/// Returns the value that would be at index `k` of `arr` were it sorted
/// ascending, without fully sorting it. `arr` is reordered in place (its
/// final order is unspecified beyond the partition invariant around `k`).
///
/// # Panics
/// Panics if `k >= arr.len()` or `arr` is empty.
pub fn quickselect(arr: &mut [f64], k: usize) -> f64 {
    assert!(!arr.is_empty(), "quickselect on empty slice");
    assert!(k < arr.len(), "k out of bounds");

    let mut lo = 0;
    let mut hi = arr.len() - 1;

    loop {
        if lo == hi {
            return arr[lo];
        }
        let pivot_index = hoare_partition(arr, lo, hi);
        if k <= pivot_index {
            hi = pivot_index;
        } else {
            lo = pivot_index + 1;
        }
    }
}

/// Hoare partition scheme around the midpoint element, returning an index `p`
/// such that every element in `arr[lo..=p]` is <= every element in
/// `arr[p+1..=hi]`.
fn hoare_partition(arr: &mut [f64], lo: usize, hi: usize) -> usize {
    let pivot = arr[lo + (hi - lo) / 2];
    let mut i = lo.wrapping_sub(1);
    let mut j = hi + 1;

    loop {
        loop {
            i = i.wrapping_add(1);
            if arr[i] >= pivot {
                break;
            }
        }
        loop {
            j -= 1;
            if arr[j] <= pivot {
                break;
            }
        }
        if i >= j {
            return j;
        }
        arr.swap(i, j);
    }
}
