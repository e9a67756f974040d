#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Returns the `n` rows with the smallest (`Ascending`) or largest
/// (`Descending`) key. Rows with equal keys keep their input order. Fewer
/// than `n` rows yields all of them.
pub fn top_n<'a, T, K, F>(rows: &'a [T], n: usize, order: SortOrder, key: F) -> Vec<&'a T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut out: Vec<&T> = rows.iter().collect();
    match order {
        SortOrder::Ascending => out.sort_by(|a, b| key(*a).cmp(&key(*b))),
        SortOrder::Descending => out.sort_by(|a, b| key(*b).cmp(&key(*a))),
    }
    out.truncate(n);
    out
}
