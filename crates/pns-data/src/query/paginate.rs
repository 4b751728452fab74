//! Page slicing for the listing grid

/// Number of pages needed for `total` items; a zero page size counts as 1
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Slice one page out of `items`; out-of-range pages are empty
pub fn page_slice<T>(items: &[T], page_index: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page_index.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}
