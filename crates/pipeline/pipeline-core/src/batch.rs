//! Splitting training data into sequential batches

/// Sizes of `batches` contiguous groups covering `len` items, the first
/// groups taking the remainder
pub fn batch_sizes(len: usize, batches: usize) -> Vec<usize> {
    let batches = batches.max(1);
    let base = len / batches;
    let extra = len % batches;
    (0..batches)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

/// Split `data` into `batches` contiguous groups
pub fn split_into_batches<T: Clone>(data: &[T], batches: usize) -> Vec<Vec<T>> {
    let mut start = 0;
    batch_sizes(data.len(), batches)
        .into_iter()
        .map(|size| {
            let group = data[start..start + size].to_vec();
            start += size;
            group
        })
        .collect()
}
