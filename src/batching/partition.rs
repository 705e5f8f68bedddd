use super::error::RerankError;

/// A contiguous run of the submitted documents.
#[derive(Debug, PartialEq)]
pub struct Batch<'a, T> {
    /// Absolute position of `items[0]` in the full input.
    pub start: usize,
    pub items: &'a [T],
}

impl<T> Batch<'_, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Absolute index of the batch-local position `local`.
    pub fn absolute_index(&self, local: usize) -> usize {
        self.start + local
    }
}

/// Lazy iterator returned by [`partition`].
#[derive(Debug, Clone)]
pub struct Batches<'a, T> {
    chunks: std::slice::Chunks<'a, T>,
    next_start: usize,
}

impl<'a, T> Iterator for Batches<'a, T> {
    type Item = Batch<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let items = self.chunks.next()?;
        let start = self.next_start;
        self.next_start += items.len();
        Some(Batch { start, items })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<T> ExactSizeIterator for Batches<'_, T> {}

/// Splits `items` into in-order batches of at most `batch_size` elements.
///
/// Empty input yields no batches. A `batch_size` of zero is rejected.
pub fn partition<T>(items: &[T], batch_size: usize) -> Result<Batches<'_, T>, RerankError> {
    if batch_size == 0 {
        return Err(RerankError::invalid_argument("batch size must be at least 1"));
    }

    Ok(Batches {
        chunks: items.chunks(batch_size),
        next_start: 0,
    })
}
