use timeable_types::Chunked;

/// Splits `items` into consecutive groups of `size`; the last group holds the
/// remainder.
///
/// A `size` of 0 means "no chunking" and hands back the same slice untouched.
///
/// ```
/// use timeable_types::Chunked;
/// use timeable_utils::chunk;
///
/// let items = [1, 2, 3, 4, 5];
/// assert_eq!(
///     chunk(&items, 2),
///     Chunked::Groups(vec![&[1, 2][..], &[3, 4][..], &[5][..]])
/// );
/// ```
#[must_use]
pub fn chunk<T>(items: &[T], size: usize) -> Chunked<'_, T> {
    if size == 0 {
        return Chunked::Flat(items);
    }
    Chunked::Groups(items.chunks(size).collect())
}
