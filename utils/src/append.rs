/// Appends every element of `items` to `accumulator` in place and hands the
/// same accumulator back.
///
/// ```
/// use timeable_utils::append;
///
/// let mut acc = vec![1, 2];
/// assert_eq!(append(&mut acc, [3, 4]), &[1, 2, 3, 4]);
/// ```
pub fn append<T, I>(accumulator: &mut Vec<T>, items: I) -> &mut Vec<T>
where
    I: IntoIterator<Item = T>,
{
    accumulator.extend(items);
    accumulator
}
