//! Ordered-list helpers for child, attacher and connection lists.

/// Insert `item` at `index` (clamped), or append. Returns the final index.
///
/// An item already in the list is moved rather than duplicated.
pub fn add<T: PartialEq>(list: &mut Vec<T>, item: T, index: Option<usize>) -> usize {
    if let Some(existing) = list.iter().position(|candidate| *candidate == item) {
        list.remove(existing);
    }
    let index = index.map_or(list.len(), |index| index.min(list.len()));
    list.insert(index, item);
    index
}

/// Remove `item`, returning the index it had.
pub fn remove<T: PartialEq>(list: &mut Vec<T>, item: &T) -> Option<usize> {
    let index = list.iter().position(|candidate| candidate == item)?;
    list.remove(index);
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut list = vec!["a", "b"];
        assert_eq!(add(&mut list, "c", Some(1)), 1);
        assert_eq!(list, vec!["a", "c", "b"]);
        assert_eq!(add(&mut list, "d", Some(10)), 3);
        assert_eq!(add(&mut list, "a", None), 3);
        assert_eq!(list, vec!["c", "b", "d", "a"]);
        assert_eq!(remove(&mut list, &"b"), Some(1));
        assert_eq!(remove(&mut list, &"x"), None);
    }
}
