// This is actually defined at `crate::table::tests_for_table`

use super::*;

#[test]
fn add_is_idempotent() {
    let mut t = IndexedTable::new();
    let a = t.add("a".to_string());
    let b = t.add("b".to_string());
    assert_eq!(t.add("a".to_string()), a);
    assert_eq!(t.add("b".to_string()), b);
    assert_ne!(a, b);
    assert_eq!(t.len(), 2);
}

#[test]
fn ids_are_issued_in_insertion_order() {
    let t: IndexedTable<&str> = ["x", "y", "x", "z"].into_iter().collect();
    assert_eq!(t.id_of(&"x"), Some(0));
    assert_eq!(t.id_of(&"y"), Some(1));
    assert_eq!(t.id_of(&"z"), Some(2));
    assert_eq!(t.id_of(&"w"), None);
}

#[test]
fn get_is_the_inverse_of_add() {
    let mut t = IndexedTable::new();
    let ids: Vec<usize> = [vec![1, 2], vec![], vec![2, 1], vec![1, 2]]
        .into_iter()
        .map(|v| t.add(v))
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 0]);
    for &id in &ids {
        assert_eq!(t.add(t[id].clone()), id);
    }
    assert_eq!(t.get(1), Some(&vec![]));
    assert_eq!(t.get(3), None);
}

#[test]
fn iteration_is_restartable() {
    let t: IndexedTable<u32> = [3, 1, 3, 2].into_iter().collect();
    let first: Vec<u32> = t.iter().copied().collect();
    let second: Vec<u32> = (&t).into_iter().copied().collect();
    assert_eq!(first, vec![3, 1, 2]);
    assert_eq!(first, second);
    assert!(!t.is_empty());
    assert!(IndexedTable::<u32>::new().is_empty());
}
