use crate::ResourceTable;

#[test]
fn ids_are_strictly_monotonic_from_zero() {
    let mut table = ResourceTable::new();
    assert_eq!(table.insert("a"), 0);
    assert_eq!(table.insert("b"), 1);
    assert_eq!(table.insert("c"), 2);
    assert_eq!(table.next_id(), 3);
    assert_eq!(table.get(0), Some(&"a"));
    assert_eq!(table.get(2), Some(&"c"));
    assert_eq!(table.get(3), None);
}

#[test]
fn tables_are_independent_namespaces() {
    let mut shaders = ResourceTable::new();
    let mut buffers = ResourceTable::new();
    assert_eq!(shaders.insert("shader"), 0);
    assert_eq!(buffers.insert(16usize), 0);
    assert_eq!(shaders.get(0), Some(&"shader"));
    assert_eq!(buffers.get(0), Some(&16));
}

#[test]
fn lookup_of_a_never_issued_id_is_none() {
    let table: ResourceTable<u32> = ResourceTable::new();
    assert!(table.is_empty());
    assert_eq!(table.get(0), None);
}
