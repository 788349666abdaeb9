use crate::{
    DocValuesConfig, FieldInfo, FieldValues, ValueType,
    producer::{SortedColumn, SortedSetColumn},
};

use super::{
    data_generator::{random_sorted, random_sorted_set},
    segment_store::SegmentStore,
};

fn check_sorted(reader: &crate::DocValuesReader, id: u32, column: &SortedColumn, max_doc: u32) {
    let values = reader.sorted(id).unwrap();
    assert_eq!(values.term_count(), column.terms().len() as u64);
    assert_eq!(values.docs().unwrap(), column.docs());
    let mut next = 0;
    for doc in 0..max_doc {
        if column.docs().get(next) == Some(&doc) {
            let ord = column.ords()[next];
            assert_eq!(values.ord(doc).unwrap(), Some(ord));
            assert_eq!(values.get(doc).unwrap().unwrap(), column.terms()[ord as usize]);
            next += 1;
        } else {
            assert_eq!(values.ord(doc).unwrap(), None);
        }
    }
    for (ord, term) in column.terms().iter().enumerate() {
        assert_eq!(values.lookup_ord(ord as u64).unwrap(), *term);
        assert_eq!(values.lookup_term(term).unwrap(), Some(ord as u64));
    }
}

#[test]
fn test_sorted_random_round_trip() {
    let mut rng = fastrand::Rng::with_seed(1234);
    let max_doc = 10_000;
    let columns = [
        random_sorted(&mut rng, max_doc, 0.9, 10),
        random_sorted(&mut rng, max_doc, 0.5, 3000),
        random_sorted(&mut rng, max_doc, 0.01, 50),
    ];
    let mut store = SegmentStore::new(max_doc);
    for (id, column) in columns.iter().enumerate() {
        let summary = store
            .add(
                &FieldInfo::new(id as u32, ValueType::Sorted),
                FieldValues::Sorted(column),
            )
            .unwrap();
        let terms = summary.terms.unwrap();
        assert_eq!(terms.term_count, column.terms().len() as u64);
    }
    let reader = store.finish();
    for (id, column) in columns.iter().enumerate() {
        check_sorted(&reader, id as u32, column, max_doc);
    }
}

#[test]
fn test_every_document_its_own_term() {
    let max_doc = 5000;
    let values: Vec<(u32, String)> = (0..max_doc).map(|doc| (doc, format!("term-{doc:06}"))).collect();
    let column = SortedColumn::from_terms(&values);
    let config = DocValuesConfig::default()
        .with_terms_dict_block_shift(4)
        .with_terms_dict_reverse_index_shift(6);
    let mut store = SegmentStore::with_config(max_doc, config);
    let summary = store
        .add(
            &FieldInfo::new(0, ValueType::Sorted),
            FieldValues::Sorted(&column),
        )
        .unwrap();
    assert_eq!(summary.terms.unwrap().num_blocks, (max_doc as u64).div_ceil(16));
    let reader = store.finish();
    check_sorted(&reader, 0, &column, max_doc);

    let sorted = reader.sorted(0).unwrap();
    assert_eq!(sorted.seek_ceil(b"term-001234").unwrap(), Some(1234));
    assert_eq!(sorted.seek_ceil(b"term-0012345").unwrap(), Some(1235));
    assert_eq!(sorted.seek_ceil(b"").unwrap(), Some(0));
    assert_eq!(sorted.seek_ceil(b"u").unwrap(), None);
    assert_eq!(sorted.lookup_term(b"term-0012345").unwrap(), None);
}

#[test]
fn test_ordinals_follow_term_order() {
    let column = SortedColumn::from_terms(&[(0, "pear"), (1, "apple"), (3, "zucchini"), (4, "apple")]);
    assert_eq!(column.ords(), [1, 0, 2, 0]);

    let mut store = SegmentStore::new(5);
    let summary = store
        .add(
            &FieldInfo::new(0, ValueType::Sorted),
            FieldValues::Sorted(&column),
        )
        .unwrap();
    assert_ne!(summary.encoding, Some("table"));
    let reader = store.finish();
    let entry = reader.field(0).unwrap().numeric().unwrap();
    assert_eq!(entry.values.encoding().gcd(), 1);

    let sorted = reader.sorted(0).unwrap();
    assert_eq!(sorted.lookup_ord(0).unwrap(), b"apple");
    assert_eq!(sorted.get(1).unwrap().unwrap(), b"apple");
    assert_eq!(sorted.get(2).unwrap(), None);
    assert_eq!(sorted.get(3).unwrap().unwrap(), b"zucchini");
}

#[test]
fn test_single_term_sorted() {
    let column = SortedColumn::from_terms(&[(2, "only"), (5, "only")]);
    let mut store = SegmentStore::new(8);
    let summary = store
        .add(
            &FieldInfo::new(0, ValueType::Sorted),
            FieldValues::Sorted(&column),
        )
        .unwrap();
    assert_eq!(summary.encoding, Some("constant"));
    let reader = store.finish();
    let sorted = reader.sorted(0).unwrap();
    assert_eq!(sorted.get(5).unwrap().unwrap(), b"only");
    assert_eq!(sorted.get(4).unwrap(), None);
}

#[test]
fn test_sorted_set_random_round_trip() {
    let mut rng = fastrand::Rng::with_seed(77);
    let max_doc = 6000;
    let multi = random_sorted_set(&mut rng, max_doc, 0.7, 400, 6);
    let single = random_sorted_set(&mut rng, max_doc, 0.4, 100, 1);

    let mut store = SegmentStore::new(max_doc);
    for (id, column) in [(0, &multi), (1, &single)] {
        store
            .add(
                &FieldInfo::new(id, ValueType::SortedSet),
                FieldValues::SortedSet(column),
            )
            .unwrap();
    }
    let reader = store.finish();
    assert!(!reader.sorted_set(0).unwrap().is_single_valued());
    assert!(reader.sorted_set(1).unwrap().is_single_valued());

    for (id, column) in [(0, &multi), (1, &single)] {
        let values = reader.sorted_set(id).unwrap();
        assert_eq!(values.term_count(), column.terms().len() as u64);
        assert_eq!(values.docs().unwrap(), column.docs());
        let mut next = 0;
        for doc in 0..max_doc {
            if column.docs().get(next) == Some(&doc) {
                let ords = column.ords(next);
                assert_eq!(values.ords(doc).unwrap(), ords);
                let terms: Vec<Vec<u8>> = ords
                    .iter()
                    .map(|&ord| column.terms()[ord as usize].clone())
                    .collect();
                assert_eq!(values.terms(doc).unwrap(), terms);
                next += 1;
            } else {
                assert!(values.ords(doc).unwrap().is_empty());
            }
        }
    }
}

#[test]
fn test_sorted_set_duplicates_collapse() {
    let column = SortedSetColumn::from_terms(&[
        (0, vec!["b", "a", "b"]),
        (2, vec!["c"]),
        (3, vec!["a", "c", "b"]),
    ]);
    let mut store = SegmentStore::new(4);
    let summary = store
        .add(
            &FieldInfo::new(9, ValueType::SortedSet),
            FieldValues::SortedSet(&column),
        )
        .unwrap();
    assert_eq!(summary.num_docs_with_value, 3);
    assert_eq!(summary.num_values, 6);
    let reader = store.finish();
    let values = reader.sorted_set(9).unwrap();
    assert_eq!(values.ords(0).unwrap(), [0, 1]);
    assert_eq!(values.ords(1).unwrap(), Vec::<u64>::new());
    assert_eq!(values.terms(3).unwrap(), [b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    assert_eq!(values.seek_ceil(b"bb").unwrap(), Some(2));
}

#[test]
fn test_empty_dictionary_fields() {
    let sorted = SortedColumn::default();
    let sorted_set = SortedSetColumn::new(Vec::new(), Vec::new());
    let mut store = SegmentStore::new(100);
    let summary = store
        .add(
            &FieldInfo::new(0, ValueType::Sorted),
            FieldValues::Sorted(&sorted),
        )
        .unwrap();
    assert_eq!(summary.terms.unwrap().term_count, 0);
    store
        .add(
            &FieldInfo::new(1, ValueType::SortedSet),
            FieldValues::SortedSet(&sorted_set),
        )
        .unwrap();
    let reader = store.finish();
    let values = reader.sorted(0).unwrap();
    assert_eq!(values.term_count(), 0);
    assert_eq!(values.get(50).unwrap(), None);
    assert_eq!(values.seek_ceil(b"a").unwrap(), None);
    assert!(values.lookup_ord(0).is_err());
    let values = reader.sorted_set(1).unwrap();
    assert!(values.ords(99).unwrap().is_empty());
}
