use docvalues_encodings::skip_index::NO_MORE_DOCS;

use crate::{
    DocValuesConfig, FieldInfo, FieldValues, ValueType,
    producer::{NumericColumn, SortedNumericColumn},
};

use super::{data_generator::random_sorted_numeric, segment_store::SegmentStore};

fn small_intervals() -> DocValuesConfig {
    DocValuesConfig::default().with_skip_index_interval_size(128)
}

#[test]
fn test_skipper_levels() {
    let max_doc = 20_000;
    let column: NumericColumn = (0..max_doc).map(|doc| (doc, doc as i64)).collect();
    let mut store = SegmentStore::with_config(max_doc, small_intervals());
    store
        .add(
            &FieldInfo::new(0, ValueType::Numeric).with_skip_index(),
            FieldValues::Numeric(&column),
        )
        .unwrap();
    let reader = store.finish();

    let mut skipper = reader.skipper(0).unwrap().unwrap();
    assert_eq!(skipper.global_doc_count(), max_doc as i32);
    assert_eq!(skipper.global_min_value(), 0);
    assert_eq!(skipper.global_max_value(), max_doc as i64 - 1);

    skipper.advance(1000).unwrap();
    assert_eq!(skipper.num_levels(), 3);
    assert_eq!((skipper.min_doc_id(0), skipper.max_doc_id(0)), (896, 1023));
    assert_eq!((skipper.min_value(0), skipper.max_value(0)), (896, 1023));
    assert_eq!(skipper.doc_count(0), 128);
    assert_eq!((skipper.min_doc_id(1), skipper.max_doc_id(1)), (0, 1023));
    assert_eq!(skipper.doc_count(1), 1024);
    assert_eq!((skipper.min_doc_id(2), skipper.max_doc_id(2)), (0, 8191));

    skipper.advance(1010).unwrap();
    assert_eq!(skipper.min_doc_id(0), 896);

    skipper.advance(19_999).unwrap();
    assert_eq!((skipper.min_doc_id(0), skipper.max_doc_id(0)), (19_968, 19_999));
    assert_eq!(skipper.doc_count(0), 32);

    skipper.advance(max_doc).unwrap();
    assert_eq!(skipper.min_doc_id(0), NO_MORE_DOCS);
    assert_eq!(skipper.max_doc_id(0), NO_MORE_DOCS);
}

#[test]
fn test_skipper_intervals_contain_their_values() {
    let mut rng = fastrand::Rng::with_seed(3);
    let max_doc = 30_000;
    let column = random_sorted_numeric(&mut rng, max_doc, 0.4, 3);
    let mut store = SegmentStore::with_config(max_doc, small_intervals());
    store
        .add(
            &FieldInfo::new(4, ValueType::SortedNumeric).with_skip_index(),
            FieldValues::SortedNumeric(&column),
        )
        .unwrap();
    let reader = store.finish();
    let mut skipper = reader.skipper(4).unwrap().unwrap();
    let docs = column.docs();

    let mut targets: Vec<u32> = (0..200).map(|_| rng.u32(0..max_doc)).collect();
    targets.sort_unstable();
    for target in targets {
        skipper.advance(target).unwrap();
        if skipper.min_doc_id(0) == NO_MORE_DOCS {
            assert!(docs.last().is_none_or(|&last| last < target));
            continue;
        }
        assert!(skipper.max_doc_id(0) >= target as i32);
        for level in 0..skipper.num_levels() {
            let (min_doc, max_doc) = (skipper.min_doc_id(level), skipper.max_doc_id(level));
            let mut count = 0;
            for (index, &doc) in docs.iter().enumerate() {
                if (doc as i32) < min_doc || (doc as i32) > max_doc {
                    continue;
                }
                count += 1;
                for &value in column.values(index) {
                    assert!(skipper.min_value(level) <= value);
                    assert!(value <= skipper.max_value(level));
                }
            }
            assert_eq!(count, skipper.doc_count(level), "level {level}");
        }
        // No document with a value lies between the target and the leaf.
        assert!(
            !docs
                .iter()
                .any(|&doc| doc >= target && (doc as i32) < skipper.min_doc_id(0))
        );
    }
}

#[test]
fn test_repeated_value_run_stays_in_one_leaf() {
    let column: NumericColumn = (0..1000).map(|doc| (doc, 5)).collect();
    let mut store = SegmentStore::with_config(1000, small_intervals());
    store
        .add(
            &FieldInfo::new(0, ValueType::Numeric).with_skip_index(),
            FieldValues::Numeric(&column),
        )
        .unwrap();
    let reader = store.finish();
    let mut skipper = reader.skipper(0).unwrap().unwrap();
    skipper.advance(0).unwrap();
    assert_eq!((skipper.min_doc_id(0), skipper.max_doc_id(0)), (0, 999));
    assert_eq!(skipper.doc_count(0), 1000);
    assert_eq!((skipper.min_value(0), skipper.max_value(0)), (5, 5));
}

#[test]
fn test_skipper_absent_and_empty() {
    let column: NumericColumn = (0..10).map(|doc| (doc, 1)).collect();
    let empty = SortedNumericColumn::new();
    let mut store = SegmentStore::new(10);
    store
        .add(
            &FieldInfo::new(0, ValueType::Numeric),
            FieldValues::Numeric(&column),
        )
        .unwrap();
    store
        .add(
            &FieldInfo::new(1, ValueType::SortedNumeric).with_skip_index(),
            FieldValues::SortedNumeric(&empty),
        )
        .unwrap();
    let reader = store.finish();
    assert!(reader.skipper(0).unwrap().is_none());

    let mut skipper = reader.skipper(1).unwrap().unwrap();
    assert_eq!(skipper.global_doc_count(), 0);
    skipper.advance(0).unwrap();
    assert_eq!(skipper.min_doc_id(0), NO_MORE_DOCS);
}
