use crate::producer::{
    BinaryColumn, NumericColumn, SortedColumn, SortedNumericColumn, SortedSetColumn,
};

/// Picks each document of `0..max_doc` with probability `density`.
pub fn random_docs(rng: &mut fastrand::Rng, max_doc: u32, density: f64) -> Vec<u32> {
    (0..max_doc).filter(|_| rng.f64() < density).collect()
}

pub fn random_numeric(
    rng: &mut fastrand::Rng,
    max_doc: u32,
    density: f64,
    values: std::ops::Range<i64>,
) -> NumericColumn {
    random_docs(rng, max_doc, density)
        .into_iter()
        .map(|doc| (doc, rng.i64(values.clone())))
        .collect()
}

pub fn random_sorted_numeric(
    rng: &mut fastrand::Rng,
    max_doc: u32,
    density: f64,
    max_values_per_doc: usize,
) -> SortedNumericColumn {
    random_docs(rng, max_doc, density)
        .into_iter()
        .map(|doc| {
            let count = rng.usize(1..=max_values_per_doc);
            let values: Vec<i64> = (0..count).map(|_| rng.i64(-1000..1000)).collect();
            (doc, values)
        })
        .collect()
}

pub fn random_term(rng: &mut fastrand::Rng, max_len: usize) -> String {
    let len = rng.usize(1..=max_len);
    (0..len).map(|_| rng.alphanumeric()).collect()
}

pub fn random_binary(rng: &mut fastrand::Rng, max_doc: u32, density: f64) -> BinaryColumn {
    random_docs(rng, max_doc, density)
        .into_iter()
        .map(|doc| {
            let len = rng.usize(0..50);
            let value: Vec<u8> = std::iter::repeat_with(|| rng.u8(..)).take(len).collect();
            (doc, value)
        })
        .collect()
}

pub fn random_sorted(
    rng: &mut fastrand::Rng,
    max_doc: u32,
    density: f64,
    cardinality: usize,
) -> SortedColumn {
    let terms: Vec<String> = (0..cardinality).map(|_| random_term(rng, 20)).collect();
    let values: Vec<(u32, String)> = random_docs(rng, max_doc, density)
        .into_iter()
        .map(|doc| (doc, terms[rng.usize(..terms.len())].clone()))
        .collect();
    SortedColumn::from_terms(&values)
}

pub fn random_sorted_set(
    rng: &mut fastrand::Rng,
    max_doc: u32,
    density: f64,
    cardinality: usize,
    max_values_per_doc: usize,
) -> SortedSetColumn {
    let terms: Vec<String> = (0..cardinality).map(|_| random_term(rng, 20)).collect();
    let values: Vec<(u32, Vec<String>)> = random_docs(rng, max_doc, density)
        .into_iter()
        .map(|doc| {
            let count = rng.usize(1..=max_values_per_doc);
            let doc_terms = (0..count)
                .map(|_| terms[rng.usize(..terms.len())].clone())
                .collect();
            (doc, doc_terms)
        })
        .collect();
    SortedSetColumn::from_terms(&values)
}
