use std::collections::BTreeSet;

use gradeimport_map::ResolutionEngine;
use gradeimport_model::{CellValue, SourceRow};
use proptest::prelude::*;

fn cell() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Empty),
        "[a-z张李王]{1,12}".prop_map(CellValue::Text),
        (0u32..700).prop_map(|n| CellValue::Number(f64::from(n))),
    ]
}

fn header_set() -> impl Strategy<Value = Vec<String>> {
    let header = prop_oneof![
        Just("姓名".to_string()),
        Just("学号".to_string()),
        Just("班级".to_string()),
        Just("总分".to_string()),
        Just("数学".to_string()),
        "[A-Za-z0-9 _]{1,10}",
        "[姓名学号班级语文数英总分排]{1,4}",
    ];
    prop::collection::btree_set(header, 1..7).prop_map(|set: BTreeSet<String>| {
        set.into_iter().collect()
    })
}

fn upload() -> impl Strategy<Value = (Vec<String>, Vec<SourceRow>)> {
    header_set().prop_flat_map(|headers| {
        let width = headers.len();
        let rows = prop::collection::vec(prop::collection::vec(cell(), width), 1..8);
        (Just(headers), rows)
    })
    .prop_map(|(headers, grid)| {
        let rows = grid
            .into_iter()
            .map(|cells| headers.iter().cloned().zip(cells).collect::<SourceRow>())
            .collect();
        (headers, rows)
    })
}

proptest! {
    #[test]
    fn every_upload_resolves((headers, rows) in upload()) {
        let engine = ResolutionEngine::default();
        let result = engine.resolve(&headers, &rows, None).expect("non-empty upload resolves");

        prop_assert!(result.can_proceed);
        prop_assert!(!result.mapping.is_empty());
        prop_assert!((0.0..=1.0).contains(&result.confidence));
        prop_assert!(result.mapping.duplicate_targets().is_empty());
        for (header, target) in result.mapping.iter() {
            prop_assert!(headers.iter().any(|h| h == header));
            prop_assert!(engine.registry().is_known_target(target));
        }
    }

    #[test]
    fn resolution_is_deterministic((headers, rows) in upload()) {
        let engine = ResolutionEngine::default();
        let first = engine.resolve(&headers, &rows, None).expect("resolve");
        let second = engine.resolve(&headers, &rows, None).expect("resolve");

        prop_assert_eq!(&first.mapping, &second.mapping);
        prop_assert_eq!(first.confidence, second.confidence);
        prop_assert_eq!(first.strategy, second.strategy);
    }
}
