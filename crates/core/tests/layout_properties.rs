// Property-based tests for the column layout engine.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use sheetshape_core::layout::{compute_prune, compute_reorder, prune_row};

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Unique header plus a shuffled subset of it.
fn arb_header_and_selection() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    prop::collection::hash_set("[A-Za-z]{1,5}", 0..10)
        .prop_map(|set| set.into_iter().collect::<Vec<String>>())
        .prop_flat_map(|header| {
            let len = header.len();
            let selection = prop::sample::subsequence(header.clone(), 0..=len).prop_shuffle();
            (Just(header), selection)
        })
}

fn arb_row() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            3 => "[a-z0-9]{1,6}",
            1 => Just(String::new()),
        ],
        0..12,
    )
}

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn final_header_is_selection_then_remainder((header, desired) in arb_header_and_selection()) {
        let plan = compute_reorder(&header, &desired);

        let mut expected = desired.clone();
        expected.extend(header.iter().filter(|h| !desired.contains(h)).cloned());
        prop_assert_eq!(&plan.header, &expected);
        prop_assert_eq!(plan.header.len(), header.len());
    }

    #[test]
    fn remapped_cells_come_from_column_map(
        (header, desired) in arb_header_and_selection(),
        row in arb_row(),
    ) {
        let plan = compute_reorder(&header, &desired);
        let remapped = plan.remap_row(&row);

        prop_assert_eq!(remapped.len(), plan.column_map.len());
        for (i, cell) in remapped.iter().enumerate() {
            let expected = plan.column_map[i]
                .and_then(|src| row.get(src))
                .cloned()
                .unwrap_or_default();
            prop_assert_eq!(cell, &expected);
        }
    }

    #[test]
    fn prune_indices_strictly_descending_and_complete((header, desired) in arb_header_and_selection()) {
        let deletes = compute_prune(&header, &desired);

        prop_assert!(deletes.windows(2).all(|w| w[0] > w[1]));
        for (idx, name) in header.iter().enumerate() {
            prop_assert_eq!(deletes.contains(&idx), !desired.contains(name));
        }
    }

    #[test]
    fn pruned_header_keeps_selected_in_original_order((header, desired) in arb_header_and_selection()) {
        let deletes = compute_prune(&header, &desired);
        let surviving = prune_row(&header, &deletes);

        let expected: Vec<String> = header.iter().filter(|h| desired.contains(h)).cloned().collect();
        prop_assert_eq!(surviving, expected);
    }
}
