//! Round-trip fidelity: parse(write(data)) preserves the database

use elx::{
    BlockExclusion, ConditionExclusion, ExclusionData, ExclusionParser, ExclusionWriter,
    FsmExclusion, ToggleDirection, ToggleExclusion, WriterConfig,
};
use proptest::prelude::*;

fn reparse(data: &ExclusionData, config: WriterConfig) -> ExclusionData {
    let writer = ExclusionWriter::with_config(config);
    let rendered = writer.write_to_string(data);
    let mut parser = ExclusionParser::new();
    let result = parser.parse_str(&rendered, "roundtrip");
    assert!(result.success, "reparse failed: {:?}", result.error_message);
    parser.take_data()
}

fn sample_data() -> ExclusionData {
    let mut data = ExclusionData::default();
    data.generated_by = Some("verif_user".into());
    data.generation_date = Some("Tue Sep 13 14:22:01 2025".into());

    let ctrl = data.get_or_create_scope("tb.dut.u_ctrl", Some("272795094".into()), false);
    ctrl.add_toggle(
        ToggleExclusion::new(ToggleDirection::OneToZero, "rst_n", "net rst_n")
            .with_annotation("reset tested elsewhere"),
    );
    ctrl.add_toggle(
        ToggleExclusion::new(ToggleDirection::Both, "data_bus", "net data_bus[31:0]")
            .with_bit_index(7),
    );
    ctrl.add_fsm(FsmExclusion::state("arb_state", "85815111"));
    ctrl.add_fsm(FsmExclusion::transition("transition", "SND_RD_ADDR1", "IDLE", "11->0"));

    let dma = data.get_or_create_scope("dma_engine", Some("166669586".into()), true);
    dma.add_block(BlockExclusion::new("161", "1104666086", "do_db_reg_update = 1'b0;"));
    dma.add_condition(
        ConditionExclusion::new("2", "2940925445", "(enable && !reset) 1")
            .with_parameters("-1")
            .with_coverage("1 \"01\""),
    );
    data
}

#[test]
fn test_roundtrip_preserves_scopes_and_records() {
    let data = sample_data();
    let reparsed = reparse(&data, WriterConfig::default());

    assert_eq!(reparsed.scope_count(), data.scope_count());
    for (name, scope) in &data.scopes {
        let other = &reparsed.scopes[name];
        assert_eq!(other.is_module, scope.is_module);
        assert_eq!(other.checksum, scope.checksum);
        assert_eq!(other.block_exclusions, scope.block_exclusions);
        assert_eq!(other.toggle_exclusions, scope.toggle_exclusions);
        assert_eq!(other.fsm_exclusions, scope.fsm_exclusions);
        assert_eq!(other.condition_exclusions, scope.condition_exclusions);
    }
}

#[test]
fn test_roundtrip_preserves_header_fields() {
    let data = sample_data();
    let reparsed = reparse(&data, WriterConfig::default());
    assert_eq!(reparsed.generated_by, data.generated_by);
    assert_eq!(reparsed.generation_date, data.generation_date);
}

#[test]
fn test_double_roundtrip_of_embedded_quotes_is_stable() {
    let mut data = ExclusionData::default();
    let scope = data.get_or_create_scope("top", None, true);
    scope.add_block(BlockExclusion::new("b1", "1", "assert(\"msg\");"));

    let once = reparse(&data, WriterConfig::default());
    assert_eq!(
        once.scopes["top"].block_exclusions["b1"].source_code,
        "assert(\"msg\");"
    );
    // Escaping is symmetric, so a second trip must not grow backslashes
    let twice = reparse(&once, WriterConfig::default());
    assert_eq!(
        twice.scopes["top"].block_exclusions["b1"].source_code,
        "assert(\"msg\");"
    );
}

#[test]
fn test_write_is_idempotent() {
    let data = sample_data();
    let writer = ExclusionWriter::new();
    // The header date is pinned, so two renders must be byte-identical
    assert_eq!(writer.write_to_string(&data), writer.write_to_string(&data));
}

#[test]
fn test_sorted_output_is_order_independent() {
    let mut forward = ExclusionData::default();
    let scope = forward.get_or_create_scope("beta", None, true);
    scope.add_block(BlockExclusion::new("b1", "1", "x;"));
    forward.get_or_create_scope("alpha", None, true);

    let mut backward = ExclusionData::default();
    backward.get_or_create_scope("alpha", None, true);
    let scope = backward.get_or_create_scope("beta", None, true);
    scope.add_block(BlockExclusion::new("b1", "1", "x;"));

    let writer = ExclusionWriter::with_config(WriterConfig {
        include_comments: false,
        generate_checksums: false,
        sort_exclusions: true,
        ..WriterConfig::default()
    });
    let rendered = writer.write_to_string(&forward);
    assert_eq!(rendered, writer.write_to_string(&backward));
    // Lexicographic scope order regardless of insertion order
    assert!(rendered.find("MODULE:alpha").unwrap() < rendered.find("MODULE:beta").unwrap());
}

#[test]
fn test_unsorted_output_preserves_insertion_order() {
    let mut data = ExclusionData::default();
    data.get_or_create_scope("beta", None, true);
    data.get_or_create_scope("alpha", None, true);

    let writer = ExclusionWriter::with_config(WriterConfig {
        include_comments: false,
        generate_checksums: false,
        ..WriterConfig::default()
    });
    let rendered = writer.write_to_string(&data);
    assert!(rendered.find("MODULE:beta").unwrap() < rendered.find("MODULE:alpha").unwrap());
}

proptest! {
    #[test]
    fn prop_roundtrip_preserves_identifiers(
        scope_names in proptest::collection::hash_set("[a-z][a-z0-9_.]{0,12}", 1..5),
        block_ids in proptest::collection::hash_set("[a-z0-9_]{1,8}", 0..6),
        signal_names in proptest::collection::hash_set("[a-z][a-z0-9_]{0,8}", 0..6),
    ) {
        let mut data = ExclusionData::default();
        for (index, name) in scope_names.iter().enumerate() {
            let scope = data.get_or_create_scope(name, None, index % 2 == 0);
            for block_id in &block_ids {
                scope.add_block(BlockExclusion::new(block_id.as_str(), "123", "x <= y;"));
            }
            for signal in &signal_names {
                scope.add_toggle(ToggleExclusion::new(
                    ToggleDirection::ZeroToOne,
                    signal.as_str(),
                    format!("net {}", signal),
                ));
            }
        }

        let reparsed = reparse(&data, WriterConfig::default());
        prop_assert_eq!(reparsed.scope_count(), data.scope_count());
        prop_assert_eq!(
            reparsed.exclusion_counts_by_type(),
            data.exclusion_counts_by_type()
        );
        for (name, scope) in &data.scopes {
            let other = &reparsed.scopes[name];
            prop_assert_eq!(other.is_module, scope.is_module);
            let mut expected: Vec<_> = scope.block_exclusions.keys().collect();
            let mut actual: Vec<_> = other.block_exclusions.keys().collect();
            expected.sort();
            actual.sort();
            prop_assert_eq!(expected, actual);
        }
    }

    #[test]
    fn prop_quoted_values_survive_roundtrip(
        source in "[ -~]{0,24}",
    ) {
        // Backslash-before-quote collides with the escape grammar itself;
        // everything else printable must survive
        prop_assume!(!source.contains("\\\""));
        prop_assume!(!source.ends_with('\\'));

        let mut data = ExclusionData::default();
        let scope = data.get_or_create_scope("top", None, true);
        scope.add_block(BlockExclusion::new("b1", "1", source.clone()));

        let reparsed = reparse(&data, WriterConfig::default());
        prop_assert_eq!(
            &reparsed.scopes["top"].block_exclusions["b1"].source_code,
            &source
        );
    }
}
