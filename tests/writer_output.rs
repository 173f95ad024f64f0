//! Writer entry points over files and streams

use elx::{
    BlockExclusion, ConditionExclusion, ExclusionData, ExclusionParser, ExclusionType,
    ExclusionWriter, FsmExclusion, ToggleDirection, ToggleExclusion, WriterConfig,
};

fn sample_data() -> ExclusionData {
    let mut data = ExclusionData::default();
    data.generated_by = Some("verif_user".into());
    data.format_version = Some("2".into());
    data.generation_date = Some("Tue Sep 13 14:22:01 2025".into());
    data.exclusion_mode = Some("default".into());

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
fn test_full_file_snapshot() {
    let rendered = ExclusionWriter::new().write_to_string(&sample_data());
    insta::assert_snapshot!("full_file", rendered);
}

#[test]
fn test_write_file_and_reparse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.el");

    let result = ExclusionWriter::new().write_file(&path, &sample_data());
    assert!(result.success);
    assert_eq!(result.scopes_written, 2);
    assert_eq!(result.exclusions_written, 6);
    assert_eq!(result.exclusion_counts[&ExclusionType::Fsm], 2);

    let mut parser = ExclusionParser::new();
    assert!(parser.parse_file(&path).success);
    assert_eq!(parser.data().scope_count(), 2);
}

#[test]
fn test_write_file_to_bad_path_fails() {
    let result =
        ExclusionWriter::new().write_file("/nonexistent/dir/out.el", &sample_data());
    assert!(!result.success);
    assert!(result
        .error_message
        .as_deref()
        .unwrap()
        .contains("Cannot create file"));
}

#[test]
fn test_write_scopes_subset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subset.el");

    let result = ExclusionWriter::new().write_scopes(
        &path,
        &sample_data(),
        &["dma_engine".to_string(), "missing".to_string()],
    );
    assert!(result.success);
    assert_eq!(result.scopes_written, 1);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("MODULE:dma_engine"));
    assert!(!content.contains("INSTANCE:tb.dut.u_ctrl"));
}

#[test]
fn test_write_filtered_by_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("toggles.el");

    let result = ExclusionWriter::new().write_filtered_by_type(
        &path,
        &sample_data(),
        &[ExclusionType::Toggle],
    );
    assert!(result.success);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("Toggle 1to0 rst_n"));
    assert!(!content.contains("Block 161"));
    assert!(!content.contains("Fsm arb_state"));
    assert!(!content.contains("Condition 2"));
}

#[test]
fn test_append_suppresses_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("appended.el");

    let writer = ExclusionWriter::new();
    assert!(writer.write_file(&path, &sample_data()).success);

    let mut extra = ExclusionData::default();
    extra.get_or_create_scope("late_scope", None, true);
    assert!(writer.append_to_file(&path, &extra).success);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("MODULE:late_scope"));
    // Exactly one header block despite two writes
    assert_eq!(content.matches("Generated By User").count(), 1);
}

#[test]
fn test_write_multiple_files_suffixes_index() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("shard.el");

    let mut first = ExclusionData::default();
    first.get_or_create_scope("a", None, true);
    let mut second = ExclusionData::default();
    second.get_or_create_scope("b", None, false);

    let result = ExclusionWriter::new()
        .write_multiple_files(base.to_str().unwrap(), &[first, second]);
    assert!(result.success);
    assert_eq!(result.scopes_written, 2);
    assert!(dir.path().join("shard_0.el").exists());
    assert!(dir.path().join("shard_1.el").exists());
}

#[test]
fn test_write_multiple_files_stops_on_failure() {
    let mut data = ExclusionData::default();
    data.get_or_create_scope("a", None, true);

    let result = ExclusionWriter::new()
        .write_multiple_files("/nonexistent/dir/shard.el", &[data]);
    assert!(!result.success);
    assert!(result
        .error_message
        .as_deref()
        .unwrap()
        .contains("Failed to write"));
}

#[test]
fn test_generated_checksum_reparses_as_scope_checksum() {
    let mut data = ExclusionData::default();
    let scope = data.get_or_create_scope("top", None, true);
    scope.add_block(BlockExclusion::new("b1", "1", "x;"));

    let writer = ExclusionWriter::with_config(WriterConfig {
        include_comments: false,
        ..WriterConfig::default()
    });
    let rendered = writer.write_to_string(&data);
    assert!(rendered.starts_with("CHECKSUM: \""));

    let mut parser = ExclusionParser::new();
    parser.parse_str(&rendered, "generated");
    let checksum = parser.data().scopes["top"].checksum.clone().unwrap();
    assert!(!checksum.is_empty());
    assert!(checksum.chars().all(|c| c.is_ascii_digit()));
}
