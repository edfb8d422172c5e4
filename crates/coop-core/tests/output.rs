//! Report and snapshot files written to disk.

use std::fs;
use std::sync::Arc;

use coop_core::{
    CurveWriter, FinalSplits, GameVariant, GraphBuilder, RunConfig, SimulationDriver,
    SnapshotWriter, StrategyAssignment, TrustSign, UpdateRule,
};
use coop_events::fixtures::{sample_snapshot, sample_summaries};
use coop_events::{FinalSplit, RunSummary, StrategySnapshot};

#[test]
fn test_final_splits_from_fixtures() {
    let dir = tempfile::tempdir().unwrap();
    let summaries = sample_summaries();
    let splits = FinalSplits::from_summaries(&summaries);
    splits.write(dir.path()).unwrap();

    let csv = fs::read_to_string(dir.path().join("final_splits.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "dataset,game,update_rule,p,final_cooperators_pct,final_defectors_pct,convergence_iteration,converged"
    );
    assert_eq!(lines[1], "facebook,standard,imitate_best_neighbor,0.25,75.00,25.00,3,true");
    assert_eq!(lines[2], "facebook,standard,fermi,0.50,0.00,100.00,2,true");
    assert_eq!(lines[3], "facebook,standard,fermi,0.75,25.00,75.00,,false");

    let json = fs::read_to_string(dir.path().join("final_splits.json")).unwrap();
    let rows: Vec<FinalSplit> = serde_json::from_str(&json).unwrap();
    assert_eq!(rows, splits.rows());
    assert_eq!(rows[2].convergence_iteration, None);
}

#[test]
fn test_curve_writer_from_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let summary = &sample_summaries()[0];
    CurveWriter::new(dir.path()).write(summary).unwrap();

    let csv = fs::read_to_string(dir.path().join("curve.csv")).unwrap();
    assert_eq!(
        csv,
        "iteration,cooperators,defectors\n0,25.00,75.00\n1,50.00,50.00\n2,75.00,25.00\n3,75.00,25.00\n"
    );

    let json = fs::read_to_string(dir.path().join("summary.json")).unwrap();
    let parsed: RunSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(&parsed, summary);
}

#[test]
fn test_snapshot_fixture_shape() {
    let snapshot = sample_snapshot();
    assert_eq!(snapshot.iteration, 10);
    assert_eq!(snapshot.nodes.len(), 4);
    assert_eq!(snapshot.cooperators().count(), 2);
}

#[test]
fn test_run_writes_initial_periodic_and_final_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let mut builder = GraphBuilder::directed();
    builder
        .add_signed_edge(0, 1, TrustSign::Trusted)
        .add_signed_edge(1, 2, TrustSign::Distrusted)
        .add_signed_edge(2, 0, TrustSign::Trusted);
    let graph = Arc::new(builder.build());

    let driver =
        SimulationDriver::new(graph, GameVariant::Standard, UpdateRule::AllNeighborsTrust)
            .unwrap();
    let config = RunConfig {
        iterations: 6,
        save_interval: 2,
        seed: 3,
        tolerance: 0.0,
    };
    let mut writer = SnapshotWriter::new(dir.path(), "ring_standard_all_neighbors_trust_p0.50");
    let report = driver
        .run(StrategyAssignment::uniform(3, coop_core::Strategy::Defect), &config, &mut writer)
        .unwrap();
    assert!(!report.outcome.is_converged());

    // 0, 2, 4 and the final 6
    assert_eq!(writer.written(), 4);
    for iteration in [0, 2, 4, 6] {
        let path = dir.path().join(format!("iter_{}.json", iteration));
        let snapshot = StrategySnapshot::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(snapshot.iteration, iteration);
        assert_eq!(snapshot.nodes.len(), 3);
        assert!(dir.path().join(format!("iter_{}.gexf", iteration)).exists());
    }
    assert!(!dir.path().join("iter_1.json").exists());

    let final_snapshot =
        StrategySnapshot::from_json(&fs::read_to_string(dir.path().join("iter_6.json")).unwrap())
            .unwrap();
    assert_eq!(final_snapshot.record, report.records[6]);
}
