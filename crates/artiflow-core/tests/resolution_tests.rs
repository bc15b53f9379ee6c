use artiflow_core::model::ArtifactType;
use artiflow_core::{union, Artifact, ArtifactPool, Channel, InputResolver, PoolEntry, ResolverNode};
use artiflow_ops::{LatestSpan, LatestSpanParams};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn examples() -> Arc<ArtifactType> {
    ArtifactType::spanned("Examples").into_shared()
}

fn spanned(span: i64, version: i64) -> Artifact {
    let mut a = Artifact::new(examples()).with_uri(format!("gs://examples/{span}/{version}"));
    a.set_span(span).unwrap();
    a.set_version(version).unwrap();
    a
}

fn pool() -> ArtifactPool {
    let mut pool = ArtifactPool::new();
    for (span, version) in [(1, 0), (2, 0), (3, 1), (3, 0), (7, 1), (8, 2)] {
        pool.publish("example_gen", "examples", spanned(span, version));
    }
    pool.publish("stats_gen", "statistics", Artifact::new(ArtifactType::new("Statistics").into_shared()));
    pool
}

fn spans(artifacts: &[Artifact]) -> Vec<(i64, i64)> {
    artifacts.iter().filter_map(|a| Some((a.span()?, a.version()?))).collect()
}

#[test]
fn output_channel_reads_its_producer() {
    let pool = pool();
    let resolver = InputResolver::new(&pool);
    let ch = Channel::output(examples(), "example_gen", "examples");
    assert_eq!(resolver.resolve(&ch).unwrap().len(), 6);

    let wrong_key = Channel::output(examples(), "example_gen", "other");
    assert!(resolver.resolve(&wrong_key).unwrap().is_empty());
}

#[test]
fn resolved_channel_applies_latest_span() {
    let pool = pool();
    let resolver = InputResolver::new(&pool);
    let examples_out = Channel::output(examples(), "example_gen", "examples");

    let op = LatestSpan::new(LatestSpanParams { n: 2,
                                                skip_last_n: 2,
                                                keep_all_versions: true,
                                                ..Default::default() }).unwrap();
    let resolved = Channel::resolved(examples(), ResolverNode::input(&examples_out).then(op)).unwrap();
    assert_eq!(spans(&resolver.resolve(&resolved).unwrap()), vec![(2, 0), (3, 0), (3, 1)]);
    assert_eq!(resolved.get_data_dependent_node_ids().unwrap().len(), 1);
}

#[test]
fn resolved_channel_over_two_outputs_ranks_them_together() {
    let mut pool = pool();
    for (span, version) in [(8, 5), (9, 0)] {
        pool.publish("backfill", "examples", spanned(span, version));
    }
    let resolver = InputResolver::new(&pool);
    let x1 = Channel::output(examples(), "example_gen", "examples");
    let x2 = Channel::output(examples(), "backfill", "examples");

    let op = LatestSpan::new(LatestSpanParams { n: 2,
                                                ..Default::default() }).unwrap();
    let node = ResolverNode::combine(Arc::new(op), vec![ResolverNode::input(&x1), ResolverNode::input(&x2)]).unwrap();
    let resolved = Channel::resolved_from(node);
    assert_eq!(spans(&resolver.resolve(&resolved).unwrap()), vec![(8, 5), (9, 0)]);
    assert_eq!(resolved.get_data_dependent_node_ids().unwrap().into_iter().collect::<Vec<_>>(),
               vec!["backfill", "example_gen"]);
}

#[test]
fn union_deduplicates_persisted_artifacts() {
    let pool = pool();
    let resolver = InputResolver::new(&pool);
    let out = Channel::output(examples(), "example_gen", "examples");
    let fresh = Channel::with_artifacts(examples(), vec![spanned(9, 0), spanned(9, 0)]).unwrap();

    let both = union([out.clone(), out, fresh]).unwrap();
    let resolved = resolver.resolve(&both).unwrap();
    assert_eq!(resolved.len(), 8);
    assert_eq!(resolved.iter().filter(|a| a.id.is_none()).count(), 2);
}

#[test]
fn pipeline_adapters_resolve_the_wrapped_channel() {
    let pool = pool();
    let resolver = InputResolver::new(&pool);
    let out = Channel::output(examples(), "example_gen", "examples");
    let mut input = Channel::pipeline_input(&out, "examples");
    input.set_pipeline("sub").unwrap();
    let output = Channel::pipeline_output(&input, "sub", "examples");
    assert_eq!(resolver.resolve(&output).unwrap().len(), 6);
}

#[test]
fn resolve_all_reports_missing_required_inputs() {
    let pool = pool();
    let mut inputs = IndexMap::new();
    inputs.insert("examples".to_string(), Channel::output(examples(), "example_gen", "examples"));
    inputs.insert("schema".to_string(),
                  Channel::output(ArtifactType::new("Schema").into_shared(), "schema_gen", "schema"));
    inputs.insert("baseline".to_string(),
                  Channel::output(ArtifactType::new("Model").into_shared(), "trainer", "model").as_optional());

    for parallel in [true, false] {
        let resolved = InputResolver::new(&pool).with_parallelism(parallel).resolve_all(&inputs).unwrap();
        let keys: Vec<&str> = resolved.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["examples", "schema", "baseline"]);
        assert_eq!(resolved.get("examples").map(<[Artifact]>::len), Some(6));
        assert_eq!(resolved.missing_required(), vec!["schema"]);
        assert!(!resolved.is_satisfied());
    }
}

#[test]
fn pool_round_trips_through_json() {
    let pool = pool();
    let json = serde_json::to_string(&pool).unwrap();
    let back: ArtifactPool = serde_json::from_str(&json).unwrap();
    assert_eq!(back.entries(), pool.entries());

    let entries: Vec<PoolEntry> = back.entries().to_vec();
    assert!(ArtifactPool::from_entries(entries).is_ok());
}
