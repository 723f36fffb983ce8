use classlink::connector::{NodeRecord, WaypointChain};
use classlink::{ChainError, NodeKind};
use eframe::egui;
use proptest::prelude::*;

/// Splits `(edge pick, fraction)` pairs into bend points along successive edges.
fn chain_with_bends(splits: &[(usize, f32)]) -> WaypointChain {
    let mut chain = WaypointChain::new(egui::pos2(0.0, 0.0), egui::pos2(400.0, 100.0));
    for &(pick, t) in splits {
        let edges: Vec<_> = chain.edges().collect();
        let edge = edges[pick % edges.len()];
        let a = chain.position(edge.from).unwrap();
        let b = chain.position(edge.to).unwrap();
        chain.insert_between(a.lerp(b, t), edge.from, edge.to).unwrap();
    }
    chain
}

fn splits_strategy() -> impl Strategy<Value = Vec<(usize, f32)>> {
    prop::collection::vec((0usize..64, 0.0f32..1.0), 0..24)
}

fn check_traversal_covers_every_node(splits: Vec<(usize, f32)>) -> Result<(), TestCaseError> {
    let chain = chain_with_bends(&splits);
    let nodes: Vec<_> = chain.nodes().collect();
    prop_assert_eq!(nodes.len(), splits.len() + 2);
    prop_assert_eq!(chain.intermediate_count(), splits.len());
    prop_assert_eq!(nodes.first().copied(), Some(chain.start()));
    prop_assert_eq!(nodes.last().copied(), Some(chain.end()));
    prop_assert_eq!(chain.edges().count(), splits.len() + 1);
    // restartable
    prop_assert_eq!(chain.nodes().count(), nodes.len());
    Ok(())
}

fn check_record_round_trip(splits: Vec<(usize, f32)>) -> Result<(), TestCaseError> {
    let chain = chain_with_bends(&splits);
    let rebuilt = WaypointChain::from_record(&chain.to_record())
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(rebuilt.node_count(), chain.node_count());
    prop_assert_eq!(rebuilt.positions(), chain.positions());
    let kinds = |c: &WaypointChain| c.nodes().filter_map(|id| c.kind(id)).collect::<Vec<_>>();
    prop_assert_eq!(kinds(&rebuilt), kinds(&chain));
    Ok(())
}

fn check_deleting_bends_relinks(splits: Vec<(usize, f32)>) -> Result<(), TestCaseError> {
    let mut chain = chain_with_bends(&splits);
    let bends: Vec<_> = chain
        .nodes()
        .filter(|id| chain.kind(*id) == Some(NodeKind::Intermediate))
        .collect();
    for id in bends {
        prop_assert!(chain.delete(id));
    }
    prop_assert_eq!(chain.node_count(), 2);
    prop_assert_eq!(chain.next(chain.start()), Some(chain.end()));
    prop_assert_eq!(chain.previous(chain.end()), Some(chain.start()));
    Ok(())
}

proptest! {
    #[test]
    fn traversal_covers_every_node(splits in splits_strategy()) {
        check_traversal_covers_every_node(splits)?;
    }

    #[test]
    fn record_round_trip(splits in splits_strategy()) {
        check_record_round_trip(splits)?;
    }

    #[test]
    fn deleting_bends_relinks(splits in splits_strategy()) {
        check_deleting_bends_relinks(splits)?;
    }
}

fn parse(json: &str) -> Result<WaypointChain, ChainError> {
    let record: NodeRecord = serde_json::from_str(json).unwrap();
    WaypointChain::from_record(&record)
}

#[test]
fn record_nests_from_the_start_anchor() {
    let chain = chain_with_bends(&[(0, 0.5)]);
    let json = serde_json::to_value(chain.to_record()).unwrap();
    assert_eq!(json["x"], 0.0);
    assert_eq!(json["nextType"], "Intermediate");
    assert_eq!(json["next"]["x"], 200.0);
    assert_eq!(json["next"]["nextType"], "Termination");
    assert_eq!(json["next"]["next"]["x"], 400.0);
    assert!(json["next"]["next"].get("nextType").is_none());
}

#[test]
fn unknown_kind_tag_is_refused() {
    let err = parse(r#"{"x":0,"y":0,"next":{"x":1,"y":1},"nextType":"Elbow"}"#).unwrap_err();
    assert_eq!(
        err,
        ChainError::UnknownKind {
            index: 0,
            tag: "Elbow".to_string()
        }
    );
}

#[test]
fn missing_kind_tag_is_refused() {
    let err = parse(r#"{"x":0,"y":0,"next":{"x":1,"y":1}}"#).unwrap_err();
    assert_eq!(err, ChainError::MissingKind { index: 0 });
}

#[test]
fn chain_must_end_on_an_anchor() {
    let err = parse(r#"{"x":0,"y":0,"next":{"x":1,"y":1},"nextType":"Intermediate"}"#).unwrap_err();
    assert_eq!(err, ChainError::Unterminated { index: 1 });
}

#[test]
fn anchor_cannot_sit_mid_chain() {
    let json = r#"{"x":0,"y":0,"nextType":"Termination",
        "next":{"x":1,"y":1,"nextType":"Termination","next":{"x":2,"y":2}}}"#;
    assert_eq!(parse(json).unwrap_err(), ChainError::MisplacedTerminal { index: 1 });
}

#[test]
fn lone_start_is_refused() {
    assert_eq!(parse(r#"{"x":0,"y":0}"#).unwrap_err(), ChainError::MissingEnd);
}

#[test]
fn kind_tags_parse() {
    assert_eq!("Termination".parse::<NodeKind>().unwrap(), NodeKind::Anchor);
    assert_eq!("Intermediate".parse::<NodeKind>().unwrap(), NodeKind::Intermediate);
    assert!("termination".parse::<NodeKind>().is_err());
    assert_eq!(NodeKind::Anchor.to_string(), "Termination");
}
