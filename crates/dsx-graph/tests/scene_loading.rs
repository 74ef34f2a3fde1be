use dsx_core::{DiagnosticKind, Light, LoadError, LoadOptions, View};
use dsx_graph::{load, load_file, DrawCall, DrawRecord, Scene};
use dsx_shapes::Tiling;
use glam::{Mat4, Vec3};
use proptest::prelude::*;

const END_TO_END: &str = include_str!("fixtures/end_to_end.dsx");
const SHOWCASE: &str = include_str!("fixtures/showcase.dsx");

fn showcase() -> Scene {
    load(SHOWCASE, &LoadOptions::default()).unwrap()
}

fn draw_of<'a>(draws: &'a [DrawRecord], node: &str) -> &'a DrawRecord {
    draws.iter().find(|draw| draw.node == node).unwrap()
}

#[test]
fn end_to_end_single_rectangle() {
    let scene = load(END_TO_END, &LoadOptions::default()).unwrap();
    assert_eq!(scene.diagnostics.errors().count(), 0, "{:?}", scene.diagnostics);

    match scene.default_view().unwrap() {
        View::Perspective { near, far, fov, from, to } => {
            assert_eq!((*near, *far), (0.1, 100.0));
            assert!((fov - 45f32.to_radians()).abs() < 1e-6);
            assert_eq!(*from, Vec3::splat(10.0));
            assert_eq!(*to, Vec3::ZERO);
        }
        other => panic!("unexpected view {other:?}"),
    }

    let draws = scene.graph.draw_calls();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].node, "rect");
    assert!(draws[0]
        .transform
        .abs_diff_eq(Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)), 1e-6));
    // "inherit" at the root has nothing to inherit from.
    assert_eq!(draws[0].material, None);
    assert_eq!(draws[0].texture, None);
}

#[test]
fn showcase_loads_with_expected_diagnostics() {
    let scene = showcase();
    let diagnostics = &scene.diagnostics;

    // near >= far rejects only that view.
    assert_eq!(scene.views.len(), 3);
    assert!(!scene.views.contains("inverted"));
    assert_eq!(diagnostics.errors().count(), 1);
    assert!(diagnostics.first_error().unwrap().location.contains("inverted"));

    // The spot light's specular red channel is out of range.
    match scene.light("desk_lamp").unwrap() {
        Light::Spot { colors, enabled, .. } => {
            assert!(!enabled);
            assert_eq!(colors.specular.r, 1.0);
        }
        other => panic!("unexpected light {other:?}"),
    }
    assert_eq!(diagnostics.count(DiagnosticKind::Field), 1);
    assert!(matches!(scene.default_view(), Some(View::Perspective { .. })));
    assert_eq!(scene.graph.len(), 17);
}

#[test]
fn showcase_inheritance() {
    let scene = showcase();
    let draws = scene.graph.draw_calls();
    assert_eq!(draws.len(), 9);

    let floor = draw_of(&draws, "floor_plane");
    assert_eq!(floor.material.as_deref(), Some("oak"));
    assert_eq!(floor.texture.as_deref(), Some("parquet"));
    assert_eq!(floor.tiling, Some(Tiling::new(1.0, 1.0)));

    let walls: Vec<_> = draws.iter().filter(|draw| draw.node == "wall_panel").collect();
    assert_eq!(walls.len(), 2);
    for wall in &walls {
        assert_eq!(wall.material.as_deref(), Some("paint"));
        assert_eq!(wall.texture.as_deref(), Some("plaster"));
    }

    let top = draw_of(&draws, "top");
    assert_eq!(top.material.as_deref(), Some("oak"));
    assert_eq!(top.texture, None);
    assert!(top.transform.w_axis.truncate().abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-6));

    let ball = draw_of(&draws, "ball");
    assert_eq!(ball.material.as_deref(), Some("chrome"));
}

#[test]
fn shared_primitive_is_one_node_visited_twice() {
    let scene = showcase();
    let panel = scene.graph.key_of("wall_panel").unwrap();
    assert_eq!(scene.graph.nodes().filter(|(_, node)| node.id == "wall_panel").count(), 1);

    let mut hits = Vec::new();
    scene.graph.traverse(&mut |call: &DrawCall<'_>| {
        if call.key == panel {
            hits.push(call.transform);
        }
    });
    assert_eq!(hits.len(), 2);
    assert_ne!(hits[0], hits[1]);
}

#[test]
fn self_referencing_component_terminates() {
    let scene = showcase();
    let stats = scene.graph.traverse(&mut |_: &DrawCall<'_>| {});
    assert_eq!(stats.cycles_skipped, 1);
    assert_eq!(stats.depth_cuts, 0);
    assert_eq!(stats.draws, 9);
}

#[test]
fn material_cycling_follows_counter() {
    let mut scene = showcase();
    scene.graph.cycle_materials();
    let draws = scene.graph.draw_calls();

    assert_eq!(draw_of(&draws, "wall_panel").material.as_deref(), Some("oak"));
    assert_eq!(draw_of(&draws, "top").material.as_deref(), Some("chrome"));
    // Single-material nodes are unaffected.
    assert_eq!(draw_of(&draws, "floor_plane").material.as_deref(), Some("oak"));
}

#[test]
fn linear_animation_moves_leaf() {
    let source = END_TO_END
        .replace(
            "<transformations/>",
            r#"<transformations/>
    <animations>
        <linear id="slide" span="1">
            <controlpoint xx="0" yy="0" zz="0"/>
            <controlpoint xx="10" yy="0" zz="0"/>
        </linear>
    </animations>"#,
        )
        .replace(
            "<translate x=\"0\" y=\"0\" z=\"5\"/>",
            "<translate x=\"0\" y=\"0\" z=\"0\"/>",
        )
        .replace(
            "<texture id=\"none\"/>",
            "<texture id=\"none\"/>\n            <animations><animationref id=\"slide\"/></animations>",
        );
    let mut scene = load(&source, &LoadOptions::default()).unwrap();
    assert_eq!(scene.diagnostics.errors().count(), 0, "{:?}", scene.diagnostics);

    scene.graph.update(500.0);
    let position = scene.graph.draw_calls()[0].transform.w_axis.truncate();
    assert!(position.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-4), "{position}");

    scene.graph.update(5000.0);
    let position = scene.graph.draw_calls()[0].transform.w_axis.truncate();
    assert!(position.abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-4), "{position}");
}

#[test]
fn strict_mode_rejects_showcase() {
    let err = load(SHOWCASE, &LoadOptions::default().strict()).unwrap_err();
    assert!(matches!(err, LoadError::Rejected { .. }));
}

#[test]
fn load_file_reads_fixture() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/end_to_end.dsx");
    let scene = load_file(path, &LoadOptions::default()).unwrap();
    assert_eq!(scene.info.root, "root");
    assert_eq!(scene.info.axis_length, 5.0);
}

#[test]
fn options_from_json() {
    let options = LoadOptions::from_json(r#"{"max_depth": 2}"#).unwrap();
    let scene = load(SHOWCASE, &options).unwrap();
    let stats = scene.graph.traverse(&mut |_: &DrawCall<'_>| {});
    // Every leaf sits at depth 2 or deeper.
    assert!(stats.depth_cuts > 0);
    assert_eq!(stats.draws, 0);
}

#[test]
fn zero_depth_from_json_still_visits_the_root() {
    let options = LoadOptions::from_json(r#"{"max_depth": 0}"#).unwrap();
    let scene = load(SHOWCASE, &options).unwrap();
    assert_eq!(scene.graph.max_depth(), 1);
    let stats = scene.graph.traverse(&mut |_: &DrawCall<'_>| {});
    assert_eq!(stats.visits, 1);
}

fn translate_then_scale(offset: Vec3, factor: f32) -> String {
    END_TO_END.replace(
        "<translate x=\"0\" y=\"0\" z=\"5\"/>",
        &format!(
            "<translate x=\"{}\" y=\"{}\" z=\"{}\"/><scale x=\"{factor}\" y=\"{factor}\" z=\"{factor}\"/>",
            offset.x, offset.y, offset.z
        ),
    )
}

proptest! {
    #[test]
    fn transform_ops_compose_in_document_order(
        x in -50.0f32..50.0,
        y in -50.0f32..50.0,
        z in -50.0f32..50.0,
        factor in 0.1f32..10.0,
    ) {
        let offset = Vec3::new(x, y, z);
        let scene = load(&translate_then_scale(offset, factor), &LoadOptions::default()).unwrap();
        let draws = scene.graph.draw_calls();
        let expected = Mat4::from_translation(offset) * Mat4::from_scale(Vec3::splat(factor));
        prop_assert!(draws[0].transform.abs_diff_eq(expected, 1e-3));
    }
}
