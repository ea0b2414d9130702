//! End-to-end checks for the projection engine.
//!
//! Covers the public geometry API, the node evaluator and the `Projector`
//! facade. Random cases use a fixed seed so failures are reproducible.

use ghx_projector::components::ComponentRegistry;
use ghx_projector::components::project::{
    PIN_INPUT_BLEND, PIN_INPUT_MESH, PIN_INPUT_SOURCE, PIN_INPUT_TARGET, PIN_OUTPUT_ALIGNMENT,
    PIN_OUTPUT_POSITION, PIN_OUTPUT_ROTATION,
};
use ghx_projector::geom::{
    HitOrder, Point3, PolyMesh, ProjectionOptions, ProjectionRequest, RaySurface, Transform, Vec3,
    project, project_batch, project_with_options,
};
use ghx_projector::graph::evaluator;
use ghx_projector::graph::node::{Node, NodeId};
use ghx_projector::graph::value::Value;
use ghx_projector::{Projector, ProjectorError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const EPS: f64 = 1e-9;

// ============================================================================
// Test Helpers
// ============================================================================

fn ceiling_vertices() -> Vec<[f64; 3]> {
    vec![[-1.0, -1.0, 5.0], [-1.0, 1.0, 5.0], [1.0, 1.0, 5.0], [1.0, -1.0, 5.0]]
}

fn ceiling() -> PolyMesh {
    PolyMesh::new(ceiling_vertices(), vec![vec![0, 1, 2, 3]]).expect("valid ceiling")
}

/// Ceiling at z=2 (face 0) and a floor at z=-3 (face 1).
fn ceiling_and_floor() -> PolyMesh {
    PolyMesh::new(
        vec![
            [-1.0, -1.0, 2.0],
            [-1.0, 1.0, 2.0],
            [1.0, 1.0, 2.0],
            [1.0, -1.0, 2.0],
            [-1.0, -1.0, -3.0],
            [1.0, -1.0, -3.0],
            [1.0, 1.0, -3.0],
            [-1.0, 1.0, -3.0],
        ],
        vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]],
    )
    .expect("valid mesh")
}

fn at(x: f64, y: f64, z: f64) -> Transform {
    Transform::from_point(Point3::new(x, y, z))
}

fn flat(transform: Transform) -> Vec<f64> {
    let m = transform.as_matrix();
    let mut values = Vec::with_capacity(16);
    for column in 0..4 {
        for row in m {
            values.push(row[column]);
        }
    }
    values
}

fn assert_point_near(actual: Point3, expected: Point3, tol: f64) {
    assert!(
        actual.distance_to(expected) <= tol,
        "expected {expected:?}, got {actual:?}"
    );
}

fn lerp(a: Point3, b: Point3, t: f64) -> Point3 {
    a + (b - a) * t
}

// ============================================================================
// Projection properties
// ============================================================================

#[test]
fn without_surface_position_is_linear_interpolation() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let source = Point3::new(
            rng.random_range(-10.0..10.0),
            rng.random_range(-10.0..10.0),
            rng.random_range(-10.0..10.0),
        );
        let target = Point3::new(
            rng.random_range(-10.0..10.0),
            rng.random_range(-10.0..10.0),
            rng.random_range(-10.0..10.0),
        );
        let blend = rng.random_range(-1.0..2.0);

        let result = project(
            Transform::from_point(source),
            Transform::from_point(target),
            blend,
            None,
        );
        assert_point_near(result.position, lerp(source, target, blend), 1e-9);
        assert_eq!(result.orientation, Some(Vec3::ZERO));
        assert_eq!(result.alignment, Some(1.0));
        assert!(!result.is_snapped());
    }
}

#[test]
fn zero_blend_keeps_the_source_position() {
    let mesh = ceiling();
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..100 {
        let source = Point3::new(
            rng.random_range(-0.9..0.9),
            rng.random_range(-0.9..0.9),
            rng.random_range(-5.0..4.0),
        );
        let target = at(rng.random_range(-0.9..0.9), rng.random_range(-0.9..0.9), 9.0);
        let result = project(Transform::from_point(source), target, 0.0, Some(&mesh));
        assert_eq!(result.position, source);
    }
}

#[test]
fn full_blend_lands_on_the_crossed_surface() {
    let mesh = ceiling();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let source = Point3::new(
            rng.random_range(-0.9..0.9),
            rng.random_range(-0.9..0.9),
            rng.random_range(-5.0..4.0),
        );
        let target = Point3::new(
            rng.random_range(-0.9..0.9),
            rng.random_range(-0.9..0.9),
            rng.random_range(6.0..15.0),
        );

        let result = project(
            Transform::from_point(source),
            Transform::from_point(target),
            1.0,
            Some(&mesh),
        );
        let hit = result.hit.expect("path crosses the ceiling");
        assert_eq!(hit.face_index, 0);
        assert!(hit.ray_param > 0.0 && hit.ray_param < 1.0);
        assert!((result.position.z - 5.0).abs() < 1e-9);
        assert_point_near(result.position, hit.point, 1e-12);

        // Approaching from below a downward-facing ceiling.
        let alignment = result.alignment.expect("oriented mode");
        assert!((alignment - (5.0 - source.z)).abs() < 1e-9);
    }
}

#[test]
fn projecting_a_snapped_result_again_stays_put() {
    let mesh = ceiling();
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let source = at(rng.random_range(-0.5..0.5), rng.random_range(-0.5..0.5), 0.0);
        let target = at(rng.random_range(-0.5..0.5), rng.random_range(-0.5..0.5), 10.0);
        let first = project(source, target, 1.0, Some(&mesh));
        let second = project(Transform::from_point(first.position), target, 1.0, Some(&mesh));
        assert_point_near(second.position, first.position, 1e-6);
    }
}

#[test]
fn position_ignores_source_rotation() {
    let mesh = ceiling();
    let origin = Point3::new(0.25, -0.25, 1.0);
    let plain = Transform::from_point(origin);
    let turned = Transform::from_axes(origin, Vec3::Y, -Vec3::X, Vec3::Z);
    let target = at(0.25, -0.25, 9.0);

    for options in [ProjectionOptions::oriented(), ProjectionOptions::position_only()] {
        let a = project_with_options(plain, target, 0.75, Some(&mesh), &options);
        let b = project_with_options(turned, target, 0.75, Some(&mesh), &options);
        assert_point_near(a.position, b.position, EPS);
        assert_eq!(a.delta, b.delta);
    }
}

#[test]
fn position_only_mode_searches_forward() {
    let mesh = ceiling();
    // Target points away from the ceiling.
    let result = project_with_options(
        at(0.0, 0.0, 6.0),
        at(0.0, 0.0, 8.0),
        1.0,
        Some(&mesh),
        &ProjectionOptions::position_only(),
    );
    assert!(result.hit.is_none());
    assert_point_near(result.position, Point3::new(0.0, 0.0, 8.0), EPS);

    // Oriented mode also looks behind the source.
    let result = project(at(0.0, 0.0, 6.0), at(0.0, 0.0, 8.0), 1.0, Some(&mesh));
    let hit = result.hit.expect("backward hit");
    assert!(hit.ray_param < 0.0);
    assert_point_near(result.position, Point3::new(0.0, 0.0, 5.0), EPS);
}

#[test]
fn hit_order_selects_between_both_sides() {
    let mesh = ceiling_and_floor();
    let source = Transform::identity();
    let target = at(0.0, 0.0, 10.0);

    let nearest = project(source, target, 1.0, Some(&mesh));
    assert_eq!(nearest.hit.map(|h| h.face_index), Some(0));
    assert_point_near(nearest.position, Point3::new(0.0, 0.0, 2.0), EPS);

    let signed = ProjectionOptions {
        hit_order: HitOrder::Signed,
        ..ProjectionOptions::oriented()
    };
    let result = project_with_options(source, target, 1.0, Some(&mesh), &signed);
    assert_eq!(result.hit.map(|h| h.face_index), Some(1));
    assert_point_near(result.position, Point3::new(0.0, 0.0, -3.0), EPS);
}

#[test]
fn batch_matches_individual_calls() {
    let mesh = ceiling_and_floor();
    let surface: &dyn RaySurface = &mesh;
    let mut rng = StdRng::seed_from_u64(99);
    let requests: Vec<ProjectionRequest> = (0..64)
        .map(|_| ProjectionRequest {
            source: at(rng.random_range(-0.8..0.8), rng.random_range(-0.8..0.8), 0.0),
            target: at(
                rng.random_range(-0.8..0.8),
                rng.random_range(-0.8..0.8),
                rng.random_range(-8.0..8.0),
            ),
            blend: rng.random_range(0.0..1.0),
        })
        .collect();

    let options = ProjectionOptions::default();
    let batch = project_batch(&requests, Some(surface), &options);
    assert_eq!(batch.len(), requests.len());
    for (request, result) in requests.iter().zip(&batch) {
        let single =
            project_with_options(request.source, request.target, request.blend, Some(surface), &options);
        assert_eq!(*result, single);
    }
}

// ============================================================================
// Node evaluation
// ============================================================================

#[test]
fn registry_resolves_aliases_and_evaluates_nodes() {
    let registry = ComponentRegistry::default();
    let mesh = Value::Surface {
        vertices: ceiling_vertices(),
        faces: vec![vec![0, 1, 2, 3]],
    };

    let nodes: Vec<Node> = ["Project", "projectNode", "Project Position"]
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let mut node = Node::named(NodeId::new(index), name);
            node.set_input(PIN_INPUT_SOURCE, Value::Point([0.0, 0.0, 0.0]));
            node.set_input(PIN_INPUT_TARGET, Value::Point([0.0, 0.0, 10.0]));
            node.set_input(PIN_INPUT_BLEND, Value::Number(1.0));
            node.set_input(PIN_INPUT_MESH, mesh.clone());
            node
        })
        .collect();

    let result = evaluator::evaluate(&nodes, &registry).expect("evaluation succeeds");
    for id in 0..3 {
        let outputs = &result.node_outputs[&NodeId::new(id)];
        assert_eq!(outputs.get(PIN_OUTPUT_POSITION), Some(&Value::Point([0.0, 0.0, 5.0])));
    }

    let oriented = &result.node_outputs[&NodeId::new(0)];
    assert!(oriented.contains_key(PIN_OUTPUT_ROTATION));
    assert_eq!(oriented.get(PIN_OUTPUT_ALIGNMENT), Some(&Value::Number(5.0)));

    let position_only = &result.node_outputs[&NodeId::new(2)];
    assert!(!position_only.contains_key(PIN_OUTPUT_ROTATION));
    assert!(!position_only.contains_key(PIN_OUTPUT_ALIGNMENT));
}

// ============================================================================
// Projector facade
// ============================================================================

#[test]
fn projector_agrees_with_the_library() {
    let mut projector = Projector::new();
    let vertices: Vec<f64> = ceiling_vertices().into_iter().flatten().collect();
    projector
        .load_mesh(&vertices, vec![vec![0, 1, 2, 3]])
        .expect("mesh loads");

    let source = Transform::from_axes(Point3::new(0.2, 0.1, 1.0), Vec3::Y, -Vec3::X, Vec3::Z);
    let target = at(-0.3, 0.4, 12.0);
    let export = projector
        .project_flat(&flat(source), &flat(target), 0.8)
        .expect("valid matrices");
    let expected = project(source, target, 0.8, Some(&ceiling()));

    assert_eq!(export.position, expected.position.to_array());
    assert_eq!(export.orientation, expected.orientation.map(Vec3::to_array));
    assert_eq!(export.alignment, expected.alignment);
    assert_eq!(export.delta, expected.delta.to_array());
    assert_eq!(
        export.hit.map(|h| h.face_index),
        expected.hit.map(|h| h.face_index)
    );
}

#[test]
fn projector_rejects_malformed_buffers() {
    let mut projector = Projector::new();
    assert_eq!(
        projector.load_mesh(&[1.0; 7], vec![vec![0, 1, 2]]),
        Err(ProjectorError::InvalidVertexBuffer(7))
    );
    assert!(!projector.has_mesh());

    let identity = flat(Transform::identity());
    assert!(matches!(
        projector.project_flat(&identity, &identity[..15], 1.0),
        Err(ProjectorError::InvalidMatrix { name: "target", len: 15 })
    ));
}
