use crate::geom::{
    FrameReference, HitOrder, NO_HIT_ALIGNMENT, NO_HIT_ORIENTATION, PolyMesh, Point3,
    ProjectionOptions, Transform, Vec3, project, project_with_diagnostics, project_with_options,
};

/// Square at height `z` whose normal points down (0, 0, -1).
fn ceiling_at(z: f64) -> PolyMesh {
    PolyMesh::new(
        vec![[-1.0, -1.0, z], [-1.0, 1.0, z], [1.0, 1.0, z], [1.0, -1.0, z]],
        vec![vec![0, 1, 2, 3]],
    )
    .expect("quad")
}

fn at(x: f64, y: f64, z: f64) -> Transform {
    Transform::from_point(Point3::new(x, y, z))
}

fn assert_point_close(a: Point3, b: Point3) {
    assert!(a.distance_to(b) < 1e-9, "{a:?} != {b:?}");
}

fn assert_vec_close(a: Vec3, b: Vec3) {
    assert!((a - b).length() < 1e-9, "{a:?} != {b:?}");
}

#[test]
fn snaps_to_ceiling_from_below() {
    let mesh = ceiling_at(5.0);
    let result = project(Transform::identity(), at(0.0, 0.0, 10.0), 1.0, Some(&mesh));

    assert_point_close(result.position, Point3::new(0.0, 0.0, 5.0));
    assert_vec_close(result.delta, Vec3::new(0.0, 0.0, 5.0));
    let alignment = result.alignment.expect("alignment");
    assert!((alignment - 5.0).abs() < 1e-9);
    assert_vec_close(result.orientation.expect("orientation"), Vec3::new(-90.0, 0.0, 0.0));

    let hit = result.hit.expect("hit");
    assert_eq!(hit.face_index, 0);
    assert!((hit.ray_param - 0.5).abs() < 1e-12);
}

#[test]
fn same_path_without_surface_reaches_target() {
    let result = project(Transform::identity(), at(0.0, 0.0, 10.0), 1.0, None);
    assert_point_close(result.position, Point3::new(0.0, 0.0, 10.0));
    assert_eq!(result.orientation, Some(NO_HIT_ORIENTATION));
    assert_eq!(result.alignment, Some(NO_HIT_ALIGNMENT));
    assert!(result.hit.is_none());
}

#[test]
fn blend_scales_toward_hit_point() {
    let mesh = ceiling_at(5.0);
    let half = project(Transform::identity(), at(0.0, 0.0, 10.0), 0.5, Some(&mesh));
    assert_point_close(half.position, Point3::new(0.0, 0.0, 2.5));

    let over = project(Transform::identity(), at(0.0, 0.0, 10.0), 1.5, Some(&mesh));
    assert_point_close(over.position, Point3::new(0.0, 0.0, 7.5));

    let back = project(Transform::identity(), at(0.0, 0.0, 10.0), -1.0, Some(&mesh));
    assert_point_close(back.position, Point3::new(0.0, 0.0, -5.0));
}

#[test]
fn orientation_and_alignment_ignore_blend() {
    let mesh = ceiling_at(5.0);
    let source = Transform::rotate_z(0.4) * Transform::rotate_x(0.2);
    let a = project(source, at(0.2, 0.1, 10.0), 0.25, Some(&mesh));
    let b = project(source, at(0.2, 0.1, 10.0), 0.9, Some(&mesh));
    assert_eq!(a.orientation, b.orientation);
    assert_eq!(a.alignment, b.alignment);
    assert_ne!(a.position, b.position);
}

#[test]
fn approaching_from_the_back_gives_negative_alignment() {
    let mesh = ceiling_at(5.0);
    let result = project(at(0.0, 0.0, 10.0), Transform::identity(), 1.0, Some(&mesh));
    assert_point_close(result.position, Point3::new(0.0, 0.0, 5.0));
    assert!(result.alignment.expect("alignment") < 0.0);
}

#[test]
fn oriented_mode_snaps_backward_position_only_does_not() {
    let mesh = ceiling_at(5.0);
    let source = at(0.0, 0.0, 6.0);
    let target = at(0.0, 0.0, 10.0);

    let oriented = project(source, target, 1.0, Some(&mesh));
    let hit = oriented.hit.expect("backward hit");
    assert!(hit.ray_param < 0.0);
    assert_point_close(oriented.position, Point3::new(0.0, 0.0, 5.0));

    let position_only =
        project_with_options(source, target, 1.0, Some(&mesh), &ProjectionOptions::position_only());
    assert!(position_only.hit.is_none());
    assert_point_close(position_only.position, Point3::new(0.0, 0.0, 10.0));
}

#[test]
fn frame_middle_axis_matches_tilted_face_normal() {
    // Plane x + z = 4 wound so its normal is (1, 0, 1) / sqrt(2).
    let mesh = PolyMesh::new(
        vec![[4.0, -3.0, 0.0], [4.0, 3.0, 0.0], [-2.0, 3.0, 6.0], [-2.0, -3.0, 6.0]],
        vec![vec![0, 1, 2, 3]],
    )
    .expect("tilted quad");
    let n = Vec3::new(1.0, 0.0, 1.0).normalized().expect("normal");
    assert_vec_close(mesh.polygon_normal(0).expect("normal"), n);

    let source = Transform::rotate_y(-0.3);
    let (result, diagnostics) = project_with_diagnostics(
        source,
        at(4.0, 0.5, 4.0),
        1.0,
        Some(&mesh),
        &ProjectionOptions::default(),
    );
    assert_eq!(diagnostics.frame_reference, Some(FrameReference::SourceZ));
    assert_eq!(diagnostics.hit_count, 1);
    assert!(result.alignment.expect("alignment") < 0.0);

    let angles = result.orientation.expect("orientation");
    let rebuilt = Transform::rotate_z(angles.z.to_radians())
        * Transform::rotate_y(angles.y.to_radians())
        * Transform::rotate_x(angles.x.to_radians());
    assert_vec_close(rebuilt.y_axis(), n);
}

#[test]
fn hit_order_option_changes_chosen_face() {
    // Two stacked ceilings; the source sits between them.
    let mesh = PolyMesh::new(
        vec![
            [-1.0, -1.0, 2.0], [-1.0, 1.0, 2.0], [1.0, 1.0, 2.0], [1.0, -1.0, 2.0],
            [-1.0, -1.0, -3.0], [-1.0, 1.0, -3.0], [1.0, 1.0, -3.0], [1.0, -1.0, -3.0],
        ],
        vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]],
    )
    .expect("mesh");
    let source = Transform::identity();
    let target = at(0.0, 0.0, 4.0);

    let nearest = project(source, target, 1.0, Some(&mesh));
    assert_eq!(nearest.hit.expect("hit").face_index, 0);
    assert_point_close(nearest.position, Point3::new(0.0, 0.0, 2.0));

    let forward_first = ProjectionOptions {
        test_both_directions: Some(false),
        ..ProjectionOptions::default()
    };
    let forward = project_with_options(source, target, 1.0, Some(&mesh), &forward_first);
    assert_eq!(forward.hit.expect("hit").face_index, 0);

    let signed = ProjectionOptions {
        hit_order: HitOrder::Signed,
        ..ProjectionOptions::default()
    };
    let signed = project_with_options(source, target, 1.0, Some(&mesh), &signed);
    assert_eq!(signed.hit.expect("hit").face_index, 1);
    assert_point_close(signed.position, Point3::new(0.0, 0.0, -3.0));
}

#[test]
fn empty_mesh_behaves_like_no_surface() {
    let empty = PolyMesh::empty();
    let with_empty = project(at(1.0, 2.0, 3.0), at(-4.0, 0.0, 9.0), 0.3, Some(&empty));
    let without = project(at(1.0, 2.0, 3.0), at(-4.0, 0.0, 9.0), 0.3, None);
    assert_eq!(with_empty, without);
}
