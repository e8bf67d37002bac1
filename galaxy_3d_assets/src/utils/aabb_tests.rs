use super::*;

#[test]
fn test_from_points() {
    let aabb = AABB::from_points([
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(3.0, -2.0, 1.0),
        Vec3::new(-1.0, 4.0, 5.0),
    ]);
    assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
    assert_eq!(aabb.max, Vec3::new(3.0, 4.0, 5.0));
}

#[test]
fn test_empty_is_invalid_and_neutral() {
    let empty = AABB::from_points(std::iter::empty());
    assert!(!empty.is_valid());

    let unit = AABB::new(Vec3::ZERO, Vec3::ONE);
    assert_eq!(empty.merged(&unit), unit);
    assert_eq!(empty.transformed(&Mat4::from_translation(Vec3::X)), empty);
}

#[test]
fn test_merged() {
    let a = AABB::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 1.0));
    let b = AABB::new(Vec3::new(0.0, -2.0, 0.0), Vec3::new(2.0, 0.0, 3.0));
    let m = a.merged(&b);
    assert_eq!(m.min, Vec3::new(-1.0, -2.0, 0.0));
    assert_eq!(m.max, Vec3::new(2.0, 1.0, 3.0));
    assert_eq!(m.center(), Vec3::new(0.5, -0.5, 1.5));
    assert_eq!(m.extent(), Vec3::new(3.0, 3.0, 3.0));
}

#[test]
fn test_transformed_translation_and_scale() {
    let aabb = AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0));
    let m = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)) * Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
    let t = aabb.transformed(&m);
    assert_eq!(t.min, Vec3::new(8.0, -1.0, -1.0));
    assert_eq!(t.max, Vec3::new(12.0, 1.0, 1.0));
}

#[test]
fn test_transformed_rotation_stays_tight() {
    let aabb = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
    let t = aabb.transformed(&Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2));
    assert!((t.min - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
    assert!((t.max - Vec3::new(0.0, 2.0, 1.0)).length() < 1e-5);
}
