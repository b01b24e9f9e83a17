use dreamroom::camera::{CameraUniform, OrbitCamera, MAX_DISTANCE, MAX_POLAR, MIN_DISTANCE, MIN_POLAR};
use glam::{Vec3, Vec4};

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-3
}

// ── Orbit ────────────────────────────────────────────────────────────────────

#[test]
fn default_view_starts_at_the_sofa_corner() {
    let camera = OrbitCamera::default();
    assert!(close(camera.eye(), Vec3::new(8.0, 6.0, 12.0)));
    assert!(close(camera.target, Vec3::new(0.0, 2.0, 0.0)));
    assert_eq!(camera.fov, 60.0);
}

#[test]
fn looking_at_clamps_limits() {
    let overhead = OrbitCamera::looking_at(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO);
    assert_eq!(overhead.polar, MIN_POLAR);
    assert_eq!(overhead.distance, MAX_DISTANCE);

    let close_up = OrbitCamera::looking_at(Vec3::new(0.0, 0.0, 1.0), Vec3::ZERO);
    assert_eq!(close_up.distance, MIN_DISTANCE);
}

#[test]
fn rotation_is_damped_over_frames() {
    let mut camera = OrbitCamera::default();
    let start = camera.azimuth;
    camera.rotate(0.5, 0.0);
    camera.tick(1.0 / 60.0);
    let after_one = camera.azimuth - start;
    assert!((after_one - 0.5 * 0.05).abs() < 1e-4);
    for _ in 0..600 {
        camera.tick(1.0 / 60.0);
    }
    assert!((camera.azimuth - start - 0.5).abs() < 1e-3);
}

#[test]
fn zoom_and_polar_stay_in_range() {
    let mut camera = OrbitCamera::default();
    camera.zoom(1000.0);
    camera.rotate(0.0, 10.0);
    for _ in 0..600 {
        camera.tick(1.0 / 60.0);
    }
    assert_eq!(camera.distance, MIN_DISTANCE);
    assert_eq!(camera.polar, MAX_POLAR);
}

#[test]
fn jitter_shifts_eye_and_target_together() {
    let mut camera = OrbitCamera::default();
    let view = camera.view();
    camera.jitter = Vec3::new(0.1, 0.0, 0.0);
    assert!(close(camera.eye(), Vec3::new(8.1, 6.0, 12.0)));
    // The whole view translates, so the target still sits on the view axis.
    let target = camera.view() * (camera.target + camera.jitter).extend(1.0);
    assert!(target.x.abs() < 1e-4 && target.y.abs() < 1e-4);
    assert_ne!(view, camera.view());
}

#[test]
fn billboard_axes_are_orthonormal() {
    let camera = OrbitCamera::default();
    let (right, up) = camera.billboard_axes();
    assert!((right.length() - 1.0).abs() < 1e-4);
    assert!((up.length() - 1.0).abs() < 1e-4);
    assert!(right.dot(up).abs() < 1e-4);
    assert!(right.y.abs() < 1e-4);
}

#[test]
fn target_projects_to_screen_centre() {
    let camera = OrbitCamera::default();
    let clip = camera.view_proj(16.0 / 9.0) * camera.target.extend(1.0);
    assert!((clip.x / clip.w).abs() < 1e-4);
    assert!((clip.y / clip.w).abs() < 1e-4);
}

// ── Uniforms ─────────────────────────────────────────────────────────────────

#[test]
fn overlay_ortho_maps_pixels_to_clip() {
    let u = CameraUniform::identity_ortho(800.0, 600.0);
    let m = glam::Mat4::from_cols_array_2d(&u.view_proj);
    let top_left = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
    let bottom_right = m * Vec4::new(800.0, 600.0, 0.0, 1.0);
    assert!(close(top_left.truncate(), Vec3::new(-1.0, 1.0, 0.0)));
    assert!(close(bottom_right.truncate(), Vec3::new(1.0, -1.0, 0.0)));
}
