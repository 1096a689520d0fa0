use glam::{DVec2, Mat4, Vec3};

const EPSILON_SMALL: f64 = 1e-6;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub(crate) fn update(&mut self, camera: &Camera) {
        self.view_proj = camera.build_view_projection_matrix().to_cols_array_2d();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Pan/zoom camera over the data plane.
///
/// Maps between world coordinates (column, value), render coordinates (world minus
/// `render_offset`, kept near zero for f32 precision on the GPU) and widget-local
/// screen pixels.
pub(crate) struct Camera {
    /// Center position (world units)
    pub position: DVec2,
    /// Half extents in world units.
    pub half_extents: DVec2,
    /// Offset subtracted from world coordinates before rendering
    pub render_offset: DVec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: DVec2::ZERO,
            half_extents: DVec2::ONE,
            render_offset: DVec2::ZERO,
        }
    }
}

impl Camera {
    pub(crate) fn build_view_projection_matrix(&self) -> Mat4 {
        let proj = Mat4::orthographic_rh(
            -self.half_extents.x as f32,
            self.half_extents.x as f32,
            -self.half_extents.y as f32,
            self.half_extents.y as f32,
            -1.0,
            1.0,
        );
        let effective_position = self.effective_position();
        let view = Mat4::from_translation(-Vec3::new(
            effective_position.x as f32,
            effective_position.y as f32,
            0.0,
        ));
        proj * view
    }

    /// Convert screen coordinates to world coordinates
    pub fn screen_to_world(&self, screen_pos: DVec2, screen_size: DVec2) -> DVec2 {
        self.screen_to_render(screen_pos, screen_size) + self.render_offset
    }

    /// Get the effective camera position relative to the render offset
    pub fn effective_position(&self) -> DVec2 {
        self.position - self.render_offset
    }

    /// Convert screen coordinates to render coordinates (without offset)
    pub fn screen_to_render(&self, screen_pos: DVec2, screen_size: DVec2) -> DVec2 {
        let ndc_x = (screen_pos.x / screen_size.x) * 2.0 - 1.0;
        let ndc_y = -((screen_pos.y / screen_size.y) * 2.0 - 1.0); // Flip Y
        DVec2::new(
            self.effective_position().x + ndc_x * self.half_extents.x,
            self.effective_position().y + ndc_y * self.half_extents.y,
        )
    }

    /// Horizontal screen position of world `x`, or `None` outside the viewport.
    pub fn world_to_screen_x(&self, x: f64, screen_width: f32) -> Option<f32> {
        let ndc_x = (x - self.position.x) / self.half_extents.x;
        let screen_x = (ndc_x as f32 + 1.0) * 0.5 * screen_width;
        (0.0..=screen_width).contains(&screen_x).then_some(screen_x)
    }

    /// Vertical screen position of world `y`, or `None` outside the viewport.
    pub fn world_to_screen_y(&self, y: f64, screen_height: f32) -> Option<f32> {
        let ndc_y = (y - self.position.y) / self.half_extents.y;
        let screen_y = (1.0 - ndc_y as f32) * 0.5 * screen_height;
        (0.0..=screen_height).contains(&screen_y).then_some(screen_y)
    }

    /// Frame `bounds_min..bounds_max` with `padding_frac` of extra room, and re-center
    /// the render offset on it.
    pub(crate) fn set_bounds(&mut self, bounds_min: DVec2, bounds_max: DVec2, padding_frac: f64) {
        let size = (bounds_max - bounds_min).max(DVec2::splat(EPSILON_SMALL));
        let size_padded = size + size * padding_frac;
        self.half_extents = size_padded / 2.0;
        let center = (bounds_min + bounds_max) / 2.0;
        self.position = center;
        self.render_offset = center;
    }

    /// Scale the view by `factor` while keeping the world point under `screen_pos` fixed.
    pub(crate) fn zoom_at(&mut self, screen_pos: DVec2, screen_size: DVec2, factor: f64) {
        let before = self.screen_to_render(screen_pos, screen_size);
        self.half_extents = (self.half_extents * factor).max(DVec2::splat(EPSILON_SMALL));
        let after = self.screen_to_render(screen_pos, screen_size);
        self.position += before - after;
    }

    /// Move the view so the world point under `from` ends up under `to`.
    pub(crate) fn pan(&mut self, from: DVec2, to: DVec2, screen_size: DVec2) {
        let delta = self.screen_to_render(to, screen_size) - self.screen_to_render(from, screen_size);
        self.position -= delta;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const SCREEN: DVec2 = DVec2::new(800.0, 400.0);

    fn framed() -> Camera {
        let mut camera = Camera::default();
        camera.set_bounds(DVec2::new(-1.0, -5.0), DVec2::new(99.0, 5.0), 0.0);
        camera
    }

    #[test]
    fn screen_corners_map_to_bounds() {
        let camera = framed();
        let top_left = camera.screen_to_world(DVec2::ZERO, SCREEN);
        let bottom_right = camera.screen_to_world(SCREEN, SCREEN);
        assert_relative_eq!(top_left.x, -1.0);
        assert_relative_eq!(top_left.y, 5.0);
        assert_relative_eq!(bottom_right.x, 99.0);
        assert_relative_eq!(bottom_right.y, -5.0);
    }

    #[test]
    fn world_to_screen_inverts_screen_to_world() {
        let camera = framed();
        let world = camera.screen_to_world(DVec2::new(200.0, 100.0), SCREEN);
        assert_relative_eq!(
            camera.world_to_screen_x(world.x, 800.0).unwrap(),
            200.0,
            epsilon = 1e-3
        );
        assert_relative_eq!(
            camera.world_to_screen_y(world.y, 400.0).unwrap(),
            100.0,
            epsilon = 1e-3
        );
        assert_eq!(camera.world_to_screen_x(150.0, 800.0), None);
        assert_eq!(camera.world_to_screen_y(-6.0, 400.0), None);
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let mut camera = framed();
        let cursor = DVec2::new(600.0, 120.0);
        let before = camera.screen_to_world(cursor, SCREEN);
        camera.zoom_at(cursor, SCREEN, 0.5);
        let after = camera.screen_to_world(cursor, SCREEN);
        assert_relative_eq!(before.x, after.x, epsilon = 1e-9);
        assert_relative_eq!(before.y, after.y, epsilon = 1e-9);
        assert_relative_eq!(camera.half_extents.x, 25.0);
    }

    #[test]
    fn pan_moves_grabbed_point_under_cursor() {
        let mut camera = framed();
        let from = DVec2::new(100.0, 100.0);
        let to = DVec2::new(180.0, 60.0);
        let grabbed = camera.screen_to_world(from, SCREEN);
        camera.pan(from, to, SCREEN);
        let now = camera.screen_to_world(to, SCREEN);
        assert_relative_eq!(grabbed.x, now.x, epsilon = 1e-9);
        assert_relative_eq!(grabbed.y, now.y, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_bounds_keep_a_visible_extent() {
        let mut camera = Camera::default();
        camera.set_bounds(DVec2::new(3.0, 2.0), DVec2::new(3.0, 2.0), 0.05);
        assert!(camera.half_extents.x > 0.0);
        assert!(camera.half_extents.y > 0.0);
        assert_eq!(camera.render_offset, DVec2::new(3.0, 2.0));
    }
}
