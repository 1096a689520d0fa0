use glam::DVec2;
use iced::wgpu::{util::DeviceExt, *};

use crate::{camera::Camera, ticks};

/// Background grid lines, one per tick on each axis.
pub(crate) struct Grid {
    pipeline: Option<RenderPipeline>,
    vertex_buffer: Option<Buffer>,
    vertex_count: u32,
    last_camera: Option<Camera>,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct GridVertex {
    position: [f32; 2],
    alpha: f32,
}

impl Grid {
    pub(crate) fn ensure_pipeline(
        &mut self,
        device: &Device,
        format: TextureFormat,
        camera_bgl: &BindGroupLayout,
    ) {
        if self.pipeline.is_some() {
            return;
        }
        let shader = device.create_shader_module(include_wgsl!("shaders/grid.wgsl"));
        let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Grid Pipeline Layout"),
            bind_group_layouts: &[camera_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Grid Pipeline"),
            layout: Some(&layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                buffers: &[VertexBufferLayout {
                    array_stride: std::mem::size_of::<GridVertex>() as u64,
                    step_mode: VertexStepMode::Vertex,
                    attributes: &[
                        VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: VertexFormat::Float32x2,
                        },
                        VertexAttribute {
                            offset: std::mem::size_of::<[f32; 2]>() as u64,
                            shader_location: 1,
                            format: VertexFormat::Float32,
                        },
                    ],
                }],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                targets: &[Some(ColorTargetState {
                    format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        self.pipeline = Some(pipeline);
    }

    /// Rebuild the grid when the camera moved.
    pub(crate) fn update(&mut self, device: &Device, camera: &Camera) {
        if self.last_camera.as_ref() == Some(camera) {
            return;
        }
        self.last_camera = Some(*camera);

        let verts = grid_vertices(camera);
        self.vertex_count = verts.len() as u32;
        self.vertex_buffer = (!verts.is_empty()).then(|| {
            device.create_buffer_init(&util::BufferInitDescriptor {
                label: Some("Grid VB"),
                contents: bytemuck::cast_slice(&verts),
                usage: BufferUsages::VERTEX,
            })
        });
    }

    pub(crate) fn draw<'a>(&'a self, pass: &mut RenderPass<'a>, camera_bind_group: &'a BindGroup) {
        if let (Some(pipeline), Some(vb)) = (&self.pipeline, &self.vertex_buffer) {
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, camera_bind_group, &[]);
            pass.set_vertex_buffer(0, vb.slice(..));
            pass.draw(0..self.vertex_count, 0..1);
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            pipeline: None,
            vertex_buffer: None,
            vertex_count: 0,
            last_camera: None,
        }
    }
}

/// Line-list vertices in render space. Ticks are produced in world space so the
/// grid weights line up with the tick labels.
fn grid_vertices(camera: &Camera) -> Vec<GridVertex> {
    let min = camera.position - camera.half_extents;
    let max = camera.position + camera.half_extents;
    let to_render = |world: DVec2| {
        let render = world - camera.render_offset;
        [render.x as f32, render.y as f32]
    };

    let mut verts = Vec::new();
    for tick in ticks::default_tick_producer(min.x, max.x) {
        let alpha = tick.line_type.alpha();
        verts.push(GridVertex {
            position: to_render(DVec2::new(tick.value, min.y)),
            alpha,
        });
        verts.push(GridVertex {
            position: to_render(DVec2::new(tick.value, max.y)),
            alpha,
        });
    }
    for tick in ticks::default_tick_producer(min.y, max.y) {
        let alpha = tick.line_type.alpha();
        verts.push(GridVertex {
            position: to_render(DVec2::new(min.x, tick.value)),
            alpha,
        });
        verts.push(GridVertex {
            position: to_render(DVec2::new(max.x, tick.value)),
            alpha,
        });
    }
    verts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertices_are_offset_into_render_space() {
        let mut camera = Camera::default();
        camera.set_bounds(DVec2::new(1000.0, -1.0), DVec2::new(1020.0, 1.0), 0.0);
        let verts = grid_vertices(&camera);
        assert_eq!(verts.len() % 2, 0);
        assert!(!verts.is_empty());
        for v in &verts {
            assert!(v.position[0].abs() <= 10.0 + 1e-3);
            assert!(v.position[1].abs() <= 1.0 + 1e-3);
            assert!(v.alpha > 0.0 && v.alpha < 1.0);
        }
        // The vertical line at x = 1010 is major and sits at render x = 0.
        assert!(verts
            .chunks(2)
            .any(|pair| pair[0].position[0] == 0.0 && pair[0].alpha == 0.45));
    }
}
