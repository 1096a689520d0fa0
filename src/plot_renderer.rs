//! GPU renderer for TracePlot.
use glam::DVec2;
use iced::{Rectangle, wgpu::*};

use crate::{camera::CameraUniform, grid::Grid, plot_state::PlotState};

pub(crate) struct RenderParams<'a> {
    pub encoder: &'a mut CommandEncoder,
    pub target: &'a TextureView,
    pub clip_bounds: &'a Rectangle<u32>,
}

/// Position, color and index buffers of the trace line.
struct LineBuffers {
    positions: Buffer,
    colors: Buffer,
    indices: Buffer,
    index_count: u32,
    point_count: usize,
}

/// Tracks version numbers to detect changes
struct VersionTracker {
    geometry: u64,
    colors: u64,
    render_offset: DVec2,
}

impl VersionTracker {
    fn new() -> Self {
        Self {
            geometry: 0,
            colors: 0,
            render_offset: DVec2::ZERO,
        }
    }
}

pub(crate) struct PlotRenderer {
    format: TextureFormat,
    camera_buffer: Buffer,
    camera_bind_group: BindGroup,
    camera_bgl: BindGroupLayout,
    line_pipeline: Option<RenderPipeline>,
    line: Option<LineBuffers>,
    versions: VersionTracker,
    grid: Grid,
}

impl PlotRenderer {
    pub(crate) fn new(device: &Device, _queue: &Queue, format: TextureFormat) -> Self {
        let camera_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("camera_bgl"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let camera_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("camera_buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("camera_bg"),
            layout: &camera_bgl,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });
        Self {
            format,
            camera_buffer,
            camera_bind_group,
            camera_bgl,
            line_pipeline: None,
            line: None,
            versions: VersionTracker::new(),
            grid: Grid::default(),
        }
    }

    /// Prepare the renderer for a new frame: pipelines, camera uniform, grid and
    /// whichever line buffers are stale.
    pub(crate) fn prepare_frame(&mut self, device: &Device, queue: &Queue, state: &PlotState) {
        self.ensure_line_pipeline(device);
        self.grid.ensure_pipeline(device, self.format, &self.camera_bgl);
        self.grid.update(device, &state.camera);

        let mut cam_u = CameraUniform::default();
        cam_u.update(&state.camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&cam_u));

        self.sync(device, queue, state);
    }

    fn sync(&mut self, device: &Device, queue: &Queue, state: &PlotState) {
        if state.positions.is_empty() || state.connect.is_empty() {
            self.line = None;
            return;
        }

        // Positions are stored relative to render_offset.
        let offset = state.camera.render_offset;
        let offset_changed = self.versions.render_offset != offset;

        let stale_layout = self
            .line
            .as_ref()
            .is_none_or(|line| line.point_count != state.positions.len());

        if stale_layout {
            self.rebuild_line(device, queue, state);
        } else if let Some(line) = &self.line {
            if state.geometry_version != self.versions.geometry || offset_changed {
                let positions = render_positions(&state.positions, offset);
                queue.write_buffer(&line.positions, 0, bytemuck::cast_slice(&positions));
            }
            if state.color_version != self.versions.colors {
                let colors = vertex_colors(&state.colors);
                queue.write_buffer(&line.colors, 0, bytemuck::cast_slice(&colors));
            }
        }

        self.versions.geometry = state.geometry_version;
        self.versions.colors = state.color_version;
        self.versions.render_offset = offset;
    }

    fn rebuild_line(&mut self, device: &Device, queue: &Queue, state: &PlotState) {
        let positions = render_positions(&state.positions, state.camera.render_offset);
        let colors = vertex_colors(&state.colors);
        let indices: &[u8] = bytemuck::cast_slice(&state.connect[..]);

        let buffer = |label: &'static str, size: usize, usage: BufferUsages| {
            device.create_buffer(&BufferDescriptor {
                label: Some(label),
                size: size as u64,
                usage: usage | BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let line = LineBuffers {
            positions: buffer(
                "trace positions",
                std::mem::size_of_val(positions.as_slice()),
                BufferUsages::VERTEX,
            ),
            colors: buffer(
                "trace colors",
                std::mem::size_of_val(colors.as_slice()),
                BufferUsages::VERTEX,
            ),
            indices: buffer("trace indices", indices.len(), BufferUsages::INDEX),
            index_count: (state.connect.len() * 2) as u32,
            point_count: state.positions.len(),
        };
        queue.write_buffer(&line.positions, 0, bytemuck::cast_slice(&positions));
        queue.write_buffer(&line.colors, 0, bytemuck::cast_slice(&colors));
        queue.write_buffer(&line.indices, 0, indices);
        self.line = Some(line);
    }

    fn ensure_line_pipeline(&mut self, device: &Device) {
        if self.line_pipeline.is_some() {
            return;
        }
        let shader = device.create_shader_module(include_wgsl!("shaders/line.wgsl"));
        let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("line layout"),
            bind_group_layouts: &[&self.camera_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("line pipeline"),
            layout: Some(&layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                buffers: &[
                    VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                        step_mode: VertexStepMode::Vertex,
                        attributes: &[VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: VertexFormat::Float32x2, // position
                        }],
                    },
                    VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 4]>() as u64,
                        step_mode: VertexStepMode::Vertex,
                        attributes: &[VertexAttribute {
                            offset: 0,
                            shader_location: 1,
                            format: VertexFormat::Float32x4, // color
                        }],
                    },
                ],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                targets: &[Some(ColorTargetState {
                    format: self.format,
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
        self.line_pipeline = Some(pipeline);
    }

    pub(crate) fn encode(&self, params: RenderParams) {
        let bounds = params.clip_bounds;
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }

        let mut pass = params.encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("iced_traceplot main"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: params.target,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Load,
                    store: StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        pass.set_viewport(
            bounds.x as f32,
            bounds.y as f32,
            bounds.width as f32,
            bounds.height as f32,
            0.0,
            1.0,
        );
        pass.set_scissor_rect(bounds.x, bounds.y, bounds.width, bounds.height);

        self.grid.draw(&mut pass, &self.camera_bind_group);

        if let (Some(pipeline), Some(line)) = (&self.line_pipeline, &self.line) {
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_vertex_buffer(0, line.positions.slice(..));
            pass.set_vertex_buffer(1, line.colors.slice(..));
            pass.set_index_buffer(line.indices.slice(..), IndexFormat::Uint32);
            pass.draw_indexed(0..line.index_count, 0, 0..1);
        }
    }
}

/// World positions shifted by `offset` and narrowed to f32.
fn render_positions(positions: &[[f64; 2]], offset: DVec2) -> Vec<[f32; 2]> {
    positions
        .iter()
        .map(|[x, y]| [(x - offset.x) as f32, (y - offset.y) as f32])
        .collect()
}

fn vertex_colors(colors: &[iced::Color]) -> Vec<[f32; 4]> {
    colors.iter().map(|c| [c.r, c.g, c.b, c.a]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_relative_to_offset() {
        let positions = [[1000.0, 5.0], [1001.0, 6.5]];
        let render = render_positions(&positions, DVec2::new(1000.5, 5.0));
        assert_eq!(render, vec![[-0.5, 0.0], [0.5, 1.5]]);
    }

    #[test]
    fn colors_keep_alpha() {
        let colors = [iced::Color::from_rgba(0.1, 0.2, 0.3, 0.4)];
        assert_eq!(vertex_colors(&colors), vec![[0.1, 0.2, 0.3, 0.4]]);
    }
}
