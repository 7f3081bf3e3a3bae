use crate::geometry::PositionBuffer;
use crate::paint::Color;
use crate::shader::{ProgramInfo, UniformLocation};

use super::{RenderCtx, RenderTarget, Transforms};

/// Draws the square: one cleared pass, one non-indexed draw.
///
/// A renderer serves a single program; uniform buffers and bind groups are
/// created against the first `ProgramInfo` it renders.
pub struct FrameRenderer {
    background: Color,
    bindings: Option<UniformBindings>,
    draws_issued: u32,
}

struct UniformBindings {
    projection: Option<(UniformLocation, wgpu::Buffer)>,
    model_view: Option<(UniformLocation, wgpu::Buffer)>,
    /// Indexed by group number.
    bind_groups: Vec<wgpu::BindGroup>,
}

impl FrameRenderer {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            bindings: None,
            draws_issued: 0,
        }
    }

    /// Number of draw calls issued since creation.
    pub fn draws_issued(&self) -> u32 {
        self.draws_issued
    }

    /// Records one frame into `target`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        info: &ProgramInfo,
        positions: &PositionBuffer,
        transforms: &Transforms,
    ) {
        if self.bindings.is_none() {
            self.bindings = Some(UniformBindings::new(ctx, info));
        }
        let Some(bindings) = self.bindings.as_ref() else { return };
        bindings.write(ctx, transforms);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("quadrant square pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.background.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(info.program.pipeline());
        for (group, bind_group) in bindings.bind_groups.iter().enumerate() {
            rpass.set_bind_group(group as u32, bind_group, &[]);
        }
        // Slot 0 is mapped to `attrib_locations.vertex_position` by the pipeline layout.
        rpass.set_vertex_buffer(0, positions.buffer().slice(..));
        rpass.draw(0..positions.vertex_count(), 0..1);
        drop(rpass);

        self.draws_issued += 1;
        log::debug!("issued draw #{}", self.draws_issued);
    }
}

impl UniformBindings {
    fn new(ctx: &RenderCtx<'_>, info: &ProgramInfo) -> Self {
        let make = |loc: Option<UniformLocation>, label: &'static str| {
            loc.map(|loc| {
                let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(label),
                    size: std::mem::size_of::<[f32; 16]>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                (loc, buffer)
            })
        };

        let projection = make(
            info.uniform_locations.projection_matrix,
            "quadrant projection ubo",
        );
        let model_view = make(
            info.uniform_locations.model_view_matrix,
            "quadrant model-view ubo",
        );

        let program = &info.program;
        let bind_groups = program
            .bind_group_layouts()
            .iter()
            .enumerate()
            .map(|(group, layout)| {
                let entries: Vec<wgpu::BindGroupEntry<'_>> = [&projection, &model_view]
                    .into_iter()
                    .flatten()
                    .filter(|(loc, _)| loc.group == group as u32)
                    .map(|(loc, buffer)| wgpu::BindGroupEntry {
                        binding: loc.binding,
                        resource: buffer.as_entire_binding(),
                    })
                    .collect();

                ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("quadrant uniforms"),
                    layout,
                    entries: &entries,
                })
            })
            .collect();

        Self {
            projection,
            model_view,
            bind_groups,
        }
    }

    fn write(&self, ctx: &RenderCtx<'_>, transforms: &Transforms) {
        let uploads = [
            (&self.projection, transforms.projection),
            (&self.model_view, transforms.model_view),
        ];
        for (slot, matrix) in uploads {
            if let Some((_, buffer)) = slot {
                let cols = matrix.to_cols_array();
                ctx.queue.write_buffer(buffer, 0, bytemuck::cast_slice(&cols));
            }
        }
    }
}
