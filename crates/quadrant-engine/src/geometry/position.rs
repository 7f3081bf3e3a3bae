use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::RenderCtx;

/// Unit square corners as flat `x, y` pairs, in draw order.
pub const SQUARE_POSITIONS: [f32; 8] = [1.0, 1.0, -1.0, 1.0, 1.0, -1.0, -1.0, -1.0];

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PositionVertex {
    pub pos: [f32; 2],
}

pub const SQUARE_VERTICES: [PositionVertex; 4] = [
    PositionVertex { pos: [1.0, 1.0] },
    PositionVertex { pos: [-1.0, 1.0] },
    PositionVertex { pos: [1.0, -1.0] },
    PositionVertex { pos: [-1.0, -1.0] },
];

/// GPU buffer holding the four square corners.
///
/// Created with `VERTEX` usage only, so its contents cannot change after
/// upload. Lives as long as its owner; released with the device.
pub struct PositionBuffer {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl PositionBuffer {
    /// Uploads [`SQUARE_VERTICES`].
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quadrant position vbo"),
            contents: bytemuck::cast_slice(&SQUARE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        log::debug!("uploaded {} square vertices", SQUARE_VERTICES.len());

        Self {
            buffer,
            vertex_count: SQUARE_VERTICES.len() as u32,
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Two 32-bit floats per vertex, read at `location`.
    pub fn attribute(location: u32) -> wgpu::VertexAttribute {
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: location,
        }
    }

    pub fn layout(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PositionVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}
