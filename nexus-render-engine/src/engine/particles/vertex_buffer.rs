use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, MeshVertexAttribute, PrimitiveTopology, VertexAttributeValues};
use bevy::render::render_resource::VertexFormat;
use constants::particles::PARKED_PARTICLE_POSITION;

/// Per-vertex billboard size in particle units.
pub const ATTRIBUTE_PARTICLE_SIZE: MeshVertexAttribute =
    MeshVertexAttribute::new("ParticleSize", 988_540_917, VertexFormat::Float32);

/// Quad corners for the two triangles of one particle.
const QUAD_CORNERS: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

const VERTICES_PER_PARTICLE: usize = QUAD_CORNERS.len();

/// Fixed-size CPU staging buffer for every particle stream.
///
/// Slot count never changes after construction. Unused slots stay parked
/// far below the scene with zero size and opacity.
#[derive(Debug, Clone)]
pub struct ParticleVertexBuffer {
    positions: Vec<[f32; 3]>,
    colours: Vec<[f32; 4]>,
    sizes: Vec<f32>,
    draw_range: usize,
}

impl ParticleVertexBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: vec![PARKED_PARTICLE_POSITION.to_array(); capacity],
            colours: vec![[0.0; 4]; capacity],
            sizes: vec![0.0; capacity],
            draw_range: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Number of leading slots holding live particles.
    pub fn draw_range(&self) -> usize {
        self.draw_range
    }

    /// Write one live particle. Returns false once the buffer is full.
    pub fn write(
        &mut self,
        slot: usize,
        position: Vec3,
        colour: [f32; 3],
        size: f32,
        opacity: f32,
    ) -> bool {
        if slot >= self.capacity() {
            return false;
        }
        self.positions[slot] = position.to_array();
        self.colours[slot] = [colour[0], colour[1], colour[2], opacity];
        self.sizes[slot] = size;
        true
    }

    /// Park every slot from `live` up to the previous draw range and record
    /// the new range.
    pub fn finish_frame(&mut self, live: usize) {
        let live = live.min(self.capacity());
        for slot in live..self.draw_range {
            self.park(slot);
        }
        self.draw_range = live;
    }

    pub fn clear(&mut self) {
        self.finish_frame(0);
    }

    pub fn position(&self, slot: usize) -> Option<Vec3> {
        self.positions.get(slot).map(|p| Vec3::from_array(*p))
    }

    pub fn opacity(&self, slot: usize) -> Option<f32> {
        self.colours.get(slot).map(|c| c[3])
    }

    pub fn size(&self, slot: usize) -> Option<f32> {
        self.sizes.get(slot).copied()
    }

    fn park(&mut self, slot: usize) {
        self.positions[slot] = PARKED_PARTICLE_POSITION.to_array();
        self.colours[slot][3] = 0.0;
        self.sizes[slot] = 0.0;
    }

    /// Index count covering the live slots.
    pub fn index_count(&self) -> usize {
        self.draw_range * VERTICES_PER_PARTICLE
    }

    /// Copy the staging data into a mesh built by [`create_particle_mesh`].
    /// Each slot fans out to its six quad vertices and the index buffer is
    /// cut to the draw range. An empty range keeps the previous indices;
    /// the stream entity is hidden instead.
    pub fn write_to_mesh(&self, mesh: &mut Mesh) {
        let count = self.index_count();
        if count > 0 {
            if let Some(Indices::U32(indices)) = mesh.indices_mut() {
                if indices.len() != count {
                    indices.clear();
                    indices.extend(0..count as u32);
                }
            }
        }
        if let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION)
        {
            fan_out(&self.positions, positions);
        }
        if let Some(VertexAttributeValues::Float32x4(colours)) =
            mesh.attribute_mut(Mesh::ATTRIBUTE_COLOR)
        {
            fan_out(&self.colours, colours);
        }
        if let Some(VertexAttributeValues::Float32(sizes)) =
            mesh.attribute_mut(ATTRIBUTE_PARTICLE_SIZE)
        {
            fan_out(&self.sizes, sizes);
        }
    }
}

fn fan_out<T: Copy>(slots: &[T], vertices: &mut [T]) {
    for (slot, chunk) in slots.iter().zip(vertices.chunks_exact_mut(VERTICES_PER_PARTICLE)) {
        chunk.fill(*slot);
    }
}

/// Build the single particle mesh: six vertices per slot, expanded to camera
/// facing quads in the vertex shader using the corner stored in UV_0.
pub fn create_particle_mesh(capacity: usize) -> Mesh {
    let vertex_count = capacity * VERTICES_PER_PARTICLE;
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );

    let corners: Vec<[f32; 2]> = (0..vertex_count)
        .map(|i| QUAD_CORNERS[i % VERTICES_PER_PARTICLE])
        .collect();

    mesh.insert_attribute(
        Mesh::ATTRIBUTE_POSITION,
        vec![PARKED_PARTICLE_POSITION.to_array(); vertex_count],
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, vec![[0.0f32; 4]; vertex_count]);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, corners);
    mesh.insert_attribute(ATTRIBUTE_PARTICLE_SIZE, vec![0.0f32; vertex_count]);
    mesh.insert_indices(Indices::U32((0..vertex_count as u32).collect()));
    mesh
}
