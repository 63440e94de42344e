/// Additive billboard material for the shared particle mesh
use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::render::mesh::MeshVertexBufferLayoutRef;
use bevy::render::render_resource::{
    AsBindGroup, RenderPipelineDescriptor, ShaderRef, SpecializedMeshPipelineError,
};
use bevy::{prelude::*, reflect::TypePath};
use constants::particles::PARTICLE_WORLD_SCALE;

use super::vertex_buffer::ATTRIBUTE_PARTICLE_SIZE;

const PARTICLE_SHADER_PATH: &str = "shaders/connection_particles.wgsl";

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct ParticleMaterial {
    /// x: world units per size unit, y: global opacity, zw: unused.
    #[uniform(0)]
    pub params: Vec4,
}

impl Default for ParticleMaterial {
    fn default() -> Self {
        Self {
            params: Vec4::new(PARTICLE_WORLD_SCALE, 1.0, 0.0, 0.0),
        }
    }
}

impl Material for ParticleMaterial {
    fn vertex_shader() -> ShaderRef {
        PARTICLE_SHADER_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        PARTICLE_SHADER_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(1),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(2),
            ATTRIBUTE_PARTICLE_SIZE.at_shader_location(3),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        // Quads face the camera from either winding.
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}
