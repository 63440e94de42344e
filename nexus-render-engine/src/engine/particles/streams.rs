use bevy::prelude::*;
use constants::category::hex_to_srgb;
use constants::particles::{
    CONTEMPORARY_COLOUR, CURVE_REBUILD_EPSILON, INFLUENCE_COLOUR, PARTICLE_FADE_FRACTION,
    PARTICLE_OPACITY_MAX, PARTICLE_OPACITY_MIN, PARTICLE_RNG_SEED, PARTICLE_SIZE_MAX,
    PARTICLE_SIZE_MIN, PARTICLE_SPEED_MAX, PARTICLE_SPEED_MIN, SCHOOL_COLOUR,
};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::curve::CatmullRomCurve;
use super::pool::{Particle, ParticleHandle, ParticlePool};
use super::vertex_buffer::ParticleVertexBuffer;
use crate::engine::assets::dataset::NodeId;

pub type ConnectionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Influence,
    Contemporary,
    School,
}

impl ConnectionKind {
    pub fn colour(self) -> [f32; 3] {
        hex_to_srgb(match self {
            ConnectionKind::Influence => INFLUENCE_COLOUR,
            ConnectionKind::Contemporary => CONTEMPORARY_COLOUR,
            ConnectionKind::School => SCHOOL_COLOUR,
        })
    }
}

/// Resolves a node id to its current world position, or `None` while the
/// node is not renderable.
pub trait PositionResolver {
    fn resolve(&self, id: &str) -> Option<Vec3>;
}

impl<F> PositionResolver for F
where
    F: Fn(&str) -> Option<Vec3>,
{
    fn resolve(&self, id: &str) -> Option<Vec3> {
        self(id)
    }
}

/// One visualised edge and the particles on loan to it.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub from: NodeId,
    pub to: NodeId,
    pub kind: ConnectionKind,
    pub curve: CatmullRomCurve,
    pub particles: Vec<ParticleHandle>,
    pub active: bool,
}

pub fn connection_id(from: &str, to: &str) -> ConnectionId {
    format!("{from}-{to}")
}

/// An edge whose endpoints could not be resolved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConnection {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: ConnectionKind,
}

/// Owns every particle stream, the particle pool backing them and the single
/// staging buffer they are drawn from.
#[derive(Resource)]
pub struct ConnectionStreamSystem {
    pool: ParticlePool,
    connections: IndexMap<ConnectionId, Connection>,
    pending: IndexMap<ConnectionId, PendingConnection>,
    buffer: ParticleVertexBuffer,
    particles_per_connection: usize,
    rng: StdRng,
}

impl ConnectionStreamSystem {
    pub fn new(
        pool_capacity: usize,
        buffer_capacity: usize,
        particles_per_connection: usize,
    ) -> Self {
        Self {
            pool: ParticlePool::new(pool_capacity),
            connections: IndexMap::new(),
            pending: IndexMap::new(),
            buffer: ParticleVertexBuffer::new(buffer_capacity),
            particles_per_connection,
            rng: StdRng::seed_from_u64(PARTICLE_RNG_SEED),
        }
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn buffer(&self) -> &ParticleVertexBuffer {
        &self.buffer
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Edges waiting for both endpoints to become resolvable.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    pub fn particles_per_connection(&self) -> usize {
        self.particles_per_connection
    }

    pub fn particle(&self, handle: ParticleHandle) -> Option<&Particle> {
        self.pool.get(handle)
    }

    /// Create or replace the stream for `from -> to`. When the pool is short
    /// the connection is still created with whatever particles remain.
    pub fn add_connection(
        &mut self,
        from: &str,
        to: &str,
        from_position: Vec3,
        to_position: Vec3,
        kind: ConnectionKind,
    ) -> ConnectionId {
        let id = connection_id(from, to);
        self.remove_connection(&id);

        let handles = self.pool.allocate(self.particles_per_connection);
        let count = handles.len();
        let colour = kind.colour();

        for (index, handle) in handles.iter().enumerate() {
            let progress = index as f32 / count as f32;
            let (speed, size, opacity) = random_traits(&mut self.rng);
            if let Some(particle) = self.pool.get_mut(*handle) {
                *particle = Particle {
                    progress,
                    speed,
                    size,
                    opacity,
                    colour,
                    laps: 0,
                };
            }
        }

        if count < self.particles_per_connection {
            debug!(
                "Particle pool short for {}: {}/{} particles",
                id, count, self.particles_per_connection
            );
        }

        self.connections.insert(
            id.clone(),
            Connection {
                id: id.clone(),
                from: from.to_string(),
                to: to.to_string(),
                kind,
                curve: CatmullRomCurve::arc(from_position, to_position),
                particles: handles,
                active: true,
            },
        );
        id
    }

    /// Resolve both endpoints and add the connection. When either endpoint
    /// is unresolvable nothing is created and the edge is kept pending, to be
    /// retried by [`Self::refresh_endpoints`].
    pub fn connect(
        &mut self,
        from: &str,
        to: &str,
        kind: ConnectionKind,
        resolver: &impl PositionResolver,
    ) -> Option<ConnectionId> {
        match (resolver.resolve(from), resolver.resolve(to)) {
            (Some(from_position), Some(to_position)) => {
                Some(self.add_connection(from, to, from_position, to_position, kind))
            }
            _ => {
                self.pending.insert(
                    connection_id(from, to),
                    PendingConnection {
                        from: from.to_string(),
                        to: to.to_string(),
                        kind,
                    },
                );
                None
            }
        }
    }

    /// Returns false when the id is unknown.
    pub fn set_connection_active(&mut self, id: &str, active: bool) -> bool {
        match self.connections.get_mut(id) {
            Some(connection) => {
                connection.active = active;
                true
            }
            None => false,
        }
    }

    pub fn set_all_active(&mut self, active: bool) {
        for connection in self.connections.values_mut() {
            connection.active = active;
        }
    }

    pub fn remove_connection(&mut self, id: &str) -> bool {
        self.pending.shift_remove(id);
        match self.connections.shift_remove(id) {
            Some(connection) => {
                self.pool.release(&connection.particles);
                true
            }
            None => false,
        }
    }

    pub fn clear_all_connections(&mut self) {
        self.pending.clear();
        for (_, connection) in self.connections.drain(..) {
            self.pool.release(&connection.particles);
        }
        self.buffer.clear();
    }

    /// Change particle density and re-create every stream along its current
    /// curve. Connection order is preserved.
    pub fn set_particles_per_connection(&mut self, count: usize) {
        if count == self.particles_per_connection {
            return;
        }
        self.particles_per_connection = count;

        let existing: Vec<Connection> = self.connections.values().cloned().collect();
        let pending = std::mem::take(&mut self.pending);
        self.clear_all_connections();
        self.pending = pending;
        for connection in existing {
            let id = self.add_connection(
                &connection.from,
                &connection.to,
                connection.curve.start(),
                connection.curve.end(),
                connection.kind,
            );
            self.set_connection_active(&id, connection.active);
        }
    }

    /// Rebuild the curves whose endpoints moved, then create any pending
    /// edge that has become resolvable. Connections with an unresolvable
    /// endpoint keep their previous curve. Returns how many curves were
    /// built or rebuilt.
    pub fn refresh_endpoints(&mut self, resolver: &impl PositionResolver) -> usize {
        let mut rebuilt = 0;
        for connection in self.connections.values_mut() {
            let (Some(start), Some(end)) = (
                resolver.resolve(&connection.from),
                resolver.resolve(&connection.to),
            ) else {
                continue;
            };
            if start.distance(connection.curve.start()) > CURVE_REBUILD_EPSILON
                || end.distance(connection.curve.end()) > CURVE_REBUILD_EPSILON
            {
                connection.curve = CatmullRomCurve::arc(start, end);
                rebuilt += 1;
            }
        }
        rebuilt + self.retry_pending(resolver)
    }

    /// Create every pending edge whose endpoints now resolve. Returns how
    /// many were created.
    pub fn retry_pending(&mut self, resolver: &impl PositionResolver) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let mut created = 0;
        for (id, edge) in std::mem::take(&mut self.pending) {
            match (resolver.resolve(&edge.from), resolver.resolve(&edge.to)) {
                (Some(start), Some(end)) => {
                    self.add_connection(&edge.from, &edge.to, start, end, edge.kind);
                    created += 1;
                }
                _ => {
                    self.pending.insert(id, edge);
                }
            }
        }
        created
    }

    /// Advance every active particle and rewrite the staging buffer. Slots
    /// past the live total are parked; demand beyond capacity is dropped.
    pub fn update(&mut self, delta_seconds: f32) {
        let delta = delta_seconds.max(0.0);
        let capacity = self.buffer.capacity();
        let mut slot = 0;

        for connection in self.connections.values() {
            if !connection.active {
                continue;
            }
            for handle in &connection.particles {
                let Some(particle) = self.pool.get_mut(*handle) else {
                    continue;
                };

                particle.progress += particle.speed * delta;
                if particle.progress >= 1.0 {
                    particle.progress = particle.progress.rem_euclid(1.0);
                    if particle.progress >= 1.0 {
                        particle.progress = 0.0;
                    }
                    let (speed, size, opacity) = random_traits(&mut self.rng);
                    particle.speed = speed;
                    particle.size = size;
                    particle.opacity = opacity;
                    particle.laps = particle.laps.saturating_add(1);
                }

                if slot < capacity {
                    let position = connection.curve.point_at(particle.progress);
                    let opacity = particle.opacity * end_fade(particle.progress);
                    self.buffer
                        .write(slot, position, particle.colour, particle.size, opacity);
                    slot += 1;
                }
            }
        }

        self.buffer.finish_frame(slot);
    }
}

fn random_traits(rng: &mut StdRng) -> (f32, f32, f32) {
    (
        rng.gen_range(PARTICLE_SPEED_MIN..=PARTICLE_SPEED_MAX),
        rng.gen_range(PARTICLE_SIZE_MIN..=PARTICLE_SIZE_MAX),
        rng.gen_range(PARTICLE_OPACITY_MIN..=PARTICLE_OPACITY_MAX),
    )
}

/// Opacity multiplier ramping in over the first and out over the last
/// stretch of the trip.
pub fn end_fade(progress: f32) -> f32 {
    if progress < PARTICLE_FADE_FRACTION {
        progress / PARTICLE_FADE_FRACTION
    } else if progress > 1.0 - PARTICLE_FADE_FRACTION {
        (1.0 - progress) / PARTICLE_FADE_FRACTION
    } else {
        1.0
    }
}
