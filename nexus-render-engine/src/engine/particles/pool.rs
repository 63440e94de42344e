/// One animated particle travelling along a connection curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub progress: f32,
    pub speed: f32,
    pub size: f32,
    /// Base opacity before the end fade is applied.
    pub opacity: f32,
    pub colour: [f32; 3],
    /// Completed trips along the curve.
    pub laps: u32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            progress: 0.0,
            speed: 0.0,
            size: 0.0,
            opacity: 0.0,
            colour: [1.0, 1.0, 1.0],
            laps: 0,
        }
    }
}

/// Index of a slot in the pool. Only meaningful for the pool that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleHandle(usize);

impl ParticleHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Fixed-capacity particle storage with a free list.
///
/// The pool never grows. When it runs dry `allocate` returns fewer handles than
/// requested, so a new connection is starved of particles instead of stealing
/// slots already lent to another connection.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    in_use: Vec<bool>,
    free: Vec<usize>,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Particle::default(); capacity],
            in_use: vec![false; capacity],
            // Reversed so the lowest indices are handed out first.
            free: (0..capacity).rev().collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn allocated_count(&self) -> usize {
        self.capacity() - self.free.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn allocate(&mut self, count: usize) -> Vec<ParticleHandle> {
        let take = count.min(self.free.len());
        let mut handles = Vec::with_capacity(take);
        for _ in 0..take {
            let Some(index) = self.free.pop() else {
                break;
            };
            self.in_use[index] = true;
            self.slots[index] = Particle::default();
            handles.push(ParticleHandle(index));
        }
        handles
    }

    /// Return particles to the free list. Already-free or foreign handles are
    /// ignored.
    pub fn release(&mut self, handles: &[ParticleHandle]) {
        for handle in handles {
            if let Some(in_use) = self.in_use.get_mut(handle.0) {
                if *in_use {
                    *in_use = false;
                    self.free.push(handle.0);
                }
            }
        }
    }

    pub fn is_free(&self, handle: ParticleHandle) -> bool {
        !self.in_use.get(handle.0).copied().unwrap_or(false)
    }

    pub fn get(&self, handle: ParticleHandle) -> Option<&Particle> {
        if self.is_free(handle) {
            return None;
        }
        self.slots.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: ParticleHandle) -> Option<&mut Particle> {
        if self.is_free(handle) {
            return None;
        }
        self.slots.get_mut(handle.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_conserved(pool: &ParticlePool) {
        assert_eq!(pool.allocated_count() + pool.free_count(), pool.capacity());
    }

    #[test]
    fn allocation_is_capped_at_capacity() {
        let mut pool = ParticlePool::new(10);
        let handles = pool.allocate(15);

        assert_eq!(handles.len(), 10);
        assert_eq!(pool.free_count(), 0);
        assert!(pool.allocate(1).is_empty());
        assert_conserved(&pool);
    }

    #[test]
    fn handles_are_never_shared() {
        let mut pool = ParticlePool::new(8);
        let first = pool.allocate(5);
        let second = pool.allocate(5);

        let unique: HashSet<_> = first.iter().chain(second.iter()).collect();
        assert_eq!(unique.len(), first.len() + second.len());
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn release_is_idempotent() {
        let mut pool = ParticlePool::new(4);
        let handles = pool.allocate(3);

        pool.release(&handles[..1]);
        pool.release(&handles[..1]);
        assert_eq!(pool.free_count(), 2);
        assert!(pool.is_free(handles[0]));
        assert!(!pool.is_free(handles[1]));
        assert!(pool.get(handles[0]).is_none());
        assert_conserved(&pool);

        pool.release(&[ParticleHandle(99)]);
        assert_conserved(&pool);
    }

    #[test]
    fn conservation_holds_across_mixed_operations() {
        let mut pool = ParticlePool::new(32);
        let mut held: Vec<Vec<ParticleHandle>> = Vec::new();

        for step in 0..50 {
            if step % 3 == 2 && !held.is_empty() {
                let batch = held.remove(0);
                pool.release(&batch);
                pool.release(&batch);
            } else {
                held.push(pool.allocate(step % 7 + 1));
            }
            assert_conserved(&pool);
        }
    }

    #[test]
    fn reallocated_slots_are_reset() {
        let mut pool = ParticlePool::new(1);
        let handle = pool.allocate(1)[0];
        if let Some(particle) = pool.get_mut(handle) {
            particle.progress = 0.7;
        }
        pool.release(&[handle]);

        let again = pool.allocate(1)[0];
        assert_eq!(pool.get(again).map(|p| p.progress), Some(0.0));
    }
}
