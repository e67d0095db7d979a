use foundation::arena::Arena;
use foundation::handles::Handle;

/// What a tracked render resource stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    Geometry { vertices: usize, indices: usize },
    Material { label: &'static str },
    CameraControls,
    Renderer,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(pub Handle);

/// Ledger of live render resources.
///
/// Every geometry, material, control or renderer a scene generation or the
/// viewer creates is allocated here and must be released on teardown, so
/// leaks and double frees show up as counts instead of silently.
#[derive(Debug, Default)]
pub struct Resources {
    arena: Arena<ResourceKind>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, kind: ResourceKind) -> ResourceHandle {
        ResourceHandle(self.arena.alloc(kind))
    }

    /// Releases `handle`; returns `false` if it was already released.
    pub fn release(&mut self, handle: ResourceHandle) -> bool {
        self.arena.remove(handle.0).is_some()
    }

    pub fn is_live(&self, handle: ResourceHandle) -> bool {
        self.arena.contains(handle.0)
    }

    pub fn live_count(&self) -> usize {
        self.arena.len()
    }

    pub fn live_geometry_count(&self) -> usize {
        self.arena
            .iter()
            .filter(|(_, kind)| matches!(kind, ResourceKind::Geometry { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::{ResourceKind, Resources};

    #[test]
    fn release_is_not_repeatable() {
        let mut res = Resources::new();
        let geo = res.allocate(ResourceKind::Geometry {
            vertices: 3,
            indices: 3,
        });
        let mat = res.allocate(ResourceKind::Material { label: "test" });
        assert_eq!(res.live_count(), 2);
        assert_eq!(res.live_geometry_count(), 1);

        assert!(res.release(geo));
        assert!(!res.release(geo));
        assert!(!res.is_live(geo));
        assert!(res.is_live(mat));
        assert_eq!(res.live_count(), 1);
    }
}
