use std::collections::HashMap;
use std::fmt;
use parking_lot::{Mutex, RwLock};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::LaneId;
use crate::index::file_index::FileIndex;
use crate::index::tfidf::TfIdfIndex;
use crate::memory::dual_queue::DualQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    DualQueue,
    FileIndex,
    TfIdfIndex,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ComponentKind::DualQueue => "dual queue",
            ComponentKind::FileIndex => "file index",
            ComponentKind::TfIdfIndex => "tf-idf index",
        };
        f.write_str(name)
    }
}

/// A lane-scoped memory component owned by the registry
pub enum MemoryComponent {
    DualQueue(DualQueue),
    FileIndex(FileIndex),
    TfIdfIndex(RwLock<TfIdfIndex>),
}

impl MemoryComponent {
    pub fn kind(&self) -> ComponentKind {
        match self {
            MemoryComponent::DualQueue(_) => ComponentKind::DualQueue,
            MemoryComponent::FileIndex(_) => ComponentKind::FileIndex,
            MemoryComponent::TfIdfIndex(_) => ComponentKind::TfIdfIndex,
        }
    }
}

struct Registered {
    component: MemoryComponent,
    numa_node: usize,
}

type ComponentKey = (ComponentKind, LaneId);

/// Collects components while the lane init workers run.
///
/// Registration may happen from many threads at once. Once every init
/// worker has been joined, `seal` turns the builder into the read-only
/// [`MemoryComponentRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    components: Mutex<HashMap<ComponentKey, Registered>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        RegistryBuilder {
            components: Mutex::new(HashMap::new()),
        }
    }

    /// Fails with `AlreadyExists` if `(kind, lane)` is taken.
    pub fn register(&self, lane: LaneId, numa_node: usize, component: MemoryComponent) -> Result<()> {
        let kind = component.kind();
        let mut components = self.components.lock();

        if components.contains_key(&(kind, lane)) {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!("{} already registered for {}", kind, lane),
            ));
        }

        tracing::debug!(%lane, %kind, numa_node, "registered memory component");
        components.insert((kind, lane), Registered { component, numa_node });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.components.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.lock().is_empty()
    }

    pub fn seal(self) -> MemoryComponentRegistry {
        MemoryComponentRegistry {
            components: self.components.into_inner(),
        }
    }
}

/// Process-wide owner of every lane's queue, file index and TF-IDF shard.
///
/// Immutable after construction, so lookups need no lock. Consumers borrow
/// components; nothing outlives the registry.
pub struct MemoryComponentRegistry {
    components: HashMap<ComponentKey, Registered>,
}

impl MemoryComponentRegistry {
    pub fn get(&self, kind: ComponentKind, lane: LaneId) -> Result<&MemoryComponent> {
        self.components
            .get(&(kind, lane))
            .map(|r| &r.component)
            .ok_or_else(|| Error::not_found(format!("{} not registered for {}", kind, lane)))
    }

    pub fn dual_queue(&self, lane: LaneId) -> Result<&DualQueue> {
        match self.get(ComponentKind::DualQueue, lane)? {
            MemoryComponent::DualQueue(queue) => Ok(queue),
            _ => Err(mismatched(ComponentKind::DualQueue, lane)),
        }
    }

    pub fn file_index(&self, lane: LaneId) -> Result<&FileIndex> {
        match self.get(ComponentKind::FileIndex, lane)? {
            MemoryComponent::FileIndex(index) => Ok(index),
            _ => Err(mismatched(ComponentKind::FileIndex, lane)),
        }
    }

    pub fn tfidf_index(&self, lane: LaneId) -> Result<&RwLock<TfIdfIndex>> {
        match self.get(ComponentKind::TfIdfIndex, lane)? {
            MemoryComponent::TfIdfIndex(index) => Ok(index),
            _ => Err(mismatched(ComponentKind::TfIdfIndex, lane)),
        }
    }

    pub fn numa_node(&self, kind: ComponentKind, lane: LaneId) -> Option<usize> {
        self.components.get(&(kind, lane)).map(|r| r.numa_node)
    }

    /// Lanes that own a component of `kind`, in ascending order.
    pub fn lanes(&self, kind: ComponentKind) -> Vec<LaneId> {
        let mut lanes: Vec<LaneId> = self.components
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, lane)| *lane)
            .collect();
        lanes.sort();
        lanes
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

fn mismatched(kind: ComponentKind, lane: LaneId) -> Error {
    Error::new(
        ErrorKind::Internal,
        format!("component registered as {} for {} has a different type", kind, lane),
    )
}
