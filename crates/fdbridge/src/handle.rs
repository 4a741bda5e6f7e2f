//! Generation-tagged handle table.
//!
//! The integer that crosses the boundary is `generation << 32 | index`.
//! Generations start at 1, so `0` is never a live handle, and a slot's
//! generation is bumped on release so stale integers stop resolving.

/// Opaque reference to a loaded detector.
///
/// Not `Clone`: [`crate::FaceBridge::release`] consumes it. Use
/// [`ModelHandle::into_raw`] / [`ModelHandle::from_raw`] to carry it across
/// a boundary as a plain integer.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ModelHandle(u64);

impl ModelHandle {
    fn new(index: u32, generation: u32) -> Self {
        Self((u64::from(generation) << 32) | u64::from(index))
    }

    fn index(&self) -> usize {
        (self.0 & 0xFFFF_FFFF) as usize
    }

    fn generation(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn as_raw(&self) -> u64 {
        self.0
    }

    pub fn into_raw(self) -> u64 {
        self.0
    }

    /// Rebuild a handle from its integer form. Unknown or stale values are
    /// accepted here and rejected on lookup.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> ModelHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return ModelHandle::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            value: Some(value),
        });
        ModelHandle::new(index, 1)
    }

    fn slot(&self, handle: &ModelHandle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index())
            .filter(|s| s.generation == handle.generation())
    }

    pub fn get(&self, handle: &ModelHandle) -> Option<&T> {
        self.slot(handle).and_then(|s| s.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: &ModelHandle) -> Option<&mut T> {
        let generation = handle.generation();
        self.slots
            .get_mut(handle.index())
            .filter(|s| s.generation == generation)
            .and_then(|s| s.value.as_mut())
    }

    pub fn contains(&self, handle: &ModelHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Take the value out and retire the handle.
    pub fn remove(&mut self, handle: &ModelHandle) -> Option<T> {
        let index = handle.index();
        let generation = handle.generation();
        let slot = self
            .slots
            .get_mut(index)
            .filter(|s| s.generation == generation)?;
        let value = slot.value.take()?;
        // skip 0 on wrap-around
        slot.generation = slot.generation.wrapping_add(1).max(1);
        self.free.push(index as u32);
        self.len -= 1;
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
