use crate::entity;

/// Default block size balances memory usage and access speed for typical entity patterns.
pub(crate) const DEFAULT_BLOCK_SIZE: usize = 256;

/// A block-based sparse map from entity ids to values.
///
/// The id space is divided into fixed-size blocks and memory is allocated only for blocks that
/// hold at least one entry. Entity ids are dense and reused, so in practice few blocks exist
/// and every lookup is two vector indexes. Buckets use it to map entities to dense rows, the
/// component manager to map entities to their component masks.
///
/// | Operation | Time | Memory |
/// |-----------|------|--------|
/// | `insert()` | O(1) amortized | Allocates block on first use |
/// | `get()` | O(1) | No allocation |
/// | `remove()` | O(1) | No deallocation (leaves `None`) |
#[derive(Debug)]
pub(crate) struct DynamicIndex<T = usize> {
    /// The size of blocks to allocate when growing the index.
    block_size: usize,

    /// Outer Vec is indexed by `entity / block_size`, inner by `entity % block_size`.
    maps: Vec<Option<Vec<Option<T>>>>,
}

impl<T> DynamicIndex<T> {
    /// Create a new DynamicIndex with a custom block size.
    ///
    /// # Panics
    ///
    /// Debug builds panic if block_size is 0.
    #[inline]
    pub const fn with_block_size(block_size: usize) -> Self {
        debug_assert!(block_size > 0, "block_size must be greater than 0");
        Self {
            block_size,
            maps: Vec::new(),
        }
    }

    /// Calculate block and within-block indices for an entity.
    #[inline]
    fn indices(&self, entity: entity::Id) -> (usize, usize) {
        let entity_index = entity.index();
        (entity_index / self.block_size, entity_index % self.block_size)
    }

    /// The slot for an entity, allocating its block if needed.
    fn slot(&mut self, entity: entity::Id) -> &mut Option<T> {
        let (block_index, within_block_index) = self.indices(entity);

        if block_index >= self.maps.len() {
            self.maps.resize_with(block_index + 1, || None);
        }

        let block_size = self.block_size;
        let block = self.maps[block_index].get_or_insert_with(|| {
            let mut block = Vec::with_capacity(block_size);
            block.resize_with(block_size, || None);
            block
        });
        &mut block[within_block_index]
    }

    /// Map the entity to a value, returning the value it replaced.
    #[inline]
    pub fn insert(&mut self, entity: entity::Id, value: T) -> Option<T> {
        self.slot(entity).replace(value)
    }

    /// Get the entity's value, inserting one built by `f` if there is none.
    #[inline]
    pub fn get_or_insert_with(&mut self, entity: entity::Id, f: impl FnOnce() -> T) -> &mut T {
        self.slot(entity).get_or_insert_with(f)
    }

    /// Get the value for the given entity if it exists.
    #[inline]
    pub fn get(&self, entity: entity::Id) -> Option<&T> {
        let (block_index, within_block_index) = self.indices(entity);
        let block = self.maps.get(block_index)?.as_ref()?;
        block[within_block_index].as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, entity: entity::Id) -> Option<&mut T> {
        let (block_index, within_block_index) = self.indices(entity);
        let block = self.maps.get_mut(block_index)?.as_mut()?;
        block[within_block_index].as_mut()
    }

    /// Remove the mapping for the given entity, returning the value it held.
    #[inline]
    pub fn remove(&mut self, entity: entity::Id) -> Option<T> {
        let (block_index, within_block_index) = self.indices(entity);
        let block = self.maps.get_mut(block_index)?.as_mut()?;
        block[within_block_index].take()
    }

    /// Number of blocks that have been allocated.
    #[cfg(test)]
    pub(crate) fn allocated_block_count(&self) -> usize {
        self.maps.iter().filter(|b| b.is_some()).count()
    }
}

impl<T> Default for DynamicIndex<T> {
    #[inline]
    fn default() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: u32) -> entity::Id {
        entity::Id::new(value)
    }

    #[test]
    fn insert_get_remove() {
        // Given
        let mut index = DynamicIndex::default();

        // When
        index.insert(id(3), 0);
        index.insert(id(300), 1);

        // Then
        assert_eq!(index.get(id(3)), Some(&0));
        assert_eq!(index.get(id(300)), Some(&1));
        assert_eq!(index.get(id(4)), None);

        // When
        assert_eq!(index.remove(id(3)), Some(0));

        // Then
        assert_eq!(index.get(id(3)), None);
        assert_eq!(index.remove(id(3)), None);
    }

    #[test]
    fn insert_replaces_existing_value() {
        let mut index = DynamicIndex::default();

        assert_eq!(index.insert(id(1), 5), None);
        assert_eq!(index.insert(id(1), 9), Some(5));

        assert_eq!(index.get(id(1)), Some(&9));
    }

    #[test]
    fn get_or_insert_with_builds_once() {
        // Given
        let mut index: DynamicIndex<Vec<u8>> = DynamicIndex::with_block_size(8);

        // When
        index.get_or_insert_with(id(9), Vec::new).push(1);
        index.get_or_insert_with(id(9), || vec![42]).push(2);

        // Then
        assert_eq!(index.get(id(9)), Some(&vec![1, 2]));
        index.get_mut(id(9)).unwrap().clear();
        assert_eq!(index.get(id(9)), Some(&Vec::new()));
    }

    #[test]
    fn only_touched_blocks_are_allocated() {
        // Given
        let mut index = DynamicIndex::with_block_size(4);

        // When - ids in blocks 0 and 25
        index.insert(id(1), 0);
        index.insert(id(2), 1);
        index.insert(id(101), 2);

        // Then
        assert_eq!(index.allocated_block_count(), 2);
        assert_eq!(index.get(id(50)), None);
        assert_eq!(index.get(id(1000)), None);
    }
}
