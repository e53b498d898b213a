use crate::error::{BenchError, Result};

/// Arithmetic allocator handing endpoint `i` the port `base + i`.
///
/// The range is bounded by `max`; requests that do not fit are rejected,
/// never wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortAllocator {
    base: u16,
    max: u16,
}

impl PortAllocator {
    pub fn new(base: u16, max: u16) -> Self {
        Self { base, max }
    }

    pub fn base(&self) -> u16 {
        self.base
    }

    /// Number of ports available, `max - base + 1`
    pub fn capacity(&self) -> usize {
        if self.max < self.base {
            return 0;
        }
        usize::from(self.max - self.base) + 1
    }

    pub fn allocate(&self, count: usize) -> Result<Vec<u16>> {
        let available = self.capacity();
        if count > available {
            return Err(BenchError::PortRangeExhausted { requested: count, available });
        }
        Ok((0..count).filter_map(|i| self.port_for(i)).collect())
    }

    pub fn port_for(&self, index: usize) -> Option<u16> {
        let offset = u16::try_from(index).ok()?;
        let port = self.base.checked_add(offset)?;
        (port <= self.max).then_some(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_consecutive_ports() -> Result<()> {
        let alloc = PortAllocator::new(1080, 1089);
        assert_eq!(alloc.capacity(), 10);
        assert_eq!(alloc.allocate(3)?, vec![1080, 1081, 1082]);
        assert_eq!(alloc.allocate(10)?.last().copied(), Some(1089));
        Ok(())
    }

    #[test]
    fn rejects_overflow_instead_of_wrapping() {
        let alloc = PortAllocator::new(65530, u16::MAX);
        assert_eq!(alloc.capacity(), 6);
        assert!(matches!(
            alloc.allocate(7),
            Err(BenchError::PortRangeExhausted { requested: 7, available: 6 })
        ));
        assert_eq!(alloc.port_for(6), None);
    }

    #[test]
    fn inverted_range_is_empty() {
        let alloc = PortAllocator::new(2000, 1000);
        assert_eq!(alloc.capacity(), 0);
        assert!(alloc.allocate(1).is_err());
        assert!(alloc.allocate(0).is_ok_and(|p| p.is_empty()));
    }
}
