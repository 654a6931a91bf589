//! Object/slab allocator for `Order` records (C3).
//!
//! The source's `SlabAllocator<T>` splices raw pointers between intrusive
//! free/partial/full slab lists backed by `mmap`-ed pages. That's not
//! expressible in safe Rust, so this crate realizes the same amortization
//! and stability contract with a generation-checked arena instead (§4.C3
//! "Rust realization", §9 "Stable handles, not raw pointers"): one `Vec<Slot>`
//! per slab, slabs held in a `Vec<Slab>`, and an [`OrderHandle`] in place of
//! a raw `*Order`. Handles are `Copy`, stored in the id index and in
//! per-level queues, and a stale handle (already freed, slot since reused)
//! is caught by a generation mismatch rather than aliasing a different
//! `Order`.

use crate::order::Order;

/// Stable reference to an `Order` living in an [`OrderAllocator`]. Never
/// stores a back-pointer to the containing level (§9 "Back-references from
/// Order to containing level") — only the id index and per-level queues
/// hold one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderHandle {
    slab: u32,
    slot: u32,
    generation: u32,
}

enum Slot {
    Vacant { next_free: Option<u32>, generation: u32 },
    Occupied { order: Order, generation: u32 },
}

struct Slab {
    slots: Vec<Slot>,
    free_head: Option<u32>,
    occupied: usize,
}

impl Slab {
    fn new(size: usize) -> Self {
        let mut slots = Vec::with_capacity(size);
        for i in 0..size {
            let next_free = if i + 1 < size { Some(i as u32 + 1) } else { None };
            slots.push(Slot::Vacant { next_free, generation: 0 });
        }
        Self {
            slots,
            free_head: if size > 0 { Some(0) } else { None },
            occupied: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.free_head.is_none()
    }
}

/// Partitions `Order` storage into fixed-size slabs (default
/// [`DEFAULT_SLAB_SIZE`]) the way the source's slab allocator does,
/// allocating a new slab only when every existing one is full.
///
/// Unlike the source, this allocator is not process-wide by default: each
/// `OrderBook` owns one privately and pays no locking cost (§5, §9 "Global
/// pools"). Wrap one in `Arc<parking_lot::Mutex<_>>` to share it across
/// books if that's ever needed.
pub struct OrderAllocator {
    slabs: Vec<Slab>,
    slab_size: usize,
    live_count: usize,
}

pub const DEFAULT_SLAB_SIZE: usize = 4096;

impl OrderAllocator {
    pub fn new(slab_size: usize) -> Self {
        Self {
            slabs: Vec::new(),
            slab_size: slab_size.max(1),
            live_count: 0,
        }
    }

    /// Allocate storage for `order`, preferring a partially-used slab over
    /// extending the arena, mirroring the source's partial-then-free
    /// preference.
    pub fn allocate(&mut self, order: Order) -> OrderHandle {
        if let Some((slab_idx, slab)) = self
            .slabs
            .iter_mut()
            .enumerate()
            .find(|(_, s)| !s.is_full())
        {
            let handle = Self::place(slab_idx as u32, slab, order);
            self.live_count += 1;
            return handle;
        }

        self.slabs.push(Slab::new(self.slab_size));
        let idx = self.slabs.len() - 1;
        let handle = Self::place(idx as u32, &mut self.slabs[idx], order);
        self.live_count += 1;
        handle
    }

    fn place(slab_idx: u32, slab: &mut Slab, order: Order) -> OrderHandle {
        let slot_idx = slab
            .free_head
            .expect("slab selected as non-full must have a free slot");
        let generation = match slab.slots[slot_idx as usize] {
            Slot::Vacant { next_free, generation } => {
                slab.free_head = next_free;
                generation
            }
            Slot::Occupied { .. } => unreachable!("free list points at an occupied slot"),
        };
        slab.slots[slot_idx as usize] = Slot::Occupied { order, generation };
        slab.occupied += 1;

        OrderHandle {
            slab: slab_idx,
            slot: slot_idx,
            generation,
        }
    }

    pub fn get(&self, handle: OrderHandle) -> Option<&Order> {
        let slab = self.slabs.get(handle.slab as usize)?;
        match slab.slots.get(handle.slot as usize)? {
            Slot::Occupied { order, generation } if *generation == handle.generation => Some(order),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: OrderHandle) -> Option<&mut Order> {
        let slab = self.slabs.get_mut(handle.slab as usize)?;
        match slab.slots.get_mut(handle.slot as usize)? {
            Slot::Occupied { order, generation } if *generation == handle.generation => Some(order),
            _ => None,
        }
    }

    /// Return the slot to the free list, bumping its generation so any
    /// stale copy of this handle is detected (via generation mismatch)
    /// rather than silently aliasing whatever order the slot holds next.
    pub fn deallocate(&mut self, handle: OrderHandle) -> Option<Order> {
        let slab = self.slabs.get_mut(handle.slab as usize)?;
        let slot = slab.slots.get_mut(handle.slot as usize)?;
        let matches = matches!(slot, Slot::Occupied { generation, .. } if *generation == handle.generation);
        if !matches {
            return None;
        }
        let next_free = slab.free_head;
        let old = std::mem::replace(
            slot,
            Slot::Vacant {
                next_free,
                generation: handle.generation.wrapping_add(1),
            },
        );
        slab.free_head = Some(handle.slot);
        slab.occupied -= 1;
        self.live_count -= 1;
        match old {
            Slot::Occupied { order, .. } => Some(order),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn size(&self) -> usize {
        self.live_count
    }
}

impl Default for OrderAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_SLAB_SIZE)
    }
}
