//! Loop-function registry.
//!
//! An index-stable vector of slots: removal during a dispatch pass only
//! tombstones a slot, so a callback may release its own entry or any other
//! entry without invalidating the pass. Dead slots are swept once the pass
//! is over.

use super::core::MainLoop;

pub(crate) type LoopFn = Box<dyn FnMut(&mut MainLoop, FuncId)>;

/// Handle to a registered loop function.
///
/// Returned by [`MainLoop::register_func`] and accepted by
/// [`MainLoop::remove_func`]; ids are never reused within a loop instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FuncId(u64);

struct FuncSlot {
    id: u64,
    // Taken out of the slot while its callback runs.
    callback: Option<LoopFn>,
    dead: bool,
}

pub(crate) struct FuncRegistry {
    slots: Vec<FuncSlot>,
    next_id: u64,
}

impl FuncRegistry {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 1,
        }
    }

    /// Appends a callback, preserving registration order.
    pub(crate) fn insert(&mut self, callback: LoopFn) -> FuncId {
        let id = self.next_id;
        self.next_id += 1;

        self.slots.push(FuncSlot {
            id,
            callback: Some(callback),
            dead: false,
        });

        FuncId(id)
    }

    /// Tombstones the entry; safe mid-pass, including from the entry's own
    /// callback. Returns whether the id named a live entry.
    pub(crate) fn remove(&mut self, id: FuncId) -> bool {
        for slot in &mut self.slots {
            if slot.id == id.0 && !slot.dead {
                slot.dead = true;
                slot.callback = None;
                return true;
            }
        }

        false
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Takes the callback at `index` for invocation, or `None` when the
    /// slot was removed earlier in the pass (or is already running).
    pub(crate) fn begin_call(&mut self, index: usize) -> Option<(FuncId, LoopFn)> {
        let slot = self.slots.get_mut(index)?;
        if slot.dead {
            return None;
        }

        let id = FuncId(slot.id);
        slot.callback.take().map(|callback| (id, callback))
    }

    /// Puts a callback back unless its entry was removed while it ran.
    pub(crate) fn end_call(&mut self, index: usize, callback: LoopFn) {
        if let Some(slot) = self.slots.get_mut(index)
            && !slot.dead
        {
            slot.callback = Some(callback);
        }
    }

    /// Compacts tombstoned slots away between passes.
    pub(crate) fn sweep(&mut self) {
        self.slots.retain(|slot| !slot.dead);
    }
}
