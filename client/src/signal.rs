pub type SlotHandle = u32;

/// Ordered list of callbacks sharing one argument type
pub struct Signal<A: ?Sized> {
    next_handle: SlotHandle,
    slots: Vec<(SlotHandle, Box<dyn FnMut(&A)>)>,
}

impl<A: ?Sized> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> Signal<A> {
    pub fn new() -> Self {
        Self {
            next_handle: 0,
            slots: Vec::new(),
        }
    }

    pub fn connect(&mut self, slot: impl FnMut(&A) + 'static) -> SlotHandle {
        let handle = self.next_handle;
        self.next_handle = self.next_handle.wrapping_add(1);
        self.slots.push((handle, Box::new(slot)));
        handle
    }

    /// Returns false if the handle was not connected
    pub fn disconnect(&mut self, handle: SlotHandle) -> bool {
        let before = self.slots.len();
        self.slots.retain(|(slot_handle, _)| *slot_handle != handle);
        self.slots.len() != before
    }

    pub fn emit(&mut self, arg: &A) {
        for (_, slot) in self.slots.iter_mut() {
            slot(arg);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
