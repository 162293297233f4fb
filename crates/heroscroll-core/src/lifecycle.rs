#![forbid(unsafe_code)]

//! Scoped listener acquisition.
//!
//! A controller only receives input while its host listeners are attached.
//! [`ListenerScope`] owns a set of [`InputBindings`] and guarantees:
//!
//! 1. Bindings are attached when the scope is created.
//! 2. Bindings are detached exactly once on every exit path: explicit
//!    [`ListenerScope::detach`], or `Drop` (unmount, panic unwinding).
//! 3. [`ListenerScope::cycle`] (media change) runs one detach followed by
//!    one attach.
//!
//! Bindings are per-instance values; nothing here is global, so two mounted
//! heroes never share listener state.

/// A host's set of input listeners for one controller.
pub trait InputBindings {
    type Error;

    /// Install the listeners.
    fn attach(&mut self) -> Result<(), Self::Error>;

    /// Remove every listener installed by [`attach`](Self::attach).
    fn detach(&mut self);
}

/// Attach-on-create, detach-on-drop owner of [`InputBindings`].
#[derive(Debug)]
pub struct ListenerScope<B: InputBindings> {
    bindings: B,
    attached: bool,
    attach_count: u64,
    detach_count: u64,
}

impl<B: InputBindings> ListenerScope<B> {
    /// Attach `bindings` and take ownership of them.
    pub fn new(mut bindings: B) -> Result<Self, B::Error> {
        bindings.attach()?;
        Ok(Self {
            bindings,
            attached: true,
            attach_count: 1,
            detach_count: 0,
        })
    }

    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    #[must_use]
    pub fn attach_count(&self) -> u64 {
        self.attach_count
    }

    #[must_use]
    pub fn detach_count(&self) -> u64 {
        self.detach_count
    }

    #[must_use]
    pub fn bindings(&self) -> &B {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut B {
        &mut self.bindings
    }

    /// Remove the listeners. Idempotent.
    pub fn detach(&mut self) {
        if self.attached {
            self.bindings.detach();
            self.attached = false;
            self.detach_count += 1;
        }
    }

    /// Re-attach after a [`detach`](Self::detach). No-op while attached.
    pub fn attach(&mut self) -> Result<(), B::Error> {
        if !self.attached {
            self.bindings.attach()?;
            self.attached = true;
            self.attach_count += 1;
        }
        Ok(())
    }

    /// Detach then attach, exactly once each.
    pub fn cycle(&mut self) -> Result<(), B::Error> {
        self.detach();
        self.attach()
    }
}

impl<B: InputBindings> Drop for ListenerScope<B> {
    fn drop(&mut self) {
        self.detach();
    }
}
