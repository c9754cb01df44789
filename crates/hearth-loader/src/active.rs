//! Per-thread active loading context.
//!
//! Late-bound type resolution deeper in the system consults the calling
//! thread's bound context rather than a passed-in reference, so the
//! bootstrap rebinds before driving the daemon — and any thread that later
//! issues a stop command (a service-manager callback, for example) must
//! rebind itself the same way.

use std::cell::RefCell;
use std::sync::Arc;

use crate::context::LoaderContext;

thread_local! {
    static ACTIVE: RefCell<Option<Arc<LoaderContext>>> = const { RefCell::new(None) };
}

/// Binds the calling thread's active context, replacing any previous one.
pub fn bind(context: Arc<LoaderContext>) {
    ACTIVE.with(|active| {
        *active.borrow_mut() = Some(context);
    });
}

/// Returns the calling thread's active context, when one is bound.
#[must_use]
pub fn current() -> Option<Arc<LoaderContext>> {
    ACTIVE.with(|active| active.borrow().clone())
}

/// Clears the calling thread's binding.
pub fn clear() {
    ACTIVE.with(|active| {
        *active.borrow_mut() = None;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_is_visible_on_the_same_thread() {
        clear();
        let context = LoaderContext::new("server", None, Vec::new());
        bind(Arc::clone(&context));
        let bound = current().expect("context should be bound");
        assert!(Arc::ptr_eq(&bound, &context));
        clear();
        assert!(current().is_none());
    }

    #[test]
    fn binding_does_not_leak_across_threads() {
        let context = LoaderContext::new("server", None, Vec::new());
        bind(context);
        let seen = std::thread::spawn(|| current().is_some())
            .join()
            .expect("thread join");
        assert!(!seen);
        clear();
    }
}
