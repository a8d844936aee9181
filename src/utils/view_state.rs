use dioxus::prelude::*;

/// Scoped write access to a view model.
///
/// Controllers mutate state only inside `update`, so a borrow never lives across an `.await`.
/// Components pass their `Signal`; tests pass `&mut` to a plain value.
pub trait ViewHandle<T> {
    fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R;

    fn read_with<R>(&mut self, f: impl FnOnce(&T) -> R) -> R {
        self.update(|state| f(state))
    }
}

impl<T: 'static> ViewHandle<T> for Signal<T> {
    fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.write();
        f(&mut guard)
    }

    fn read_with<R>(&mut self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.read();
        f(&guard)
    }
}

impl<T> ViewHandle<T> for &mut T {
    fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        f(self)
    }
}
