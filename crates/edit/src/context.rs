//! Page-scoped edit registry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use claimdesk_logger as logger;

use crate::EditPhase;

/// Identifier of an editable region.
///
/// Any cloneable, hashable value works: a string, an integer or a newtype.
pub trait RegionId: Clone + Eq + Hash + fmt::Debug + 'static {}

impl<T: Clone + Eq + Hash + fmt::Debug + 'static> RegionId for T {}

/// Callback that reverts a region's edit buffer.
///
/// The argument is `true` when the region must discard without asking.
pub type CancelCallback = Rc<dyn Fn(bool)>;

type DeferredAction = Box<dyn FnOnce()>;

struct EditState<R> {
    /// Region currently in edit mode
    active: Option<R>,
    /// Action waiting for discard confirmation; `Some` means the dialog is open
    pending: Option<DeferredAction>,
    /// Revert callbacks keyed by region
    cancel_callbacks: HashMap<R, CancelCallback>,
    /// One-shot bypass of the discard guard
    force_skip: bool,
}

impl<R> Default for EditState<R> {
    fn default() -> Self {
        Self {
            active: None,
            pending: None,
            cancel_callbacks: HashMap::new(),
            force_skip: false,
        }
    }
}

/// Edit coordination registry shared by all sections of one page.
///
/// Cloning the handle does not copy the state. Consumer closures are never
/// invoked while the registry is borrowed, so actions and cancel callbacks
/// may call back into the same context.
pub struct EditContext<R: RegionId> {
    inner: Rc<RefCell<EditState<R>>>,
}

impl<R: RegionId> EditContext<R> {
    /// Create a registry for a new page
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(EditState::default())),
        }
    }

    /// Get a non-owning handle
    pub fn downgrade(&self) -> WeakEditContext<R> {
        WeakEditContext {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // ===== Active region =====

    /// Put `region` in edit mode.
    ///
    /// The previous region is replaced without any check; callers run the
    /// discard guard first when the previous region has unsaved edits.
    pub fn set_active_component(&self, region: R) {
        let mut state = self.inner.borrow_mut();
        logger::debug(format!(
            "Edit region activated: {:?} (previous: {:?})",
            region, state.active
        ));
        state.active = Some(region);
    }

    /// Leave edit mode. Does nothing when no region is active.
    pub fn clear_active_component(&self) {
        let previous = self.inner.borrow_mut().active.take();
        if let Some(region) = previous {
            logger::debug(format!("Edit region cleared: {:?}", region));
        }
    }

    /// Region currently in edit mode
    pub fn active_component(&self) -> Option<R> {
        self.inner.borrow().active.clone()
    }

    /// Check whether `region` is the one being edited
    pub fn is_active(&self, region: &R) -> bool {
        self.inner.borrow().active.as_ref() == Some(region)
    }

    pub fn is_any_component_editing(&self) -> bool {
        self.inner.borrow().active.is_some()
    }

    /// `true` while nothing is being edited, so expensive content may be
    /// rendered lazily.
    pub fn should_use_lazy(&self) -> bool {
        !self.is_any_component_editing()
    }

    // ===== Discard guard =====

    /// Whether a discard confirmation is waiting for the user
    pub fn confirmation_pending(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }

    /// Route a transition that would abandon the current edit.
    ///
    /// With force-skip set, `action` runs immediately and the flag is reset.
    /// The active region is left as is in that case: the action decides what
    /// becomes active next. Otherwise `action` is deferred until
    /// [`confirm_discard`](Self::confirm_discard) or dropped by
    /// [`cancel_discard`](Self::cancel_discard).
    pub fn handle_unsaved_changes<F>(&self, action: F)
    where
        F: FnOnce() + 'static,
    {
        let force_skip = self.inner.borrow().force_skip;
        if force_skip {
            logger::debug("Discard guard bypassed (force-skip)");
            action();
            self.inner.borrow_mut().force_skip = false;
            return;
        }

        let replaced = self.inner.borrow_mut().pending.replace(Box::new(action));
        if replaced.is_some() {
            logger::debug("Discard confirmation re-requested, previous action dropped");
        } else {
            logger::debug("Discard confirmation requested");
        }
        drop(replaced);
    }

    /// User agreed to discard: run the deferred action, then leave edit mode.
    ///
    /// The action runs while the active region is still set.
    pub fn confirm_discard(&self) {
        let action = self.inner.borrow_mut().pending.take();
        if let Some(action) = action {
            logger::debug("Discard confirmed");
            action();
        }
        self.clear_active_component();
    }

    /// User declined to discard. The current edit continues.
    pub fn cancel_discard(&self) {
        let dropped = self.inner.borrow_mut().pending.take();
        if dropped.is_some() {
            logger::debug("Discard cancelled");
        }
        drop(dropped);
    }

    /// Arm or disarm the one-shot bypass of the discard guard.
    pub fn set_force_skip_confirmation(&self, force_skip: bool) {
        self.inner.borrow_mut().force_skip = force_skip;
    }

    pub fn force_skip_confirmation(&self) -> bool {
        self.inner.borrow().force_skip
    }

    // ===== Cancel callbacks =====

    /// Store the revert callback of `region`, replacing any earlier one.
    pub fn register_cancel_callback<F>(&self, region: R, callback: F)
    where
        F: Fn(bool) + 'static,
    {
        self.insert_callback(region, Rc::new(callback));
    }

    /// Remove the revert callback of `region`. Unknown regions are ignored.
    pub fn unregister_cancel_callback(&self, region: &R) {
        let removed = self.inner.borrow_mut().cancel_callbacks.remove(region);
        if removed.is_some() {
            logger::debug(format!("Cancel callback unregistered: {:?}", region));
        }
        drop(removed);
    }

    pub fn has_cancel_callback(&self, region: &R) -> bool {
        self.inner.borrow().cancel_callbacks.contains_key(region)
    }

    /// Register `callback` for as long as the returned guard lives.
    ///
    /// Dropping the guard unregisters the callback unless the region has
    /// been registered again in the meantime.
    pub fn mount_region<F>(&self, region: R, callback: F) -> CancelRegistration<R>
    where
        F: Fn(bool) + 'static,
    {
        let callback: CancelCallback = Rc::new(callback);
        self.insert_callback(region.clone(), Rc::clone(&callback));
        CancelRegistration {
            context: self.downgrade(),
            region,
            callback,
        }
    }

    /// Ask whichever region is being edited to revert itself.
    ///
    /// The callback receives `skip_confirmation || force_skip`; an armed
    /// force-skip flag is consumed. Returns `false` without side effects when
    /// no region is active or the active region has no callback.
    pub fn trigger_cancel_edit(&self, skip_confirmation: bool) -> bool {
        let (target, force_skip) = {
            let state = self.inner.borrow();
            let target = state.active.as_ref().and_then(|region| {
                state
                    .cancel_callbacks
                    .get(region)
                    .map(|callback| (region.clone(), Rc::clone(callback)))
            });
            (target, state.force_skip)
        };

        let Some((region, callback)) = target else {
            return false;
        };

        let effective_skip = skip_confirmation || force_skip;
        logger::debug(format!(
            "Cancel edit dispatched to {:?} (skip confirmation: {})",
            region, effective_skip
        ));
        callback(effective_skip);

        if force_skip {
            self.inner.borrow_mut().force_skip = false;
        }
        true
    }

    /// Current state machine phase
    pub fn phase(&self) -> EditPhase {
        let state = self.inner.borrow();
        match (&state.active, &state.pending) {
            (_, Some(_)) => EditPhase::ConfirmingDiscard,
            (Some(_), None) => EditPhase::Editing,
            (None, None) => EditPhase::Idle,
        }
    }

    fn insert_callback(&self, region: R, callback: CancelCallback) {
        let replaced = self
            .inner
            .borrow_mut()
            .cancel_callbacks
            .insert(region.clone(), callback);
        if replaced.is_some() {
            logger::debug(format!("Cancel callback replaced: {:?}", region));
        } else {
            logger::debug(format!("Cancel callback registered: {:?}", region));
        }
        drop(replaced);
    }

    fn unregister_if_current(&self, region: &R, callback: &CancelCallback) {
        let removed = {
            let mut state = self.inner.borrow_mut();
            let is_current = state
                .cancel_callbacks
                .get(region)
                .is_some_and(|current| Rc::ptr_eq(current, callback));
            if is_current {
                state.cancel_callbacks.remove(region)
            } else {
                None
            }
        };
        if removed.is_some() {
            logger::debug(format!("Region unmounted: {:?}", region));
        }
        drop(removed);
    }
}

impl<R: RegionId> Default for EditContext<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RegionId> Clone for EditContext<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R: RegionId> fmt::Debug for EditContext<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("EditContext")
            .field("active", &state.active)
            .field("confirmation_pending", &state.pending.is_some())
            .field("force_skip", &state.force_skip)
            .field("regions", &state.cancel_callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Non-owning handle to an [`EditContext`].
///
/// Closures stored inside the registry hold this instead of a strong handle
/// so the page state can be dropped.
pub struct WeakEditContext<R: RegionId> {
    inner: Weak<RefCell<EditState<R>>>,
}

impl<R: RegionId> WeakEditContext<R> {
    /// Get a strong handle if the page is still alive
    pub fn upgrade(&self) -> Option<EditContext<R>> {
        self.inner.upgrade().map(|inner| EditContext { inner })
    }
}

impl<R: RegionId> Clone for WeakEditContext<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<R: RegionId> fmt::Debug for WeakEditContext<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEditContext")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Mounted region. Unregisters its cancel callback on drop.
#[must_use = "dropping the registration unmounts the region immediately"]
pub struct CancelRegistration<R: RegionId> {
    context: WeakEditContext<R>,
    region: R,
    callback: CancelCallback,
}

impl<R: RegionId> CancelRegistration<R> {
    pub fn region(&self) -> &R {
        &self.region
    }
}

impl<R: RegionId> fmt::Debug for CancelRegistration<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelRegistration")
            .field("region", &self.region)
            .finish()
    }
}

impl<R: RegionId> Drop for CancelRegistration<R> {
    fn drop(&mut self) {
        if let Some(context) = self.context.upgrade() {
            context.unregister_if_current(&self.region, &self.callback);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        (count, move || handle.set(handle.get() + 1))
    }

    fn recorder() -> (Rc<RefCell<Vec<bool>>>, impl Fn(bool) + 'static) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let handle = Rc::clone(&calls);
        (calls, move |skip| handle.borrow_mut().push(skip))
    }

    #[test]
    fn test_starts_idle() {
        let ctx: EditContext<&str> = EditContext::new();
        assert_eq!(ctx.phase(), EditPhase::Idle);
        assert!(!ctx.is_any_component_editing());
        assert!(ctx.should_use_lazy());
        assert!(!ctx.confirmation_pending());
        assert!(!ctx.force_skip_confirmation());
    }

    #[test]
    fn test_last_activation_wins() {
        let ctx = EditContext::new();
        ctx.set_active_component("A");
        ctx.set_active_component("B");

        assert_eq!(ctx.active_component(), Some("B"));
        assert!(ctx.is_active(&"B"));
        assert!(!ctx.is_active(&"A"));
        assert!(ctx.is_any_component_editing());
        assert!(!ctx.should_use_lazy());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let ctx = EditContext::new();
        ctx.set_active_component(1u32);
        ctx.clear_active_component();
        ctx.clear_active_component();
        assert_eq!(ctx.active_component(), None);
        assert_eq!(ctx.phase(), EditPhase::Idle);
    }

    #[test]
    fn test_force_skip_is_one_shot() {
        let ctx = EditContext::new();
        ctx.set_active_component("A");
        ctx.set_force_skip_confirmation(true);

        let (first, action) = counter();
        ctx.handle_unsaved_changes(action);
        assert_eq!(first.get(), 1);
        assert!(!ctx.confirmation_pending());
        assert!(!ctx.force_skip_confirmation());

        let (second, action) = counter();
        ctx.handle_unsaved_changes(action);
        assert_eq!(second.get(), 0);
        assert!(ctx.confirmation_pending());
    }

    #[test]
    fn test_force_skip_keeps_active_region() {
        let ctx = EditContext::new();
        ctx.set_active_component("A");
        ctx.set_force_skip_confirmation(true);

        ctx.handle_unsaved_changes(|| {});

        assert_eq!(ctx.active_component(), Some("A"));
        assert_eq!(ctx.phase(), EditPhase::Editing);
    }

    #[test]
    fn test_confirm_discard_runs_action_and_clears() {
        let ctx = EditContext::new();
        ctx.set_active_component("A");

        let (count, action) = counter();
        ctx.handle_unsaved_changes(action);
        assert!(ctx.confirmation_pending());
        assert_eq!(ctx.phase(), EditPhase::ConfirmingDiscard);
        assert_eq!(count.get(), 0);

        ctx.confirm_discard();
        assert_eq!(count.get(), 1);
        assert!(!ctx.confirmation_pending());
        assert_eq!(ctx.active_component(), None);
        assert_eq!(ctx.phase(), EditPhase::Idle);

        // A second confirmation has nothing left to run
        ctx.confirm_discard();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_action_sees_active_region() {
        let ctx = EditContext::new();
        ctx.set_active_component("A");

        let seen = Rc::new(RefCell::new(None));
        let (handle, seen_in_action) = (ctx.clone(), Rc::clone(&seen));
        ctx.handle_unsaved_changes(move || {
            *seen_in_action.borrow_mut() = handle.active_component();
        });
        ctx.confirm_discard();

        assert_eq!(*seen.borrow(), Some("A"));
    }

    #[test]
    fn test_cancel_discard_preserves_edit() {
        let ctx = EditContext::new();
        ctx.set_active_component("A");

        let (count, action) = counter();
        ctx.handle_unsaved_changes(action);
        ctx.cancel_discard();

        assert_eq!(count.get(), 0);
        assert!(!ctx.confirmation_pending());
        assert_eq!(ctx.active_component(), Some("A"));
        assert_eq!(ctx.phase(), EditPhase::Editing);

        // The dropped action must not run on a later confirmation
        ctx.confirm_discard();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_confirmation_tracks_pending_action() {
        let ctx = EditContext::new();
        ctx.set_active_component("A");
        assert!(!ctx.confirmation_pending());

        ctx.handle_unsaved_changes(|| {});
        assert!(ctx.confirmation_pending());

        let (count, action) = counter();
        ctx.handle_unsaved_changes(action);
        assert!(ctx.confirmation_pending());

        ctx.confirm_discard();
        assert_eq!(count.get(), 1);
        assert!(!ctx.confirmation_pending());

        ctx.handle_unsaved_changes(|| {});
        ctx.cancel_discard();
        assert!(!ctx.confirmation_pending());
    }

    #[test]
    fn test_trigger_cancel_round_trip() {
        let ctx = EditContext::new();
        let (calls, callback) = recorder();
        ctx.register_cancel_callback("A", callback);
        ctx.set_active_component("A");

        assert!(ctx.trigger_cancel_edit(false));
        assert_eq!(*calls.borrow(), vec![false]);

        ctx.unregister_cancel_callback(&"A");
        assert!(!ctx.trigger_cancel_edit(false));
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(ctx.active_component(), Some("A"));
    }

    #[test]
    fn test_force_skip_overrides_trigger_argument() {
        let ctx = EditContext::new();
        let (calls, callback) = recorder();
        ctx.register_cancel_callback("A", callback);
        ctx.set_active_component("A");
        ctx.set_force_skip_confirmation(true);

        assert!(ctx.trigger_cancel_edit(false));
        assert!(!ctx.force_skip_confirmation());
        assert!(ctx.trigger_cancel_edit(false));

        assert_eq!(*calls.borrow(), vec![true, false]);
    }

    #[test]
    fn test_trigger_without_active_region() {
        let ctx = EditContext::new();
        let (calls, callback) = recorder();
        ctx.register_cancel_callback("A", callback);
        ctx.set_force_skip_confirmation(true);

        assert!(!ctx.trigger_cancel_edit(false));
        assert!(calls.borrow().is_empty());
        // No dispatch, so the flag stays armed
        assert!(ctx.force_skip_confirmation());
    }

    #[test]
    fn test_trigger_for_unregistered_active_region() {
        let ctx = EditContext::new();
        let (calls, callback) = recorder();
        ctx.register_cancel_callback("A", callback);
        ctx.set_active_component("B");

        assert!(!ctx.trigger_cancel_edit(true));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_register_overwrites() {
        let ctx = EditContext::new();
        let (first, callback) = recorder();
        ctx.register_cancel_callback("A", callback);
        let (second, callback) = recorder();
        ctx.register_cancel_callback("A", callback);
        ctx.set_active_component("A");

        ctx.trigger_cancel_edit(true);
        assert!(first.borrow().is_empty());
        assert_eq!(*second.borrow(), vec![true]);
    }

    #[test]
    fn test_unregister_unknown_region_is_noop() {
        let ctx: EditContext<&str> = EditContext::new();
        ctx.unregister_cancel_callback(&"missing");
        assert!(!ctx.has_cancel_callback(&"missing"));
    }

    #[test]
    fn test_callback_may_reenter_context() {
        let ctx = EditContext::new();
        let weak = ctx.downgrade();
        ctx.register_cancel_callback("A", move |_skip| {
            if let Some(ctx) = weak.upgrade() {
                ctx.clear_active_component();
            }
        });
        ctx.set_active_component("A");

        assert!(ctx.trigger_cancel_edit(false));
        assert_eq!(ctx.active_component(), None);
    }

    #[test]
    fn test_forced_action_may_trigger_cancel() {
        let ctx = EditContext::new();
        let (calls, callback) = recorder();
        ctx.register_cancel_callback("A", callback);
        ctx.set_active_component("A");
        ctx.set_force_skip_confirmation(true);

        let handle = ctx.clone();
        ctx.handle_unsaved_changes(move || {
            handle.trigger_cancel_edit(false);
        });

        assert_eq!(*calls.borrow(), vec![true]);
        assert!(!ctx.force_skip_confirmation());
    }

    #[test]
    fn test_mount_region_unregisters_on_drop() {
        let ctx = EditContext::new();
        let (_calls, callback) = recorder();
        let registration = ctx.mount_region("A", callback);
        assert_eq!(registration.region(), &"A");
        assert!(ctx.has_cancel_callback(&"A"));

        drop(registration);
        assert!(!ctx.has_cancel_callback(&"A"));
    }

    #[test]
    fn test_stale_registration_keeps_remount() {
        let ctx = EditContext::new();
        let (_old, callback) = recorder();
        let old = ctx.mount_region("A", callback);
        let (new_calls, callback) = recorder();
        let _new = ctx.mount_region("A", callback);

        drop(old);
        assert!(ctx.has_cancel_callback(&"A"));

        ctx.set_active_component("A");
        ctx.trigger_cancel_edit(false);
        assert_eq!(*new_calls.borrow(), vec![false]);
    }

    #[test]
    fn test_registration_outlives_context() {
        let ctx = EditContext::new();
        let registration = ctx.mount_region("A", |_| {});
        let weak = ctx.downgrade();
        drop(ctx);

        assert!(weak.upgrade().is_none());
        drop(registration);
    }
}
