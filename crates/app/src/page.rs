//! Claim detail page: tabs of form sections coordinated by one edit registry.
//!
//! Sections never touch the page directly. Their cancel callbacks and the
//! deferred actions of the discard guard push [`PageCommand`]s onto a shared
//! queue, which the page drains after every input.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use claimdesk_edit::{CancelRegistration, EditContext, EditPhase};
use claimdesk_form::{FormSection, SectionId};
use claimdesk_logger as logger;

use crate::claim::Claim;

/// Deferred page mutation produced by callbacks and guard actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCommand {
    /// Put a section in edit mode
    BeginEdit(SectionId),
    /// A section reverted its draft and left edit mode
    EditFinished(SectionId),
    /// A section with unsaved changes asked to be reverted
    GuardRevert(SectionId),
    /// Show another tab
    SwitchTab(usize),
    /// Leave the application
    Quit,
}

type CommandQueue = Rc<RefCell<VecDeque<PageCommand>>>;

/// Kind of status line message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// One tab of the page
#[derive(Debug, Clone)]
pub struct Tab {
    pub title: String,
    pub sections: Vec<SectionId>,
}

/// Detail page state.
pub struct ClaimPage {
    claim_number: String,
    claim_status: String,
    tabs: Vec<Tab>,
    sections: HashMap<SectionId, Rc<RefCell<FormSection>>>,
    active_tab: usize,
    /// Selected section index within the active tab
    selected: usize,
    edit: EditContext<SectionId>,
    /// Cancel callbacks of the sections on the active tab
    mounted: Vec<CancelRegistration<SectionId>>,
    queue: CommandQueue,
    /// Ask before discarding unsaved edits
    confirm_discard: bool,
    status: Option<(String, StatusKind)>,
    should_quit: bool,
}

impl ClaimPage {
    pub fn new(claim: &Claim, confirm_discard: bool) -> Self {
        let mut sections = HashMap::new();
        let tabs = claim
            .tabs
            .iter()
            .map(|tab| Tab {
                title: tab.title.clone(),
                sections: tab
                    .sections
                    .iter()
                    .map(|section| {
                        sections.insert(
                            section.id.clone(),
                            Rc::new(RefCell::new(section.to_form_section())),
                        );
                        section.id.clone()
                    })
                    .collect(),
            })
            .collect();

        let mut page = Self {
            claim_number: claim.claim_number.clone(),
            claim_status: claim.status.clone(),
            tabs,
            sections,
            active_tab: 0,
            selected: 0,
            edit: EditContext::new(),
            mounted: Vec::new(),
            queue: Rc::new(RefCell::new(VecDeque::new())),
            confirm_discard,
            status: None,
            should_quit: false,
        };
        page.mount_active_tab();
        page
    }

    // ===== Accessors =====

    pub fn claim_number(&self) -> &str {
        &self.claim_number
    }

    pub fn claim_status(&self) -> &str {
        &self.claim_status
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_tab(&self) -> usize {
        self.active_tab
    }

    pub fn edit(&self) -> &EditContext<SectionId> {
        &self.edit
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status(&self) -> Option<(&str, StatusKind)> {
        self.status.as_ref().map(|(msg, kind)| (msg.as_str(), *kind))
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Section ids on the active tab
    pub fn visible_sections(&self) -> &[SectionId] {
        &self.tabs[self.active_tab].sections
    }

    pub fn selected_section(&self) -> Option<&SectionId> {
        self.visible_sections().get(self.selected)
    }

    /// Run `f` against a section's edit buffer
    pub fn with_section<T>(&self, id: &SectionId, f: impl FnOnce(&FormSection) -> T) -> Option<T> {
        self.sections.get(id).map(|section| f(&section.borrow()))
    }

    /// Run `f` against the section in edit mode
    pub fn with_active_section_mut<T>(&self, f: impl FnOnce(&mut FormSection) -> T) -> Option<T> {
        let id = self.edit.active_component()?;
        self.sections
            .get(&id)
            .map(|section| f(&mut section.borrow_mut()))
    }

    /// Whether the section in edit mode has unsaved changes
    pub fn active_is_dirty(&self) -> bool {
        self.edit
            .active_component()
            .and_then(|id| self.with_section(&id, FormSection::is_dirty))
            .unwrap_or(false)
    }

    pub fn phase(&self) -> EditPhase {
        self.edit.phase()
    }

    // ===== Mounting =====

    /// Register cancel callbacks for the active tab's sections.
    ///
    /// Registrations of the previous tab are dropped first, which unregisters
    /// them.
    fn mount_active_tab(&mut self) {
        self.mounted.clear();

        let ids = self.tabs[self.active_tab].sections.clone();
        for id in ids {
            let Some(section) = self.sections.get(&id).map(Rc::clone) else {
                continue;
            };
            let queue = Rc::clone(&self.queue);
            let region = id.clone();
            let registration = self.edit.mount_region(id, move |skip_confirmation| {
                let dirty = section.borrow().is_dirty();
                if skip_confirmation || !dirty {
                    section.borrow_mut().revert();
                    queue
                        .borrow_mut()
                        .push_back(PageCommand::EditFinished(region.clone()));
                } else {
                    queue
                        .borrow_mut()
                        .push_back(PageCommand::GuardRevert(region.clone()));
                }
            });
            self.mounted.push(registration);
        }
    }

    // ===== Selection =====

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible_sections().len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select(&mut self, id: &SectionId) {
        if let Some(index) = self.visible_sections().iter().position(|s| s == id) {
            self.selected = index;
        }
    }

    // ===== Edit transitions =====

    /// Run `action` through the discard guard
    fn guard(&mut self, action: impl FnOnce() + 'static) {
        if !self.confirm_discard {
            self.edit.set_force_skip_confirmation(true);
        }
        self.edit.handle_unsaved_changes(action);
        self.process_commands();
    }

    /// Put the selected section in edit mode
    pub fn begin_edit_selected(&mut self) {
        if let Some(id) = self.selected_section().cloned() {
            self.request_edit(id);
        }
    }

    /// Switch edit mode to `id`, guarding unsaved changes of the current one
    pub fn request_edit(&mut self, id: SectionId) {
        self.select(&id);
        match self.edit.active_component() {
            Some(active) if active == id => {}
            Some(_) if self.active_is_dirty() => {
                let edit = self.edit.downgrade();
                let queue = Rc::clone(&self.queue);
                self.guard(move || {
                    if let Some(edit) = edit.upgrade() {
                        edit.trigger_cancel_edit(true);
                    }
                    queue.borrow_mut().push_back(PageCommand::BeginEdit(id));
                });
            }
            Some(_) => {
                self.edit.trigger_cancel_edit(true);
                self.queue.borrow_mut().push_back(PageCommand::BeginEdit(id));
                self.process_commands();
            }
            None => self.start_edit(id),
        }
    }

    fn start_edit(&mut self, id: SectionId) {
        let Some(section) = self.sections.get(&id) else {
            return;
        };
        section.borrow_mut().begin_edit();
        let title = section.borrow().title().to_string();
        self.edit.set_active_component(id);
        self.set_status(format!("Editing {}", title), StatusKind::Info);
    }

    /// Commit the section in edit mode
    pub fn save_active(&mut self) {
        let Some(id) = self.edit.active_component() else {
            return;
        };
        let Some(section) = self.sections.get(&id).map(Rc::clone) else {
            return;
        };

        let missing: Vec<String> = section
            .borrow()
            .missing_required()
            .into_iter()
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            logger::warn(format!(
                "Claim {}: save of {} refused, missing {}",
                self.claim_number,
                id,
                missing.join(", ")
            ));
            self.set_status(
                format!("Required: {}", missing.join(", ")),
                StatusKind::Error,
            );
            return;
        }

        let changed = section.borrow_mut().commit();
        let title = section.borrow().title().to_string();
        self.edit.clear_active_component();

        if changed.is_empty() {
            self.set_status(format!("{}: nothing to save", title), StatusKind::Info);
        } else {
            logger::info(format!(
                "Claim {}: saved {} ({})",
                self.claim_number,
                id,
                changed.join(", ")
            ));
            self.set_status(format!("{} saved", title), StatusKind::Success);
        }
    }

    /// Ask the section in edit mode to revert itself
    pub fn cancel_active(&mut self) {
        self.edit.trigger_cancel_edit(false);
        self.process_commands();
    }

    /// Switch tab, guarding unsaved changes
    pub fn request_tab(&mut self, index: usize) {
        if index >= self.tabs.len() || index == self.active_tab {
            return;
        }

        if !self.edit.is_any_component_editing() {
            self.switch_tab(index);
            return;
        }

        if !self.active_is_dirty() {
            self.edit.trigger_cancel_edit(true);
            self.queue
                .borrow_mut()
                .push_back(PageCommand::SwitchTab(index));
            self.process_commands();
            return;
        }

        // The dialog is the confirmation; the revert itself must not ask again
        let edit = self.edit.downgrade();
        let queue = Rc::clone(&self.queue);
        self.guard(move || {
            if let Some(edit) = edit.upgrade() {
                edit.set_force_skip_confirmation(true);
                edit.trigger_cancel_edit(false);
            }
            queue.borrow_mut().push_back(PageCommand::SwitchTab(index));
        });
    }

    pub fn next_tab(&mut self) {
        self.request_tab((self.active_tab + 1) % self.tabs.len());
    }

    pub fn prev_tab(&mut self) {
        let count = self.tabs.len();
        self.request_tab((self.active_tab + count - 1) % count);
    }

    fn switch_tab(&mut self, index: usize) {
        self.active_tab = index;
        self.selected = 0;
        self.mount_active_tab();
        logger::debug(format!("Tab switched to {}", self.tabs[index].title));
    }

    /// Quit, guarding unsaved changes
    pub fn request_quit(&mut self) {
        if self.active_is_dirty() {
            let queue = Rc::clone(&self.queue);
            self.guard(move || queue.borrow_mut().push_back(PageCommand::Quit));
        } else {
            self.should_quit = true;
        }
    }

    /// Quit without asking, discarding any edit
    pub fn force_quit(&mut self) {
        let queue = Rc::clone(&self.queue);
        self.edit.set_force_skip_confirmation(true);
        self.edit
            .handle_unsaved_changes(move || queue.borrow_mut().push_back(PageCommand::Quit));
        self.process_commands();
    }

    // ===== Discard dialog answers =====

    pub fn confirm_discard(&mut self) {
        self.edit.confirm_discard();
        self.process_commands();
    }

    pub fn cancel_discard(&mut self) {
        self.edit.cancel_discard();
        self.set_status("Still editing", StatusKind::Info);
    }

    /// Title of the section the discard dialog is about
    pub fn discard_subject(&self) -> Option<String> {
        let id = self.edit.active_component()?;
        self.with_section(&id, |section| section.title().to_string())
    }

    // ===== Command queue =====

    /// Apply queued commands until the queue is empty
    pub fn process_commands(&mut self) {
        loop {
            let command = self.queue.borrow_mut().pop_front();
            let Some(command) = command else {
                break;
            };
            logger::debug(format!("Page command: {:?}", command));

            match command {
                PageCommand::BeginEdit(id) => self.start_edit(id),
                PageCommand::EditFinished(id) => {
                    if self.edit.is_active(&id) {
                        self.edit.clear_active_component();
                    }
                    if let Some(title) = self.with_section(&id, |s| s.title().to_string()) {
                        self.set_status(format!("{} closed", title), StatusKind::Info);
                    }
                }
                PageCommand::GuardRevert(id) => {
                    let edit = self.edit.downgrade();
                    self.guard(move || {
                        if let Some(edit) = edit.upgrade() {
                            if edit.is_active(&id) {
                                edit.trigger_cancel_edit(true);
                            }
                        }
                    });
                }
                PageCommand::SwitchTab(index) => self.switch_tab(index),
                PageCommand::Quit => self.should_quit = true,
            }
        }
    }

    fn set_status(&mut self, message: impl Into<String>, kind: StatusKind) {
        self.status = Some((message.into(), kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> ClaimPage {
        ClaimPage::new(&Claim::demo().unwrap(), true)
    }

    fn id(name: &str) -> SectionId {
        SectionId::new(name)
    }

    fn type_text(page: &ClaimPage, text: &str) {
        page.with_active_section_mut(|section| {
            for c in text.chars() {
                section.push_char(c);
            }
        });
    }

    #[test]
    fn test_mounts_first_tab_only() {
        let page = page();
        assert!(page.edit().has_cancel_callback(&id("policy")));
        assert!(page.edit().has_cancel_callback(&id("payment")));
        assert!(!page.edit().has_cancel_callback(&id("claimant")));
        assert_eq!(page.phase(), EditPhase::Idle);
    }

    #[test]
    fn test_begin_edit_and_save() {
        let mut page = page();
        page.begin_edit_selected();
        assert!(page.edit().is_active(&id("policy")));

        type_text(&page, "-A");
        assert!(page.active_is_dirty());

        page.save_active();
        assert_eq!(page.phase(), EditPhase::Idle);
        let saved = page
            .with_section(&id("policy"), |s| s.saved_value("policy_number").to_string())
            .unwrap();
        assert_eq!(saved, "POL-88213-A");
        assert_eq!(page.status().map(|(_, kind)| kind), Some(StatusKind::Success));
    }

    #[test]
    fn test_save_blocked_by_required_field() {
        let mut page = page();
        page.begin_edit_selected();
        page.with_active_section_mut(|s| {
            s.set_draft("policy_number", claimdesk_form::FieldValue::text(""))
        });

        page.save_active();
        assert!(page.edit().is_active(&id("policy")));
        assert_eq!(page.status().map(|(_, kind)| kind), Some(StatusKind::Error));
    }

    #[test]
    fn test_switching_from_clean_section_skips_dialog() {
        let mut page = page();
        page.begin_edit_selected();
        page.request_edit(id("incident"));

        assert!(!page.edit().confirmation_pending());
        assert!(page.edit().is_active(&id("incident")));
    }

    #[test]
    fn test_switching_from_dirty_section_asks_first() {
        let mut page = page();
        page.begin_edit_selected();
        type_text(&page, "X");

        page.request_edit(id("incident"));
        assert_eq!(page.phase(), EditPhase::ConfirmingDiscard);
        assert!(page.edit().is_active(&id("policy")));
        assert_eq!(page.discard_subject().as_deref(), Some("Policy"));

        page.confirm_discard();
        assert!(page.edit().is_active(&id("incident")));
        let reverted = page
            .with_section(&id("policy"), |s| s.is_dirty())
            .unwrap();
        assert!(!reverted);
    }

    #[test]
    fn test_declining_keeps_edit() {
        let mut page = page();
        page.begin_edit_selected();
        type_text(&page, "X");

        page.request_edit(id("incident"));
        page.cancel_discard();

        assert_eq!(page.phase(), EditPhase::Editing);
        assert!(page.edit().is_active(&id("policy")));
        assert!(page.active_is_dirty());
    }

    #[test]
    fn test_escape_on_clean_section_leaves_edit_mode() {
        let mut page = page();
        page.begin_edit_selected();
        page.cancel_active();
        assert_eq!(page.phase(), EditPhase::Idle);
    }

    #[test]
    fn test_escape_on_dirty_section_asks() {
        let mut page = page();
        page.begin_edit_selected();
        type_text(&page, "X");

        page.cancel_active();
        assert_eq!(page.phase(), EditPhase::ConfirmingDiscard);

        page.confirm_discard();
        assert_eq!(page.phase(), EditPhase::Idle);
        let dirty = page.with_section(&id("policy"), |s| s.is_dirty()).unwrap();
        assert!(!dirty);
    }

    #[test]
    fn test_tab_switch_with_dirty_edit_reverts_silently_after_confirmation() {
        let mut page = page();
        page.begin_edit_selected();
        type_text(&page, "X");

        page.next_tab();
        assert_eq!(page.active_tab(), 0);
        assert!(page.edit().confirmation_pending());

        page.confirm_discard();
        assert_eq!(page.active_tab(), 1);
        assert_eq!(page.phase(), EditPhase::Idle);
        assert!(!page.edit().force_skip_confirmation());
        let dirty = page.with_section(&id("policy"), |s| s.is_dirty()).unwrap();
        assert!(!dirty);

        // Old tab unmounted, new tab mounted
        assert!(!page.edit().has_cancel_callback(&id("policy")));
        assert!(page.edit().has_cancel_callback(&id("claimant")));
    }

    #[test]
    fn test_tab_switch_with_clean_edit() {
        let mut page = page();
        page.begin_edit_selected();
        page.prev_tab();
        assert_eq!(page.active_tab(), 1);
        assert_eq!(page.phase(), EditPhase::Idle);
    }

    #[test]
    fn test_quit_guard() {
        let mut page = page();
        page.begin_edit_selected();
        type_text(&page, "X");

        page.request_quit();
        assert!(!page.should_quit());
        page.cancel_discard();
        assert!(!page.should_quit());

        page.request_quit();
        page.confirm_discard();
        assert!(page.should_quit());
    }

    #[test]
    fn test_force_quit_skips_dialog() {
        let mut page = page();
        page.begin_edit_selected();
        type_text(&page, "X");

        page.force_quit();
        assert!(page.should_quit());
        assert!(!page.edit().confirmation_pending());
        assert!(!page.edit().force_skip_confirmation());
    }

    #[test]
    fn test_confirmation_disabled_by_config() {
        let mut page = ClaimPage::new(&Claim::demo().unwrap(), false);
        page.begin_edit_selected();
        type_text(&page, "X");

        page.request_edit(id("payment"));
        assert!(!page.edit().confirmation_pending());
        assert!(page.edit().is_active(&id("payment")));
        let dirty = page.with_section(&id("policy"), |s| s.is_dirty()).unwrap();
        assert!(!dirty);
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut page = page();
        page.select_prev();
        assert_eq!(page.selected_section(), Some(&id("policy")));
        for _ in 0..5 {
            page.select_next();
        }
        assert_eq!(page.selected_section(), Some(&id("payment")));
    }
}
