// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::TabKind;

/// List-loading lifecycle of the active page.
///
/// `LoadError` is terminal until the next manual reload re-enters `Loading`;
/// while it holds, the error text replaces the whole page body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
    LoadError(String),
}

/// Which overlay is presented over the page. At most one child view at a
/// time; transitions are user-driven and independent of the load phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalMode {
    Closed,
    DetailsOpen,
    FormOpen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub active_tab: TabKind,
    pub phase: LoadPhase,
    pub modal: ModalMode,
    /// Row index into the current snapshot; cleared whenever the modal
    /// closes or the collection is re-fetched.
    pub selected: Option<usize>,
    pub status_line: Option<String>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            active_tab: TabKind::Imoveis,
            phase: LoadPhase::Idle,
            modal: ModalMode::Closed,
            selected: None,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCommand {
    NextTab,
    PrevTab,
    SetActiveTab(TabKind),
    BeginLoad,
    FinishLoad,
    FailLoad(String),
    OpenDetails(usize),
    /// `None` opens a create form; `Some(row)` an edit form for that row.
    OpenForm(Option<usize>),
    CloseModal,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    TabChanged(TabKind),
    PhaseChanged(LoadPhase),
    ModalChanged(ModalMode),
    SelectionChanged(Option<usize>),
    StatusUpdated(String),
    StatusCleared,
}

impl PageState {
    pub fn dispatch(&mut self, command: PageCommand) -> Vec<PageEvent> {
        match command {
            PageCommand::NextTab => self.rotate_tab(1),
            PageCommand::PrevTab => self.rotate_tab(-1),
            PageCommand::SetActiveTab(tab) => self.switch_tab(tab),
            PageCommand::BeginLoad => {
                self.phase = LoadPhase::Loading;
                self.selected = None;
                vec![
                    PageEvent::PhaseChanged(self.phase.clone()),
                    PageEvent::SelectionChanged(None),
                ]
            }
            PageCommand::FinishLoad => {
                self.phase = LoadPhase::Loaded;
                vec![PageEvent::PhaseChanged(self.phase.clone())]
            }
            PageCommand::FailLoad(message) => {
                self.phase = LoadPhase::LoadError(message);
                vec![PageEvent::PhaseChanged(self.phase.clone())]
            }
            PageCommand::OpenDetails(row) => {
                self.selected = Some(row);
                self.modal = ModalMode::DetailsOpen;
                vec![
                    PageEvent::SelectionChanged(self.selected),
                    PageEvent::ModalChanged(self.modal),
                ]
            }
            PageCommand::OpenForm(row) => {
                self.selected = row;
                self.modal = ModalMode::FormOpen;
                vec![
                    PageEvent::SelectionChanged(self.selected),
                    PageEvent::ModalChanged(self.modal),
                ]
            }
            PageCommand::CloseModal => {
                self.selected = None;
                self.modal = ModalMode::Closed;
                vec![
                    PageEvent::SelectionChanged(None),
                    PageEvent::ModalChanged(self.modal),
                ]
            }
            PageCommand::SetStatus(message) => {
                vec![self.set_status(&message)]
            }
            PageCommand::ClearStatus => {
                self.status_line = None;
                vec![PageEvent::StatusCleared]
            }
        }
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<PageEvent> {
        let tabs = TabKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.switch_tab(tabs[next])
    }

    fn switch_tab(&mut self, tab: TabKind) -> Vec<PageEvent> {
        self.active_tab = tab;
        self.modal = ModalMode::Closed;
        self.selected = None;
        self.phase = LoadPhase::Idle;
        vec![
            PageEvent::TabChanged(self.active_tab),
            PageEvent::ModalChanged(self.modal),
            PageEvent::SelectionChanged(None),
            PageEvent::PhaseChanged(self.phase.clone()),
        ]
    }

    fn set_status(&mut self, message: &str) -> PageEvent {
        self.status_line = Some(message.to_owned());
        PageEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadPhase, ModalMode, PageCommand, PageEvent, PageState};
    use crate::TabKind;

    #[test]
    fn tab_rotation_wraps() {
        let mut state = PageState {
            active_tab: TabKind::Manutencao,
            ..PageState::default()
        };

        state.dispatch(PageCommand::NextTab);
        assert_eq!(state.active_tab, TabKind::Imoveis);

        state.dispatch(PageCommand::PrevTab);
        assert_eq!(state.active_tab, TabKind::Manutencao);
    }

    #[test]
    fn switching_tabs_resets_page_state() {
        let mut state = PageState::default();
        state.dispatch(PageCommand::BeginLoad);
        state.dispatch(PageCommand::FinishLoad);
        state.dispatch(PageCommand::OpenDetails(3));

        state.dispatch(PageCommand::SetActiveTab(TabKind::Contratos));
        assert_eq!(state.active_tab, TabKind::Contratos);
        assert_eq!(state.phase, LoadPhase::Idle);
        assert_eq!(state.modal, ModalMode::Closed);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn load_phase_follows_fetch_lifecycle() {
        let mut state = PageState::default();
        assert_eq!(state.phase, LoadPhase::Idle);

        state.dispatch(PageCommand::BeginLoad);
        assert_eq!(state.phase, LoadPhase::Loading);

        state.dispatch(PageCommand::FinishLoad);
        assert_eq!(state.phase, LoadPhase::Loaded);

        state.dispatch(PageCommand::BeginLoad);
        state.dispatch(PageCommand::FailLoad("falha ao buscar dados".to_owned()));
        assert_eq!(
            state.phase,
            LoadPhase::LoadError("falha ao buscar dados".to_owned())
        );

        // LoadError is terminal until an explicit reload.
        state.dispatch(PageCommand::BeginLoad);
        assert_eq!(state.phase, LoadPhase::Loading);
    }

    #[test]
    fn modal_transitions_are_independent_of_load_phase() {
        let mut state = PageState::default();
        state.dispatch(PageCommand::BeginLoad);
        state.dispatch(PageCommand::FailLoad("offline".to_owned()));

        let events = state.dispatch(PageCommand::OpenForm(None));
        assert_eq!(state.modal, ModalMode::FormOpen);
        assert_eq!(state.selected, None);
        assert!(events.contains(&PageEvent::ModalChanged(ModalMode::FormOpen)));
        assert!(matches!(state.phase, LoadPhase::LoadError(_)));
    }

    #[test]
    fn opening_details_selects_the_row() {
        let mut state = PageState::default();
        let events = state.dispatch(PageCommand::OpenDetails(2));
        assert_eq!(state.modal, ModalMode::DetailsOpen);
        assert_eq!(state.selected, Some(2));
        assert_eq!(
            events,
            vec![
                PageEvent::SelectionChanged(Some(2)),
                PageEvent::ModalChanged(ModalMode::DetailsOpen),
            ],
        );
    }

    #[test]
    fn closing_the_modal_clears_selection_and_mode() {
        let mut state = PageState::default();
        state.dispatch(PageCommand::OpenDetails(0));

        let events = state.dispatch(PageCommand::CloseModal);
        assert_eq!(state.modal, ModalMode::Closed);
        assert_eq!(state.selected, None);
        assert_eq!(
            events,
            vec![
                PageEvent::SelectionChanged(None),
                PageEvent::ModalChanged(ModalMode::Closed),
            ],
        );
    }

    #[test]
    fn reload_clears_selection() {
        let mut state = PageState::default();
        state.dispatch(PageCommand::OpenDetails(5));
        state.dispatch(PageCommand::CloseModal);
        state.dispatch(PageCommand::BeginLoad);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn status_line_set_and_clear() {
        let mut state = PageState::default();
        let set = state.dispatch(PageCommand::SetStatus("registro salvo".to_owned()));
        assert_eq!(set, vec![PageEvent::StatusUpdated("registro salvo".to_owned())]);
        assert_eq!(state.status_line.as_deref(), Some("registro salvo"));

        let cleared = state.dispatch(PageCommand::ClearStatus);
        assert_eq!(cleared, vec![PageEvent::StatusCleared]);
        assert_eq!(state.status_line, None);
    }
}
