// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Terminal rendering and event loop for the back-office pages.
//!
//! Every page follows the same fetch/list/modal cycle: the collection is
//! fetched in the background, rendered as a table, and a centered overlay
//! hosts the detail view, the form view, or the delete confirmation. After
//! any mutation the collection is always re-fetched; nothing is patched
//! locally.

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use imobi_app::{
    FieldKind, FieldSpec, FormKind, FormState, LoadPhase, ModalMode, PageCommand, PageState,
    PersonKind, PersonRow, Record, RecordId, RefSource, Resource, TabKind, cpf_cnpj_label,
    field_visible,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// The collection currently shown on a page, in server order.
#[derive(Debug, Clone, PartialEq)]
pub enum PageSnapshot {
    Imoveis(Vec<Record>),
    Pessoas(Vec<PersonRow>),
    Contratos(Vec<Record>),
    Pagamentos(Vec<Record>),
    Manutencao(Vec<Record>),
}

impl PageSnapshot {
    pub const fn tab_kind(&self) -> TabKind {
        match self {
            Self::Imoveis(_) => TabKind::Imoveis,
            Self::Pessoas(_) => TabKind::Pessoas,
            Self::Contratos(_) => TabKind::Contratos,
            Self::Pagamentos(_) => TabKind::Pagamentos,
            Self::Manutencao(_) => TabKind::Manutencao,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::Imoveis(rows)
            | Self::Contratos(rows)
            | Self::Pagamentos(rows)
            | Self::Manutencao(rows) => rows.len(),
            Self::Pessoas(rows) => rows.len(),
        }
    }

    pub fn record_at(&self, index: usize) -> Option<&Record> {
        match self {
            Self::Imoveis(rows)
            | Self::Contratos(rows)
            | Self::Pagamentos(rows)
            | Self::Manutencao(rows) => rows.get(index),
            Self::Pessoas(rows) => rows.get(index).map(|person| &person.record),
        }
    }

    pub fn person_at(&self, index: usize) -> Option<&PersonRow> {
        match self {
            Self::Pessoas(rows) => rows.get(index),
            _ => None,
        }
    }

    /// The single backend collection behind this page, if there is one.
    /// Pessoas spans four collections and resolves per row instead.
    pub fn collection_resource(&self) -> Option<Resource> {
        match self {
            Self::Imoveis(_) => Some(Resource::Imoveis),
            Self::Pessoas(_) => None,
            Self::Contratos(_) => Some(Resource::Contratos),
            Self::Pagamentos(_) => Some(Resource::Pagamentos),
            Self::Manutencao(_) => Some(Resource::Manutencoes),
        }
    }
}

/// Reference collections fetched for a form's foreign-key selects, with
/// per-source outcomes: one failed source surfaces inline and leaves the
/// other fields editable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceData {
    pub collections: Vec<(RefSource, Result<Vec<Record>, String>)>,
}

impl ReferenceData {
    pub fn records(&self, source: RefSource) -> Option<&[Record]> {
        self.collections.iter().find_map(|(key, result)| {
            (*key == source)
                .then(|| result.as_deref().ok())
                .flatten()
        })
    }

    pub fn errors(&self) -> Vec<(RefSource, &str)> {
        self.collections
            .iter()
            .filter_map(|(source, result)| match result {
                Ok(_) => None,
                Err(message) => Some((*source, message.as_str())),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    PageLoaded {
        generation: u64,
        tab: TabKind,
        result: Result<PageSnapshot, String>,
    },
    ReferencesLoaded {
        generation: u64,
        kind: FormKind,
        data: ReferenceData,
    },
}

/// Everything the view needs from the outside world. The full-reload refresh
/// policy is part of this contract: mutations return `()` and the caller
/// re-fetches; implementations must never patch state locally.
pub trait PageRuntime {
    fn load_page(&mut self, tab: TabKind) -> Result<PageSnapshot>;
    fn load_references(&mut self, kind: FormKind) -> ReferenceData;
    fn submit_form(&mut self, form: &FormState) -> Result<()>;
    fn delete_record(&mut self, resource: Resource, id: RecordId) -> Result<()>;

    /// Load a page and report through the channel. Responses carry the
    /// generation they were requested under; the view drops stale ones, so
    /// a slow response can never clobber a newer page.
    fn spawn_page_load(
        &mut self,
        generation: u64,
        tab: TabKind,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self.load_page(tab).map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::PageLoaded {
            generation,
            tab,
            result,
        })
        .map_err(|_| anyhow::anyhow!("internal event channel closed"))?;
        Ok(())
    }

    fn spawn_reference_load(
        &mut self,
        generation: u64,
        kind: FormKind,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let data = self.load_references(kind);
        tx.send(InternalEvent::ReferencesLoaded {
            generation,
            kind,
            data,
        })
        .map_err(|_| anyhow::anyhow!("internal event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeleteTarget {
    resource: Resource,
    id: RecordId,
}

#[derive(Debug, Default)]
struct ViewData {
    snapshot: Option<PageSnapshot>,
    cursor: usize,
    form: Option<FormState>,
    references: ReferenceData,
    confirm_delete: Option<DeleteTarget>,
    help_visible: bool,
    status_token: u64,
    load_generation: u64,
    ref_generation: u64,
}

pub fn run_app<R: PageRuntime>(state: &mut PageState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    request_reload(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut PageState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        apply_internal_event(state, view_data, event);
    }
}

fn apply_internal_event(state: &mut PageState, view_data: &mut ViewData, event: InternalEvent) {
    match event {
        InternalEvent::ClearStatus { token } if token == view_data.status_token => {
            state.dispatch(PageCommand::ClearStatus);
        }
        InternalEvent::ClearStatus { .. } => {}
        InternalEvent::PageLoaded {
            generation,
            tab,
            result,
        } => {
            // Stale generations come from loads the user has navigated away
            // from; applying them would resurrect dead state.
            if generation != view_data.load_generation || tab != state.active_tab {
                return;
            }
            match result {
                Ok(snapshot) => {
                    view_data.cursor = view_data
                        .cursor
                        .min(snapshot.row_count().saturating_sub(1));
                    view_data.snapshot = Some(snapshot);
                    state.dispatch(PageCommand::FinishLoad);
                }
                Err(message) => {
                    view_data.snapshot = None;
                    state.dispatch(PageCommand::FailLoad(message));
                }
            }
        }
        InternalEvent::ReferencesLoaded {
            generation,
            kind,
            data,
        } => {
            if generation != view_data.ref_generation {
                return;
            }
            if view_data.form.as_ref().is_some_and(|form| form.kind == kind) {
                view_data.references = data;
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut PageState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(PageCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn request_reload<R: PageRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    state.dispatch(PageCommand::BeginLoad);
    view_data.cursor = 0;
    view_data.load_generation = view_data.load_generation.wrapping_add(1);
    if let Err(error) = runtime.spawn_page_load(
        view_data.load_generation,
        state.active_tab,
        internal_tx.clone(),
    ) {
        state.dispatch(PageCommand::FailLoad(format!("{error:#}")));
    }
}

fn handle_key_event<R: PageRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.confirm_delete.is_some() {
        handle_confirm_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    match state.modal {
        ModalMode::FormOpen => {
            handle_form_key(state, runtime, view_data, internal_tx, key);
            false
        }
        ModalMode::DetailsOpen => {
            handle_details_key(state, runtime, view_data, internal_tx, key);
            false
        }
        ModalMode::Closed => handle_nav_key(state, runtime, view_data, internal_tx, key),
    }
}

fn handle_nav_key<R: PageRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('f'), KeyModifiers::NONE) => {
            state.dispatch(PageCommand::NextTab);
            request_reload(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Char('b'), KeyModifiers::NONE) => {
            state.dispatch(PageCommand::PrevTab);
            request_reload(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            request_reload(state, runtime, view_data, internal_tx);
            emit_status(state, view_data, internal_tx, "recarregando");
        }
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
            move_cursor(view_data, 1);
        }
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
            move_cursor(view_data, -1);
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) => {
            view_data.cursor = 0;
        }
        (KeyCode::Char('G'), _) => {
            if let Some(snapshot) = &view_data.snapshot {
                view_data.cursor = snapshot.row_count().saturating_sub(1);
            }
        }
        (KeyCode::Enter, _) => {
            let has_row = view_data
                .snapshot
                .as_ref()
                .is_some_and(|snapshot| snapshot.row_count() > 0);
            if has_row {
                state.dispatch(PageCommand::OpenDetails(view_data.cursor));
            }
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            open_form(state, runtime, view_data, internal_tx, None);
        }
        (KeyCode::Char('?'), KeyModifiers::NONE) => {
            view_data.help_visible = true;
        }
        _ => {}
    }
    false
}

fn handle_details_key<R: PageRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            state.dispatch(PageCommand::CloseModal);
        }
        KeyCode::Char('e') => {
            let row = state.selected;
            open_form(state, runtime, view_data, internal_tx, row);
        }
        KeyCode::Char('d') => {
            if let Some(target) = selected_delete_target(state, view_data) {
                view_data.confirm_delete = Some(target);
            } else {
                emit_status(state, view_data, internal_tx, "registro sem id");
            }
        }
        _ => {}
    }
}

fn handle_confirm_key<R: PageRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            let Some(target) = view_data.confirm_delete.take() else {
                return;
            };
            match runtime.delete_record(target.resource, target.id) {
                Ok(()) => {
                    state.dispatch(PageCommand::CloseModal);
                    emit_status(state, view_data, internal_tx, "registro excluído");
                    request_reload(state, runtime, view_data, internal_tx);
                }
                Err(error) => {
                    // Modal stays open; recovery is user-initiated.
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("falha ao excluir: {error:#}"),
                    );
                }
            }
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            view_data.confirm_delete = None;
        }
        _ => {}
    }
}

fn handle_form_key<R: PageRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            view_data.form = None;
            view_data.references = ReferenceData::default();
            state.dispatch(PageCommand::CloseModal);
        }
        (KeyCode::Enter, _) | (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
            submit_active_form(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Tab, KeyModifiers::NONE) => {
            if let Some(form) = view_data.form.as_mut() {
                move_form_cursor(form, 1);
            }
        }
        (KeyCode::BackTab, _) => {
            if let Some(form) = view_data.form.as_mut() {
                move_form_cursor(form, -1);
            }
        }
        (KeyCode::Char('p'), KeyModifiers::CONTROL) => {
            if let Some(form) = view_data.form.as_mut()
                && form.kind == FormKind::Pessoa
                && !form.is_edit()
            {
                form.person_kind = next_person_kind(form.person_kind);
            }
        }
        (KeyCode::Left, _) => {
            cycle_choice(view_data, -1);
        }
        (KeyCode::Right, _) => {
            cycle_choice(view_data, 1);
        }
        (KeyCode::Backspace, _) => {
            if let Some(form) = view_data.form.as_mut()
                && let Some(spec) = focused_spec(form)
            {
                match spec.kind {
                    FieldKind::Select { .. } | FieldKind::Reference { .. } => {
                        form.set_value(spec.key, String::new());
                    }
                    _ => {
                        let mut value = form.value(spec.key).to_owned();
                        value.pop();
                        form.set_value(spec.key, value);
                    }
                }
            }
        }
        (KeyCode::Char(ch), modifiers)
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT =>
        {
            apply_form_char(view_data, ch);
        }
        _ => {}
    }
}

fn apply_form_char(view_data: &mut ViewData, ch: char) {
    let Some(form) = view_data.form.as_mut() else {
        return;
    };
    let Some(spec) = focused_spec(form) else {
        return;
    };
    match spec.kind {
        FieldKind::Select { .. } | FieldKind::Reference { .. } => {
            if let Some(index) = ch.to_digit(10).filter(|digit| *digit >= 1) {
                apply_choice(form, &view_data.references, (index - 1) as usize);
            }
        }
        _ => {
            let mut value = form.value(spec.key).to_owned();
            value.push(ch);
            form.set_value(spec.key, value);
        }
    }
}

fn submit_active_form<R: PageRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(form) = view_data.form.as_mut() else {
        return;
    };
    if form.in_flight {
        return;
    }
    if let Err(error) = form.validate() {
        form.error = Some(format!("{error:#}"));
        return;
    }
    form.in_flight = true;
    let result = runtime.submit_form(form);
    match result {
        Ok(()) => {
            view_data.form = None;
            view_data.references = ReferenceData::default();
            state.dispatch(PageCommand::CloseModal);
            emit_status(state, view_data, internal_tx, "registro salvo");
            request_reload(state, runtime, view_data, internal_tx);
        }
        Err(error) => {
            if let Some(form) = view_data.form.as_mut() {
                form.in_flight = false;
                form.error = Some(format!("Erro ao salvar: {error:#}"));
            }
        }
    }
}

fn open_form<R: PageRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    row: Option<usize>,
) {
    let kind = form_kind_for_tab(state.active_tab);
    let form = match row {
        None => FormState::create(kind),
        Some(index) => {
            let Some(snapshot) = &view_data.snapshot else {
                return;
            };
            if let Some(person) = snapshot.person_at(index) {
                FormState::edit_person(person)
            } else if let Some(record) = snapshot.record_at(index) {
                FormState::edit(kind, record)
            } else {
                return;
            }
        }
    };

    state.dispatch(PageCommand::OpenForm(row));
    view_data.references = ReferenceData::default();
    let sources = form.kind.reference_sources();
    let form_kind = form.kind;
    view_data.form = Some(form);

    if !sources.is_empty() {
        view_data.ref_generation = view_data.ref_generation.wrapping_add(1);
        if let Err(error) =
            runtime.spawn_reference_load(view_data.ref_generation, form_kind, internal_tx.clone())
        {
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("falha ao carregar opções: {error:#}"),
            );
        }
    }
}

fn selected_delete_target(state: &PageState, view_data: &ViewData) -> Option<DeleteTarget> {
    let row = state.selected?;
    let snapshot = view_data.snapshot.as_ref()?;
    if let Some(person) = snapshot.person_at(row) {
        return Some(DeleteTarget {
            resource: person.kind.resource(),
            id: person.record.id?,
        });
    }
    let resource = snapshot.collection_resource()?;
    let record = snapshot.record_at(row)?;
    Some(DeleteTarget {
        resource,
        id: record.id?,
    })
}

pub fn form_kind_for_tab(tab: TabKind) -> FormKind {
    match tab {
        TabKind::Imoveis => FormKind::Imovel,
        TabKind::Pessoas => FormKind::Pessoa,
        TabKind::Contratos => FormKind::Contrato,
        TabKind::Pagamentos => FormKind::Pagamento,
        TabKind::Manutencao => FormKind::Manutencao,
    }
}

fn next_person_kind(kind: PersonKind) -> PersonKind {
    let all = PersonKind::ALL;
    let index = all.iter().position(|entry| *entry == kind).unwrap_or(0);
    all[(index + 1) % all.len()]
}

fn move_cursor(view_data: &mut ViewData, delta: isize) {
    let Some(snapshot) = &view_data.snapshot else {
        return;
    };
    let rows = snapshot.row_count();
    if rows == 0 {
        view_data.cursor = 0;
        return;
    }
    let current = view_data.cursor.min(rows - 1) as isize;
    view_data.cursor = (current + delta).clamp(0, rows as isize - 1) as usize;
}

fn focused_spec(form: &FormState) -> Option<&'static FieldSpec> {
    let visible = form.visible_fields();
    if visible.is_empty() {
        return None;
    }
    let index = form.field_cursor.min(visible.len() - 1);
    Some(visible[index])
}

fn move_form_cursor(form: &mut FormState, delta: isize) {
    let count = form.visible_fields().len();
    if count == 0 {
        return;
    }
    let current = form.field_cursor.min(count - 1) as isize;
    form.field_cursor = (current + delta).rem_euclid(count as isize) as usize;
}

fn cycle_choice(view_data: &mut ViewData, delta: isize) {
    let Some(form) = view_data.form.as_mut() else {
        return;
    };
    let Some(spec) = focused_spec(form) else {
        return;
    };
    let options = choice_values(spec, &view_data.references);
    if options.is_empty() {
        return;
    }
    let current = options
        .iter()
        .position(|value| value.as_str() == form.value(spec.key));
    let next = match current {
        Some(index) => (index as isize + delta).rem_euclid(options.len() as isize) as usize,
        None if delta >= 0 => 0,
        None => options.len() - 1,
    };
    form.set_value(spec.key, options[next].clone());
}

fn apply_choice(form: &mut FormState, references: &ReferenceData, index: usize) {
    let Some(spec) = focused_spec(form) else {
        return;
    };
    let options = choice_values(spec, references);
    if let Some(value) = options.get(index) {
        form.set_value(spec.key, value.clone());
    }
}

/// The submittable values of a select-like field: the enumerated options, or
/// the ids of the fetched reference collection.
fn choice_values(spec: &FieldSpec, references: &ReferenceData) -> Vec<String> {
    match spec.kind {
        FieldKind::Select { options } => options.iter().map(|option| (*option).to_owned()).collect(),
        FieldKind::Reference { source } => references
            .records(source)
            .map(|records| {
                records
                    .iter()
                    .filter_map(|record| record.id.map(|id| id.to_string()))
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Rendering

fn render(frame: &mut ratatui::Frame<'_>, state: &PageState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tab_titles = TabKind::ALL
        .iter()
        .map(|tab| tab.label().to_owned())
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("imobi").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match &state.phase {
        LoadPhase::LoadError(message) => {
            // The error replaces the whole page body; nothing of the list
            // survives a failed fetch.
            let body = Paragraph::new(format!("Erro: {message}\n\nr recarrega"))
                .style(Style::default().fg(Color::Red))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(state.active_tab.title()),
                );
            frame.render_widget(body, layout[1]);
        }
        LoadPhase::Idle | LoadPhase::Loading => {
            let body = Paragraph::new("Carregando...").block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(state.active_tab.title()),
            );
            frame.render_widget(body, layout[1]);
        }
        LoadPhase::Loaded => {
            render_list(frame, layout[1], state, view_data);
        }
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if state.modal == ModalMode::DetailsOpen {
        let area = centered_rect(78, 72, frame.area());
        frame.render_widget(Clear, area);
        let details = Paragraph::new(render_details_text(state, view_data)).block(
            Block::default()
                .title(detail_title(state, view_data))
                .borders(Borders::ALL),
        );
        frame.render_widget(details, area);
    }

    if state.modal == ModalMode::FormOpen
        && let Some(form) = &view_data.form
    {
        let area = centered_rect(84, 80, frame.area());
        frame.render_widget(Clear, area);
        let body = Paragraph::new(render_form_text(form, &view_data.references)).block(
            Block::default()
                .title(form_title(form))
                .borders(Borders::ALL),
        );
        frame.render_widget(body, area);
    }

    if view_data.confirm_delete.is_some() {
        let area = centered_rect(52, 22, frame.area());
        frame.render_widget(Clear, area);
        let confirm = Paragraph::new(
            "Tem certeza que deseja excluir este registro?\nA ação não pode ser desfeita.\n\ny confirma | n cancela",
        )
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("excluir").borders(Borders::ALL));
        frame.render_widget(confirm, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 64, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("ajuda").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_list(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &PageState,
    view_data: &ViewData,
) {
    let Some(snapshot) = &view_data.snapshot else {
        let empty = Paragraph::new(String::new()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(state.active_tab.title()),
        );
        frame.render_widget(empty, area);
        return;
    };

    let columns = list_columns(state.active_tab);
    let widths = vec![Constraint::Min(10); columns.len()];
    let header = Row::new(columns.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = (0..snapshot.row_count()).map(|index| {
        let style = if index == view_data.cursor {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        Row::new(
            row_cells(snapshot, index)
                .into_iter()
                .map(|cell| Cell::from(cell).style(style)),
        )
    });

    let title = format!(
        "{} ({} registros)",
        state.active_tab.title(),
        snapshot.row_count()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

pub fn list_columns(tab: TabKind) -> &'static [&'static str] {
    match tab {
        TabKind::Imoveis => &["endereço", "tipo", "status", "aluguel"],
        TabKind::Pessoas => &["nome", "tipo", "email", "telefone"],
        TabKind::Contratos => &["id", "imóvel", "locatário", "status"],
        TabKind::Pagamentos => &["contrato", "data pag.", "valor pago", "status"],
        TabKind::Manutencao => &["imóvel", "data solicitação", "status", "custo"],
    }
}

pub fn row_cells(snapshot: &PageSnapshot, index: usize) -> Vec<String> {
    match snapshot {
        PageSnapshot::Imoveis(rows) => rows.get(index).map_or_else(Vec::new, |record| {
            vec![
                record.text("endereco"),
                record.text("tipo_imovel"),
                record.text("status_imovel"),
                format_brl(&record.text("valor_aluguel")),
            ]
        }),
        PageSnapshot::Pessoas(rows) => rows.get(index).map_or_else(Vec::new, |person| {
            vec![
                person.record.text("nome"),
                person.kind.label().to_owned(),
                person.record.text("email"),
                person.record.text("telefone"),
            ]
        }),
        PageSnapshot::Contratos(rows) => rows.get(index).map_or_else(Vec::new, |record| {
            vec![
                record.id.map(|id| id.to_string()).unwrap_or_default(),
                record.text("imovel"),
                record.text("locatario"),
                record.text("status_contrato"),
            ]
        }),
        PageSnapshot::Pagamentos(rows) => rows.get(index).map_or_else(Vec::new, |record| {
            vec![
                record.text("contrato"),
                record.text("data_pagamento"),
                format_brl(&record.text("valor_pago")),
                record.text("status_pagamento"),
            ]
        }),
        PageSnapshot::Manutencao(rows) => rows.get(index).map_or_else(Vec::new, |record| {
            vec![
                record.text("imovel"),
                record.text("data_solicitacao"),
                record.text("status_manutencao"),
                format_brl(&record.text("custo_manutencao")),
            ]
        }),
    }
}

fn detail_title(state: &PageState, view_data: &ViewData) -> String {
    let noun = entity_noun(state.active_tab);
    let row = state.selected.unwrap_or(0);
    if let Some(snapshot) = &view_data.snapshot {
        if let Some(person) = snapshot.person_at(row) {
            return format!("Detalhes de {}", person.kind.label());
        }
        if let Some(record) = snapshot.record_at(row)
            && let Some(id) = record.id
        {
            return format!("Detalhes do {noun} #{id}");
        }
    }
    format!("Detalhes do {noun}")
}

fn form_title(form: &FormState) -> String {
    if form.kind == FormKind::Pessoa {
        return match form.editing {
            Some(_) => format!("Editar {}", form.person_kind.label()),
            None => "Adicionar Nova Pessoa".to_owned(),
        };
    }
    let noun = match form.kind {
        FormKind::Imovel => "Imóvel",
        FormKind::Contrato => "Contrato",
        FormKind::Pagamento => "Pagamento",
        FormKind::Manutencao => "Manutenção",
        FormKind::Pessoa => unreachable!("handled above"),
    };
    match form.editing {
        Some(id) => format!("Editar {noun} #{id}"),
        None => format!("Adicionar Novo {noun}"),
    }
}

const fn entity_noun(tab: TabKind) -> &'static str {
    match tab {
        TabKind::Imoveis => "Imóvel",
        TabKind::Pessoas => "Pessoa",
        TabKind::Contratos => "Contrato",
        TabKind::Pagamentos => "Pagamento",
        TabKind::Manutencao => "Manutenção",
    }
}

fn render_details_text(state: &PageState, view_data: &ViewData) -> String {
    let Some(row) = state.selected else {
        return String::new();
    };
    let Some(snapshot) = &view_data.snapshot else {
        return String::new();
    };
    let Some(record) = snapshot.record_at(row) else {
        return String::new();
    };

    let mut lines: Vec<String> = detail_entries(state.active_tab, record)
        .into_iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect();
    lines.push(String::new());
    lines.push("e edita | d exclui | esc fecha".to_owned());
    lines.join("\n")
}

/// Every attribute as a label/value pair, with labels derived mechanically
/// from the keys and the certificate fields gated by the shared predicate.
pub fn detail_entries(tab: TabKind, record: &Record) -> Vec<(String, String)> {
    let form_kind = form_kind_for_tab(tab);
    let tipo = record.text("tipo_imovel");
    record
        .keys()
        .filter(|key| field_visible(form_kind, key, Some(&tipo)))
        .map(|key| {
            let value = record.text(key);
            let value = if value.is_empty() {
                "N/A".to_owned()
            } else {
                value
            };
            (field_label(key), value)
        })
        .collect()
}

fn render_form_text(form: &FormState, references: &ReferenceData) -> String {
    let mut lines = Vec::new();

    if form.kind == FormKind::Pessoa {
        let hint = if form.is_edit() {
            "(fixo)"
        } else {
            "(ctrl-p alterna)"
        };
        lines.push(format!("  Tipo de Pessoa: {} {hint}", form.person_kind.label()));
    }

    let visible = form.visible_fields();
    let focus = form.field_cursor.min(visible.len().saturating_sub(1));
    for (index, spec) in visible.iter().enumerate() {
        let marker = if index == focus { "> " } else { "  " };
        let label = form_field_label(form, spec);
        let value = form_field_display(form, spec, references);
        let required = if spec.required { " *" } else { "" };
        lines.push(format!("{marker}{label}{required}: {value}"));
    }

    for (source, error) in references.errors() {
        lines.push(String::new());
        lines.push(format!(
            "Não foi possível carregar a lista de {}: {error}",
            source.label()
        ));
    }

    if let Some(error) = &form.error {
        lines.push(String::new());
        lines.push(format!("Erro: {error}"));
    }

    lines.push(String::new());
    lines.push(
        "tab campo | digite para editar | 1-9/←/→ opção | enter salva | esc cancela".to_owned(),
    );
    lines.join("\n")
}

fn form_field_label(form: &FormState, spec: &FieldSpec) -> String {
    if form.kind == FormKind::Pessoa && spec.key == "cpf_cnpj" {
        return cpf_cnpj_label(form.value("tipo_pessoa")).to_owned();
    }
    spec.label.to_owned()
}

fn form_field_display(form: &FormState, spec: &FieldSpec, references: &ReferenceData) -> String {
    let value = form.value(spec.key);
    match spec.kind {
        FieldKind::Reference { source } => {
            if value.is_empty() {
                return format!("-- selecione ({}) --", source.label());
            }
            match references.records(source) {
                Some(records) => records
                    .iter()
                    .find(|record| {
                        record.id.map(|id| id.to_string()).as_deref() == Some(value)
                    })
                    .map(|record| source.option_label(record))
                    .unwrap_or_else(|| value.to_owned()),
                None => value.to_owned(),
            }
        }
        FieldKind::Select { .. } => format!("[{value}]"),
        _ => value.to_owned(),
    }
}

fn status_text(state: &PageState, view_data: &ViewData) -> String {
    if let Some(line) = &state.status_line {
        return line.clone();
    }
    if view_data.confirm_delete.is_some() {
        return "y confirma | n cancela".to_owned();
    }
    match state.modal {
        ModalMode::FormOpen => {
            "tab campo | 1-9/←/→ opção | enter salva | esc cancela".to_owned()
        }
        ModalMode::DetailsOpen => "e edita | d exclui | esc fecha".to_owned(),
        ModalMode::Closed => {
            "j/k linha | enter detalhes | a novo | r recarrega | f/b aba | q sai | ? ajuda"
                .to_owned()
        }
    }
}

fn help_overlay_text() -> String {
    [
        "navegação",
        "  f/b           próxima/anterior aba",
        "  j/k g/G       mover seleção",
        "  enter         detalhes do registro",
        "  a             novo registro",
        "  r             recarregar a lista",
        "  q / ctrl-q    sair",
        "",
        "detalhes",
        "  e             editar",
        "  d             excluir (pede confirmação)",
        "  esc           fechar",
        "",
        "formulário",
        "  tab/shift-tab campo seguinte/anterior",
        "  1-9 ←/→       escolher opção",
        "  ctrl-p        alternar tipo de pessoa (criação)",
        "  enter/ctrl-s  salvar",
        "  esc           cancelar",
    ]
    .join("\n")
}

/// Mechanical label derivation: underscores to spaces, first letter
/// upper-cased.
pub fn field_label(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// Renders a backend decimal string as pt-BR currency: `"1500.00"` becomes
/// `R$ 1.500,00`. Values that are not plain decimals render verbatim.
pub fn format_brl(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let (sign, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (unsigned, ""),
    };
    if integer.is_empty()
        || !integer.bytes().all(|byte| byte.is_ascii_digit())
        || !fraction.bytes().all(|byte| byte.is_ascii_digit())
    {
        return raw.to_owned();
    }

    let digits: Vec<u8> = integer.bytes().collect();
    let mut grouped = String::new();
    for (index, digit) in digits.iter().enumerate() {
        let remaining = digits.len() - index;
        if index > 0 && remaining % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit as char);
    }

    let cents: String = fraction.chars().chain(['0', '0']).take(2).collect();
    format!("R$ {sign}{grouped},{cents}")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
