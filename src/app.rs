use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info};

use crate::list::ListState;
use crate::protocol::{Command, Msg};
use crate::store::{ClientHandle, Identity, StoreError};
use crate::viewport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Containers,
    Items,
}

impl View {
    pub fn placeholder(self) -> &'static str {
        match self {
            View::Containers => "Filter buckets...",
            View::Items => "Filter objects...",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    /// Session cannot continue; only quitting is possible.
    Fatal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

/// Navigation state for the bucket/object browser.
///
/// The event loop only reads these fields; changes go through [`App::update`].
/// `selected_container` is `Some` exactly while `view == View::Items`.
pub struct App {
    pub view: View,
    pub containers: ListState,
    pub items: ListState,
    pub selected_container: Option<String>,
    pub filter_text: String,
    pub status: Option<Status>,
    pub output_dir: PathBuf,
    pub height: u16,
    /// Key of the download in flight.
    pub pending_download: Option<String>,
    pub quit: bool,
    client: Option<ClientHandle>,
}

impl App {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            view: View::Containers,
            containers: ListState::new(),
            items: ListState::new(),
            selected_container: None,
            filter_text: String::new(),
            status: None,
            client: None,
            output_dir,
            height: 24,
            pending_download: None,
            quit: false,
        }
    }

    /// First command of a session.
    pub fn start(&mut self) -> Command {
        self.containers.set_loading(true);
        Command::InitClient
    }

    pub fn active_list(&self) -> &ListState {
        match self.view {
            View::Containers => &self.containers,
            View::Items => &self.items,
        }
    }

    fn active_list_mut(&mut self) -> &mut ListState {
        match self.view {
            View::Containers => &mut self.containers,
            View::Items => &mut self.items,
        }
    }

    pub fn placeholder(&self) -> &'static str {
        self.view.placeholder()
    }

    pub fn fatal_error(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|status| status.kind == StatusKind::Fatal)
            .map(|status| status.text.as_str())
    }

    pub fn client(&self) -> Option<ClientHandle> {
        self.client.clone()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.client.as_ref().map(|client| client.identity())
    }

    /// Applies one message and returns the background command it triggers, if any.
    pub fn update(&mut self, msg: Msg) -> Option<Command> {
        let command = match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Resize(height) => {
                self.height = height;
                None
            }
            Msg::ClientReady(client) => self.on_client_ready(client),
            Msg::Containers(names) => {
                debug!(count = names.len(), "containers fetched");
                self.containers.replace(names);
                None
            }
            Msg::Items { container, items } => {
                self.on_items(container, items);
                None
            }
            Msg::Downloaded {
                container,
                key,
                path,
            } => {
                self.pending_download = None;
                self.status = Some(Status {
                    kind: StatusKind::Success,
                    text: format!("Downloaded {container}/{key} to {}", path.display()),
                });
                None
            }
            Msg::Failed(err) => {
                self.on_failure(err);
                None
            }
        };
        self.sync_viewport();
        command
    }

    fn on_client_ready(&mut self, client: ClientHandle) -> Option<Command> {
        if self.client.is_some() {
            debug!("ignoring second client");
            return None;
        }
        info!(identity = ?client.identity(), "client ready");
        self.client = Some(client);
        self.containers.set_loading(true);
        Some(Command::list_containers())
    }

    fn on_items(&mut self, container: String, items: Vec<String>) {
        let current = self.selected_container.as_deref();
        if self.view != View::Items || current != Some(container.as_str()) {
            debug!(%container, "discarding objects for a bucket no longer shown");
            return;
        }
        debug!(%container, count = items.len(), "objects fetched");
        self.items.replace(items);
    }

    fn on_failure(&mut self, err: StoreError) {
        match &err {
            StoreError::ListItems { container, .. } => {
                let current = self.selected_container.as_deref();
                if self.view != View::Items || current != Some(container.as_str()) {
                    debug!(%container, %err, "discarding failure for a bucket no longer shown");
                    return;
                }
                self.items.set_loading(false);
            }
            StoreError::AlreadyExists { .. }
            | StoreError::CreateDir { .. }
            | StoreError::InvalidKey { .. }
            | StoreError::Transfer { .. } => self.pending_download = None,
            StoreError::Init(_)
            | StoreError::Credentials(_)
            | StoreError::NotConnected
            | StoreError::ListContainers(_) => self.containers.set_loading(false),
        }
        let kind = if err.is_fatal() {
            StatusKind::Fatal
        } else {
            StatusKind::Error
        };
        self.status = Some(Status {
            kind,
            text: format!("Error: {err}"),
        });
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.quit = true;
            return None;
        }
        if self.status.is_some() {
            self.handle_status_key(key);
            return None;
        }

        match key.code {
            KeyCode::Esc => self.back(),
            KeyCode::Enter => self.confirm(),
            KeyCode::Up => {
                self.active_list_mut().move_up();
                None
            }
            KeyCode::Down => {
                self.active_list_mut().move_down();
                None
            }
            KeyCode::PageUp => {
                let page = self.page_size();
                self.active_list_mut().move_by(-page);
                None
            }
            KeyCode::PageDown => {
                let page = self.page_size();
                self.active_list_mut().move_by(page);
                None
            }
            KeyCode::Home => {
                self.active_list_mut().jump_first();
                None
            }
            KeyCode::End => {
                self.active_list_mut().jump_last();
                None
            }
            KeyCode::Char('r') if ctrl => self.refresh(),
            KeyCode::Char('u') if ctrl => {
                self.edit_filter(String::clear);
                None
            }
            KeyCode::Backspace => {
                self.edit_filter(|text| {
                    text.pop();
                });
                None
            }
            KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.edit_filter(|text| text.push(ch));
                None
            }
            _ => None,
        }
    }

    fn handle_status_key(&mut self, key: KeyEvent) {
        let fatal = self
            .status
            .as_ref()
            .is_some_and(|status| status.kind == StatusKind::Fatal);
        match key.code {
            KeyCode::Char('q') if fatal => self.quit = true,
            KeyCode::Esc | KeyCode::Enter if !fatal => self.status = None,
            _ => {}
        }
    }

    fn back(&mut self) -> Option<Command> {
        if self.view != View::Items {
            if !self.filter_text.is_empty() {
                self.edit_filter(String::clear);
            }
            return None;
        }
        let left = self.selected_container.take();
        self.view = View::Containers;
        self.filter_text.clear();
        self.items.clear();
        self.containers.set_query("");
        if let Some(name) = left {
            self.containers.select(&name);
        }
        debug!("back to buckets");
        None
    }

    fn confirm(&mut self) -> Option<Command> {
        match self.view {
            View::Containers => {
                let container = self.containers.selected()?.to_string();
                debug!(%container, "opening bucket");
                self.view = View::Items;
                self.selected_container = Some(container.clone());
                self.filter_text.clear();
                self.items.clear();
                self.items.set_loading(true);
                Some(Command::list_items(container))
            }
            View::Items => {
                if self.pending_download.is_some() {
                    return None;
                }
                let key = self.items.selected()?.to_string();
                let container = self.selected_container.clone()?;
                debug!(%container, %key, "download requested");
                self.pending_download = Some(key.clone());
                Some(Command::download(container, key, self.output_dir.clone()))
            }
        }
    }

    fn refresh(&mut self) -> Option<Command> {
        self.client.as_ref()?;
        match self.view {
            View::Containers => {
                self.containers.set_loading(true);
                Some(Command::list_containers())
            }
            View::Items => {
                let container = self.selected_container.clone()?;
                self.items.set_loading(true);
                Some(Command::list_items(container))
            }
        }
    }

    /// Edits the input buffer first, then re-filters the active list from it.
    fn edit_filter(&mut self, edit: impl FnOnce(&mut String)) {
        edit(&mut self.filter_text);
        let list = match self.view {
            View::Containers => &mut self.containers,
            View::Items => &mut self.items,
        };
        list.set_query(&self.filter_text);
    }

    fn page_size(&self) -> isize {
        isize::try_from(viewport::list_capacity(self.height)).unwrap_or(isize::MAX)
    }

    fn sync_viewport(&mut self) {
        let capacity = viewport::list_capacity(self.height);
        self.containers.scroll_to_cursor(capacity);
        self.items.scroll_to_cursor(capacity);
    }
}
