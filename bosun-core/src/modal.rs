use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use regex::Regex;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::Settings;
use crate::message::Message;
use crate::outcome::CreateParams;
use crate::session::{OperationKind, SessionDetails, SessionState, SessionSummary};

static SESSION_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("valid regex"));
static MEMORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[bkmg]$").expect("valid regex"));
static CPUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("valid regex"));

/// One selectable action at the bottom of a modal. Pure data: the
/// renderer draws the label, the update loop emits the message.
#[derive(Clone, Debug, PartialEq)]
pub struct ModalAction {
    pub label: String,
    pub key: KeyCode,
    pub ctrl: bool,
    /// Highlighted as the default choice.
    pub primary: bool,
    /// `None` just closes the modal.
    pub message: Option<Message>,
}

impl ModalAction {
    pub fn new(label: &str, key: KeyCode, message: Message) -> Self {
        Self {
            label: label.to_string(),
            key,
            ctrl: false,
            primary: false,
            message: Some(message),
        }
    }

    pub fn primary(label: &str, key: KeyCode, message: Message) -> Self {
        Self {
            primary: true,
            ..Self::new(label, key, message)
        }
    }

    pub fn close(label: &str, key: KeyCode) -> Self {
        Self {
            label: label.to_string(),
            key,
            ctrl: false,
            primary: false,
            message: None,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    fn matches(&self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if self.ctrl != ctrl {
            return false;
        }
        match (self.key, key.code) {
            (KeyCode::Char(want), KeyCode::Char(got)) => {
                want.eq_ignore_ascii_case(&got)
            }
            (want, got) => want == got,
        }
    }
}

/// Distinguishes placeholder modals whose content arrives later, so a
/// completion can tell whether its modal is still the one on screen.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ModalTag {
    Plain,
    PrereqPending,
    DetailsPending { name: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModalKind {
    Info,
    Confirm,
    Form(Form),
    Menu { name: String, selected: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Modal {
    pub title: String,
    pub body: String,
    pub kind: ModalKind,
    pub width: u16,
    /// Wizard steps set this so Esc cannot dismiss them.
    pub disable_esc: bool,
    pub scroll: u16,
    pub tag: ModalTag,
    pub actions: Vec<ModalAction>,
}

/// What a key press inside a modal asks the update loop to do.
#[derive(Clone, Debug, PartialEq)]
pub enum ModalResponse {
    Consumed,
    Close,
    Emit(Message),
    /// A form asked to be submitted; interpretation depends on its kind.
    Submit,
}

impl Modal {
    pub fn info(title: &str, body: &str) -> Self {
        Self::with_kind(title, body, ModalKind::Info)
    }

    pub fn confirm(title: &str, body: &str) -> Self {
        Self::with_kind(title, body, ModalKind::Confirm)
    }

    pub fn form(title: &str, form: Form) -> Self {
        Self::with_kind(title, "", ModalKind::Form(form))
    }

    pub fn menu(title: &str, name: &str) -> Self {
        Self::with_kind(
            title,
            "",
            ModalKind::Menu {
                name: name.to_string(),
                selected: 0,
            },
        )
    }

    fn with_kind(title: &str, body: &str, kind: ModalKind) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            kind,
            width: 60,
            disable_esc: false,
            scroll: 0,
            tag: ModalTag::Plain,
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn disable_esc(mut self) -> Self {
        self.disable_esc = true;
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: ModalTag) -> Self {
        self.tag = tag;
        self
    }

    #[must_use]
    pub fn action(mut self, action: ModalAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn form_state(&self) -> Option<&Form> {
        match &self.kind {
            ModalKind::Form(form) => Some(form),
            _ => None,
        }
    }

    pub fn is_form(&self) -> bool {
        matches!(self.kind, ModalKind::Form(_))
    }

    /// Routes a key press. Forms get editing keys, menus get
    /// navigation, everything gets its action hotkeys.
    pub fn handle_key(&mut self, key: KeyEvent) -> ModalResponse {
        if key.code == KeyCode::Esc && !self.disable_esc {
            return ModalResponse::Close;
        }

        match &mut self.kind {
            ModalKind::Form(form) => Self::handle_form_key(form, &self.actions, key),
            ModalKind::Menu { selected, .. } => {
                Self::handle_menu_key(selected, &self.actions, key)
            }
            ModalKind::Info | ModalKind::Confirm => {
                match key.code {
                    KeyCode::Up => {
                        self.scroll = self.scroll.saturating_sub(1);
                        return ModalResponse::Consumed;
                    }
                    KeyCode::Down => {
                        self.scroll = self.scroll.saturating_add(1);
                        return ModalResponse::Consumed;
                    }
                    KeyCode::PageUp => {
                        self.scroll = self.scroll.saturating_sub(10);
                        return ModalResponse::Consumed;
                    }
                    KeyCode::PageDown => {
                        self.scroll = self.scroll.saturating_add(10);
                        return ModalResponse::Consumed;
                    }
                    _ => {}
                }
                Self::action_response(&self.actions, key)
            }
        }
    }

    fn action_response(actions: &[ModalAction], key: KeyEvent) -> ModalResponse {
        for action in actions {
            if action.matches(key) {
                return match &action.message {
                    Some(message) => ModalResponse::Emit(message.clone()),
                    None => ModalResponse::Close,
                };
            }
        }
        ModalResponse::Consumed
    }

    fn handle_menu_key(
        selected: &mut usize,
        actions: &[ModalAction],
        key: KeyEvent,
    ) -> ModalResponse {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                *selected = selected.saturating_sub(1);
                ModalResponse::Consumed
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if *selected + 1 < actions.len() {
                    *selected += 1;
                }
                ModalResponse::Consumed
            }
            KeyCode::Enter => match actions.get(*selected).and_then(|a| a.message.clone()) {
                Some(message) => ModalResponse::Emit(message),
                None => ModalResponse::Close,
            },
            _ => Self::action_response(actions, key),
        }
    }

    fn handle_form_key(
        form: &mut Form,
        actions: &[ModalAction],
        key: KeyEvent,
    ) -> ModalResponse {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('s') {
            return ModalResponse::Submit;
        }
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                form.focus_next();
                return ModalResponse::Consumed;
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.focus_prev();
                return ModalResponse::Consumed;
            }
            _ => {}
        }

        match &mut form.fields[form.focus].kind {
            FieldKind::Checkbox(value) => match key.code {
                KeyCode::Char(' ') => {
                    *value = !*value;
                    ModalResponse::Consumed
                }
                KeyCode::Enter => ModalResponse::Submit,
                _ => Self::action_response(actions, key),
            },
            FieldKind::Text(input) => match key.code {
                KeyCode::Enter if input.multiline => {
                    input.insert_char('\n');
                    ModalResponse::Consumed
                }
                KeyCode::Enter => ModalResponse::Submit,
                KeyCode::Char(c) if !ctrl => {
                    input.insert_char(c);
                    ModalResponse::Consumed
                }
                KeyCode::Backspace => {
                    input.backspace();
                    ModalResponse::Consumed
                }
                KeyCode::Delete => {
                    input.delete_forward();
                    ModalResponse::Consumed
                }
                KeyCode::Left => {
                    input.cursor_left();
                    ModalResponse::Consumed
                }
                KeyCode::Right => {
                    input.cursor_right();
                    ModalResponse::Consumed
                }
                KeyCode::Home => {
                    input.cursor_line_start();
                    ModalResponse::Consumed
                }
                KeyCode::End => {
                    input.cursor_line_end();
                    ModalResponse::Consumed
                }
                _ => Self::action_response(actions, key),
            },
        }
    }
}

/// Which submit handler a form routes to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormKind {
    Create,
    Settings,
    Firewall,
    WizardFirewall,
    WizardDefaults,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<Field>,
    pub focus: usize,
    /// Validation failure shown under the fields until the next edit.
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub label: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn text(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: FieldKind::Text(TextInput::new(value, false)),
        }
    }

    pub fn multiline(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: FieldKind::Text(TextInput::new(value, true)),
        }
    }

    pub fn checkbox(label: &str, value: bool) -> Self {
        Self {
            label: label.to_string(),
            kind: FieldKind::Checkbox(value),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    Text(TextInput),
    Checkbox(bool),
}

impl Form {
    pub fn new(kind: FormKind, fields: Vec<Field>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            error: None,
        }
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
        self.error = None;
    }

    fn focus_prev(&mut self) {
        self.focus = self
            .focus
            .checked_sub(1)
            .unwrap_or(self.fields.len() - 1);
        self.error = None;
    }

    fn text_value(&self, idx: usize) -> &str {
        match &self.fields[idx].kind {
            FieldKind::Text(input) => input.value.trim(),
            FieldKind::Checkbox(_) => "",
        }
    }

    fn checkbox_value(&self, idx: usize) -> bool {
        match &self.fields[idx].kind {
            FieldKind::Checkbox(value) => *value,
            FieldKind::Text(_) => false,
        }
    }

    /// Create form: name, branch, no-connect checkbox.
    pub fn create_params(&self) -> Result<CreateParams, String> {
        let name = self.text_value(0);
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        if !SESSION_NAME_RE.is_match(name) {
            return Err(
                "Name must be lowercase letters, digits and dashes".to_string(),
            );
        }
        let branch = self.text_value(1);
        Ok(CreateParams {
            name: name.to_string(),
            branch: (!branch.is_empty()).then(|| branch.to_string()),
            no_connect: self.checkbox_value(2),
        })
    }

    /// Settings form: memory, cpus, then the three toggles.
    pub fn settings_values(&self, base: &Settings) -> Result<Settings, String> {
        let mut settings = base.clone();
        settings.session.memory = validate_memory(self.text_value(0))?;
        settings.session.cpus = validate_cpus(self.text_value(1))?;
        settings.ui.show_tips = self.checkbox_value(2);
        settings.daemon.notifications = self.checkbox_value(3);
        settings.daemon.token_refresh = self.checkbox_value(4);
        Ok(settings)
    }

    /// Defaults wizard step: memory and cpus only.
    pub fn defaults_values(&self) -> Result<(String, String), String> {
        Ok((
            validate_memory(self.text_value(0))?,
            validate_cpus(self.text_value(1))?,
        ))
    }

    /// Firewall forms keep one domain per line; blanks are dropped.
    pub fn domain_lines(&self) -> Vec<String> {
        match &self.fields[0].kind {
            FieldKind::Text(input) => input
                .value
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
            FieldKind::Checkbox(_) => Vec::new(),
        }
    }
}

pub fn validate_memory(raw: &str) -> Result<String, String> {
    let raw = raw.trim().to_lowercase();
    if MEMORY_RE.is_match(&raw) {
        Ok(raw)
    } else {
        Err("Memory must look like 512m or 4g".to_string())
    }
}

pub fn validate_cpus(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    if CPUS_RE.is_match(raw) {
        Ok(raw.to_string())
    } else {
        Err("CPUs must be a number, e.g. 2 or 1.5".to_string())
    }
}

/// Single- or multi-line text input with grapheme-aware cursor motion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextInput {
    pub value: String,
    /// Byte offset into `value`, always on a grapheme boundary.
    pub cursor: usize,
    pub multiline: bool,
}

impl TextInput {
    pub fn new(value: &str, multiline: bool) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.len(),
            multiline,
        }
    }

    fn grapheme_boundaries(&self) -> Vec<usize> {
        let mut boundaries: Vec<usize> =
            self.value.grapheme_indices(true).map(|(i, _)| i).collect();
        boundaries.push(self.value.len());
        boundaries
    }

    fn boundary_index_at_or_before(boundaries: &[usize], cursor: usize) -> usize {
        match boundaries.binary_search(&cursor) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }

    fn clamp_cursor_to_boundary(&mut self, boundaries: &[usize]) -> usize {
        let cursor = self.cursor.min(self.value.len());
        let idx = Self::boundary_index_at_or_before(boundaries, cursor);
        self.cursor = boundaries.get(idx).copied().unwrap_or(0);
        idx
    }

    pub fn insert_char(&mut self, c: char) {
        let boundaries = self.grapheme_boundaries();
        self.clamp_cursor_to_boundary(&boundaries);
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Removes the grapheme cluster before the cursor.
    pub fn backspace(&mut self) -> bool {
        let boundaries = self.grapheme_boundaries();
        let idx = self.clamp_cursor_to_boundary(&boundaries);
        if idx == 0 {
            return false;
        }
        let prev = boundaries[idx - 1];
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
        true
    }

    /// Removes the grapheme cluster at the cursor.
    pub fn delete_forward(&mut self) -> bool {
        let boundaries = self.grapheme_boundaries();
        let idx = self.clamp_cursor_to_boundary(&boundaries);
        if idx + 1 >= boundaries.len() {
            return false;
        }
        let end = boundaries[idx + 1];
        self.value.drain(self.cursor..end);
        true
    }

    pub fn cursor_left(&mut self) {
        let boundaries = self.grapheme_boundaries();
        let idx = self.clamp_cursor_to_boundary(&boundaries);
        if idx > 0 {
            self.cursor = boundaries[idx - 1];
        }
    }

    pub fn cursor_right(&mut self) {
        let boundaries = self.grapheme_boundaries();
        let idx = self.clamp_cursor_to_boundary(&boundaries);
        if idx + 1 < boundaries.len() {
            self.cursor = boundaries[idx + 1];
        }
    }

    pub fn cursor_line_start(&mut self) {
        self.cursor = self.value[..self.cursor]
            .rfind('\n')
            .map_or(0, |idx| idx + 1);
    }

    pub fn cursor_line_end(&mut self) {
        self.cursor = self.value[self.cursor..]
            .find('\n')
            .map_or(self.value.len(), |idx| self.cursor + idx);
    }
}

// Modal constructors for the dashboard. The wizard builds its own in
// the wizard module.

pub fn details_pending_modal(name: &str) -> Modal {
    Modal::info(name, "Loading session details...")
        .width(70)
        .tag(ModalTag::DetailsPending {
            name: name.to_string(),
        })
        .action(ModalAction::close("Close", KeyCode::Enter))
}

pub fn details_modal(details: &SessionDetails) -> Modal {
    let mut body = format!(
        "State:    {}\nImage:    {}\nCreated:  {}",
        details.state.label(),
        details.image,
        details.created,
    );
    if let Some(branch) = &details.branch {
        body.push_str(&format!("\nBranch:   {branch}"));
    }
    if let Some(memory) = &details.memory {
        body.push_str(&format!("\nMemory:   {memory}"));
    }
    if let Some(cpus) = &details.cpus {
        body.push_str(&format!("\nCPUs:     {cpus}"));
    }
    Modal::info(&details.name, &body)
        .width(70)
        .action(ModalAction::new(
            "Actions",
            KeyCode::Char('a'),
            Message::ShowActionsMenu {
                name: details.name.clone(),
            },
        ))
        .action(ModalAction::close("Close", KeyCode::Enter))
}

pub fn help_modal() -> Modal {
    let body = "\
Navigation
  up/down, j/k   move selection
  enter          connect to session

Sessions
  n              new session
  a              actions menu
  i              details
  s              settings
  f              firewall domains

Other
  ?              this help
  q, ctrl+c      quit";
    Modal::info("Keyboard shortcuts", body)
        .action(ModalAction::close("Close", KeyCode::Enter))
}

pub fn create_modal() -> Modal {
    let form = Form::new(
        FormKind::Create,
        vec![
            Field::text("Name", ""),
            Field::text("Branch (optional)", ""),
            Field::checkbox("Create without connecting", false),
        ],
    );
    Modal::form("New session", form)
}

pub fn settings_modal(settings: &Settings) -> Modal {
    let form = Form::new(
        FormKind::Settings,
        vec![
            Field::text("Memory limit", &settings.session.memory),
            Field::text("CPU limit", &settings.session.cpus),
            Field::checkbox("Show tips", settings.ui.show_tips),
            Field::checkbox("Desktop notifications", settings.daemon.notifications),
            Field::checkbox("Automatic token refresh", settings.daemon.token_refresh),
        ],
    );
    Modal::form("Settings", form)
}

pub fn firewall_modal(settings: &Settings) -> Modal {
    let form = Form::new(
        FormKind::Firewall,
        vec![Field::multiline(
            "Allowed domains (one per line)",
            &settings.firewall.domains.join("\n"),
        )],
    );
    Modal::form("Firewall", form).width(70)
}

pub fn actions_menu(session: &SessionSummary) -> Modal {
    let name = &session.name;
    let running = session.state == SessionState::Running;

    let mut modal = Modal::menu(&format!("Actions: {name}"), name);
    if running {
        modal = modal
            .action(ModalAction::new(
                "Connect",
                KeyCode::Char('c'),
                Message::Connect { name: name.clone() },
            ))
            .action(op_action("Stop", KeyCode::Char('s'), OperationKind::Stop, name))
            .action(op_action(
                "Refresh tokens",
                KeyCode::Char('t'),
                OperationKind::RefreshTokens,
                name,
            ));
    } else {
        modal = modal.action(op_action(
            "Restart",
            KeyCode::Char('r'),
            OperationKind::Restart,
            name,
        ));
    }
    modal
        .action(op_action("Delete", KeyCode::Char('d'), OperationKind::Delete, name))
        .action(ModalAction::close("Cancel", KeyCode::Esc))
}

fn op_action(label: &str, key: KeyCode, op: OperationKind, name: &str) -> ModalAction {
    ModalAction::new(
        label,
        key,
        Message::RequestOperation {
            op,
            name: name.to_string(),
        },
    )
}

pub fn confirm_operation_modal(op: OperationKind, name: &str) -> Modal {
    let verb = match op {
        OperationKind::Stop => "Stop",
        OperationKind::Delete => "Delete",
        OperationKind::Restart => "Restart",
        OperationKind::RefreshTokens => "Refresh tokens for",
    };
    let body = match op {
        OperationKind::Delete => format!(
            "{verb} session {name}?\n\nThe container and any uncommitted work inside it will be removed."
        ),
        _ => format!("{verb} session {name}?"),
    };
    Modal::confirm(&format!("{verb} {name}"), &body)
        .action(ModalAction::primary(
            "Confirm",
            KeyCode::Enter,
            Message::ConfirmOperation {
                op,
                name: name.to_string(),
            },
        ))
        .action(ModalAction::close("Cancel", KeyCode::Esc))
}

pub fn error_modal(title: &str, detail: &str) -> Modal {
    Modal::info(title, detail)
        .width(70)
        .action(ModalAction::close("Close", KeyCode::Enter))
}
