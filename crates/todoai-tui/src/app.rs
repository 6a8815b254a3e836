use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use todoai_core::{ConfigStore, CredentialStore, Credentials, KeySource, MemoryStore, TaskGenerator, TaskList};

use crate::input::TextInput;

pub type AppCredentials = Credentials<Box<dyn CredentialStore + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Adding,
    Prompting,
    Editing,
    Settings,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Task list
    pub tasks: TaskList,
    pub list_state: ListState,

    // Inputs
    pub add_input: TextInput,
    pub prompt_input: TextInput,
    pub edit_input: TextInput,
    pub editing_id: Option<u64>,
    pub key_input: TextInput,

    // Generation state; at most one request in flight
    pub generator: TaskGenerator,
    pub generate_task: Option<JoinHandle<Vec<String>>>,
    pub animation_frame: u8,

    // Settings
    pub credentials: AppCredentials,
    pub status: Option<String>,

    // Panel area for mouse hit-testing (updated during render)
    pub list_area: Option<Rect>,
}

impl App {
    pub fn new() -> Self {
        let store: Box<dyn CredentialStore + Send> = match ConfigStore::new() {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!(error = %e, "no config directory, API key will not be saved");
                Box::new(MemoryStore::new())
            }
        };
        Self::with_credentials(Credentials::new(store))
    }

    pub fn with_credentials(credentials: AppCredentials) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,

            tasks: TaskList::new(),
            list_state: ListState::default(),

            add_input: TextInput::new(),
            prompt_input: TextInput::new(),
            edit_input: TextInput::new(),
            editing_id: None,
            key_input: TextInput::new(),

            generator: TaskGenerator::new(),
            generate_task: None,
            animation_frame: 0,

            credentials,
            status: None,

            list_area: None,
        }
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.list_state
            .selected()
            .and_then(|i| self.tasks.at(i))
            .map(|t| t.id)
    }

    // List navigation
    pub fn select_next(&mut self) {
        let len = self.tasks.len();
        if len > 0 {
            let i = self.list_state.selected().map_or(0, |i| (i + 1).min(len - 1));
            self.list_state.select(Some(i));
        }
    }

    pub fn select_prev(&mut self) {
        if !self.tasks.is_empty() {
            let i = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn select_first(&mut self) {
        if !self.tasks.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.tasks.is_empty() {
            self.list_state.select(Some(self.tasks.len() - 1));
        }
    }

    // Reordering (keyboard stand-in for drag and drop)
    pub fn move_selected_down(&mut self) {
        if let Some(i) = self.list_state.selected() {
            if self.tasks.move_task(i, i + 1) {
                self.list_state.select(Some(i + 1));
            }
        }
    }

    pub fn move_selected_up(&mut self) {
        if let Some(i) = self.list_state.selected() {
            if i > 0 && self.tasks.move_task(i, i - 1) {
                self.list_state.select(Some(i - 1));
            }
        }
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.tasks.toggle(id);
        }
    }

    pub fn delete_selected(&mut self) {
        if let (Some(i), Some(id)) = (self.list_state.selected(), self.selected_id()) {
            self.tasks.remove(id);
            // Adjust selection
            if self.tasks.is_empty() {
                self.list_state.select(None);
            } else if i >= self.tasks.len() {
                self.list_state.select(Some(self.tasks.len() - 1));
            }
        }
    }

    pub fn submit_add(&mut self) {
        if self.add_input.is_blank() {
            return;
        }
        let text = self.add_input.take();
        if self.tasks.add(&text).is_some() {
            self.select_last();
        }
    }

    // Editing
    pub fn begin_edit(&mut self) {
        if let Some(id) = self.selected_id() {
            if let Some(task) = self.tasks.get(id) {
                self.edit_input = TextInput::with_text(&task.text);
                self.editing_id = Some(id);
                self.input_mode = InputMode::Editing;
            }
        }
    }

    /// Save the edit. Blank text keeps the popup open, like a disabled save button.
    pub fn commit_edit(&mut self) {
        if self.edit_input.is_blank() {
            return;
        }
        if let Some(id) = self.editing_id.take() {
            self.tasks.edit(id, self.edit_input.value());
        }
        self.edit_input.clear();
        self.input_mode = InputMode::Normal;
    }

    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
        self.edit_input.clear();
        self.input_mode = InputMode::Normal;
    }

    // Generation
    pub fn is_generating(&self) -> bool {
        self.generate_task.is_some()
    }

    /// Start a generation request. Refused while one is already running.
    pub fn submit_prompt(&mut self) -> bool {
        if self.is_generating() || self.prompt_input.is_blank() {
            return false;
        }

        // Resolved fresh so a key saved in settings applies immediately
        let api_key = self.credentials.resolve();
        let prompt = self.prompt_input.value().to_string();
        let generator = self.generator.clone();

        self.generate_task = Some(tokio::spawn(async move {
            generator.generate_tasks(&api_key, &prompt).await
        }));
        self.animation_frame = 0;
        true
    }

    /// Collect the result of a finished request, if there is one
    pub async fn poll_generation(&mut self) {
        let finished = self
            .generate_task
            .as_ref()
            .is_some_and(|handle| handle.is_finished());
        if !finished {
            return;
        }

        if let Some(handle) = self.generate_task.take() {
            match handle.await {
                Ok(lines) => self.apply_generated(lines),
                Err(e) => {
                    error!(error = %e, "generation task did not complete");
                    self.apply_generated(vec![format!("Error: {}", e)]);
                }
            }
        }
    }

    fn apply_generated(&mut self, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        let first_new = self.tasks.len();
        let added = self.tasks.extend(&lines);
        info!(count = added.len(), "appended generated tasks");
        if !added.is_empty() {
            self.list_state.select(Some(first_new));
        }
        self.prompt_input.clear();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_generating() {
            self.animation_frame = (self.animation_frame + 1) % 4;
        }
    }

    // Settings
    pub fn open_settings(&mut self) {
        self.key_input.clear();
        self.status = None;
        self.input_mode = InputMode::Settings;
    }

    pub fn key_source(&self) -> KeySource {
        self.credentials.source()
    }

    /// Save the typed key; an empty input removes the saved key
    pub fn save_key(&mut self) {
        let value = self.key_input.take();
        self.status = Some(match self.credentials.set(&value) {
            Ok(()) if value.trim().is_empty() => "Saved API key removed".to_string(),
            Ok(()) => "API key saved".to_string(),
            Err(e) => {
                error!(error = %e, "failed to save API key");
                format!("Could not save API key: {}", e)
            }
        });
        self.input_mode = InputMode::Normal;
    }

    pub fn clear_key(&mut self) {
        self.key_input.clear();
        self.status = Some(match self.credentials.clear() {
            Ok(()) => "Saved API key removed".to_string(),
            Err(e) => {
                error!(error = %e, "failed to clear API key");
                format!("Could not clear API key: {}", e)
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let store: Box<dyn CredentialStore + Send> = Box::new(MemoryStore::new());
        App::with_credentials(Credentials::with_default(store, None))
    }

    fn texts(app: &App) -> Vec<String> {
        app.tasks.iter().map(|t| t.text.clone()).collect()
    }

    async fn wait_for_generation(app: &mut App) {
        while app
            .generate_task
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
        {
            tokio::task::yield_now().await;
        }
        app.poll_generation().await;
    }

    #[test]
    fn test_add_selects_new_task() {
        let mut app = test_app();
        app.add_input = TextInput::with_text("Buy milk");
        app.submit_add();

        assert_eq!(texts(&app), vec!["Buy milk"]);
        assert_eq!(app.list_state.selected(), Some(0));
        assert!(app.add_input.is_blank());
    }

    #[test]
    fn test_blank_add_is_ignored() {
        let mut app = test_app();
        app.add_input = TextInput::with_text("   ");
        app.submit_add();
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn test_move_selected_follows_task() {
        let mut app = test_app();
        app.tasks.extend(["a", "b", "c"]);
        app.list_state.select(Some(0));

        app.move_selected_down();
        assert_eq!(texts(&app), vec!["b", "a", "c"]);
        assert_eq!(app.list_state.selected(), Some(1));

        app.move_selected_up();
        app.move_selected_up();
        assert_eq!(texts(&app), vec!["a", "b", "c"]);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn test_delete_last_moves_selection_up() {
        let mut app = test_app();
        app.tasks.extend(["a", "b"]);
        app.list_state.select(Some(1));

        app.delete_selected();
        assert_eq!(texts(&app), vec!["a"]);
        assert_eq!(app.list_state.selected(), Some(0));

        app.delete_selected();
        assert!(app.tasks.is_empty());
        assert_eq!(app.list_state.selected(), None);
    }

    #[test]
    fn test_edit_flow() {
        let mut app = test_app();
        app.tasks.add("old");
        app.list_state.select(Some(0));

        app.begin_edit();
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.edit_input.value(), "old");

        app.edit_input = TextInput::with_text("  ");
        app.commit_edit();
        assert_eq!(app.input_mode, InputMode::Editing);

        app.edit_input = TextInput::with_text("new");
        app.commit_edit();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(texts(&app), vec!["new"]);
    }

    #[test]
    fn test_save_blank_key_clears() {
        let mut app = test_app();
        app.key_input = TextInput::with_text("secret");
        app.save_key();
        assert_eq!(app.key_source(), KeySource::User);

        app.open_settings();
        app.save_key();
        assert_eq!(app.key_source(), KeySource::None);
    }

    #[tokio::test]
    async fn test_generation_without_key_appends_diagnostic() {
        let mut app = test_app();
        app.prompt_input = TextInput::with_text("plan a party");

        assert!(app.submit_prompt());
        wait_for_generation(&mut app).await;

        assert_eq!(texts(&app), vec!["Error: Mistral API key is not configured"]);
        assert!(app.prompt_input.is_blank());
        assert!(!app.is_generating());
    }

    #[tokio::test]
    async fn test_only_one_generation_in_flight() {
        let mut app = test_app();
        app.prompt_input = TextInput::with_text("first");

        assert!(app.submit_prompt());
        assert!(!app.submit_prompt());

        wait_for_generation(&mut app).await;
        app.prompt_input = TextInput::with_text("second");
        assert!(app.submit_prompt());
    }

    #[test]
    fn test_blank_prompt_is_not_submitted() {
        let mut app = test_app();
        app.prompt_input = TextInput::with_text(" ");
        assert!(!app.submit_prompt());
        assert!(!app.is_generating());
    }

    #[test]
    fn test_blank_generated_line_adds_nothing() {
        let mut app = test_app();
        app.prompt_input = TextInput::with_text("plan a trip");
        app.apply_generated(vec![String::new()]);

        assert!(app.tasks.is_empty());
        assert_eq!(app.list_state.selected(), None);
        assert!(app.prompt_input.is_blank());
    }
}
