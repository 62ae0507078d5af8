use crossterm::event::KeyCode;

use crate::job::{Job, LinkFamily, Scope, is_web_url};
use super::models::WizardStep;

const FAMILIES: [LinkFamily; 2] = [LinkFamily::Drive, LinkFamily::Videos];

#[derive(Debug)]
pub struct App {
    pub step: WizardStep,
    pub family_index: usize,
    pub scope_index: usize,
    pub url_input: String,
    pub error_message: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,
    pub job: Option<Job>,
}

impl App {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Family,
            family_index: 1,
            scope_index: 0,
            url_input: String::new(),
            error_message: None,
            show_help: false,
            should_quit: false,
            job: None,
        }
    }

    pub fn families(&self) -> &'static [LinkFamily] {
        &FAMILIES
    }

    pub fn family(&self) -> LinkFamily {
        FAMILIES[self.family_index]
    }

    pub fn scopes(&self) -> &'static [Scope] {
        self.family().scopes()
    }

    pub fn scope(&self) -> Scope {
        let scopes = self.scopes();
        scopes[self.scope_index.min(scopes.len() - 1)]
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    fn select_family(&mut self, index: usize) {
        self.family_index = index % FAMILIES.len();
        if self.scope_index >= self.scopes().len() {
            self.scope_index = 0;
        }
    }

    fn move_selection(&mut self, down: bool) {
        match self.step {
            WizardStep::Family => {
                let len = FAMILIES.len();
                let next = if down { self.family_index + 1 } else { self.family_index + len - 1 };
                self.select_family(next);
            }
            WizardStep::Scope => {
                let len = self.scopes().len();
                self.scope_index = if down { (self.scope_index + 1) % len } else { (self.scope_index + len - 1) % len };
            }
            _ => {}
        }
    }

    pub fn advance_step(&mut self) {
        self.error_message = None;
        match self.step {
            WizardStep::Family => self.step = WizardStep::Scope,
            WizardStep::Scope => self.step = WizardStep::Url,
            WizardStep::Url => {
                let url = self.url_input.trim();
                if url.is_empty() {
                    self.error_message = Some("No URL provided!".to_string());
                } else if !is_web_url(url) {
                    self.error_message = Some("Invalid URL! Must start with http:// or https://".to_string());
                } else {
                    self.step = WizardStep::Confirm;
                }
            }
            WizardStep::Confirm => {
                self.job = Some(Job {
                    family: self.family(),
                    scope: self.scope(),
                    url: self.url_input.trim().to_string(),
                });
                self.should_quit = true;
            }
        }
    }

    pub fn go_back_step(&mut self) {
        self.error_message = None;
        self.step = match self.step {
            WizardStep::Family | WizardStep::Scope => WizardStep::Family,
            WizardStep::Url => WizardStep::Scope,
            WizardStep::Confirm => WizardStep::Url,
        };
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        if self.show_help {
            if matches!(key, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?')) {
                self.toggle_help();
            }
            return;
        }

        let typing = self.step == WizardStep::Url;

        match key {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::F(1) => self.toggle_help(),
            KeyCode::Char('?') if !typing => self.toggle_help(),
            KeyCode::Char('q') if !typing => self.should_quit = true,
            KeyCode::Enter => self.advance_step(),
            KeyCode::Up => self.move_selection(false),
            KeyCode::Down | KeyCode::Tab => self.move_selection(true),
            KeyCode::Backspace => {
                if typing && !self.url_input.is_empty() {
                    self.url_input.pop();
                } else {
                    self.go_back_step();
                }
            }
            KeyCode::Char(c) if typing => self.url_input.push(c),
            KeyCode::Char(c) => self.handle_shortcut(c),
            _ => {}
        }
    }

    fn handle_shortcut(&mut self, c: char) {
        let Some(digit) = c.to_digit(10) else { return };
        let index = digit as usize;

        match self.step {
            WizardStep::Family if (1..=FAMILIES.len()).contains(&index) => {
                self.select_family(index - 1);
                self.advance_step();
            }
            WizardStep::Scope if (1..=self.scopes().len()).contains(&index) => {
                self.scope_index = index - 1;
                self.advance_step();
            }
            _ => {}
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
