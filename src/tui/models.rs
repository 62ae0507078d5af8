#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Family,
    Scope,
    Url,
    Confirm,
}

impl WizardStep {
    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Family => "Link Type",
            WizardStep::Scope => "Extraction Mode",
            WizardStep::Url => "URL",
            WizardStep::Confirm => "Confirm",
        }
    }
}
