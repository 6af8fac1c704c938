/// Parameters collected from the create form. Handed to the launcher
/// once the terminal has been restored.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CreateParams {
    pub name: String,
    pub branch: Option<String>,
    /// Create the session but stay in the dashboard afterwards.
    pub no_connect: bool,
}

/// Why the UI loop stopped. Everything except `Quit` hands control to
/// a subprocess that needs the real terminal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Quit,
    Connect { name: String },
    Create(CreateParams),
    RunAuth,
}
