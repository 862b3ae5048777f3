/// Actions that can be performed in the application
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Navigation
    Up,
    Down,
    Top,
    Bottom,

    // Views
    NextView,
    PrevView,

    // Series
    ToggleSchedule(usize),
    ShowAllSchedules,

    // Data
    Reload,
    SavePlot,

    // Modals
    ShowHelp,
    CloseModal,

    // App control
    Quit,
    Tick, // Timer tick for effects and message expiry

    // No action
    None,
}
