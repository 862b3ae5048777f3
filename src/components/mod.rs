pub mod chunk_table;
pub mod header;
pub mod help_modal;
pub mod progress_chart;
pub mod stats_panel;
pub mod status_bar;

pub use chunk_table::ChunkTable;
pub use header::Header;
pub use help_modal::HelpModal;
pub use progress_chart::ProgressChart;
pub use stats_panel::StatsPanel;
pub use status_bar::StatusBar;
