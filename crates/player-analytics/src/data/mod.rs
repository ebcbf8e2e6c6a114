// Player data: row model, CSV loading, and the shared dataset.

pub mod dataset;
pub mod loader;
pub mod player;
pub mod source;

pub use dataset::Dataset;
pub use loader::{load_dataset, load_players_from_reader, LoadError};
pub use player::{Category, PlayerRow, Role, RoleStats};
pub use source::DataSource;
