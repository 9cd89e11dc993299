pub mod storage;
pub mod state;

pub mod producer_repo;
pub use producer_repo::ProducerRepository;
pub mod farm_repo;
pub use farm_repo::FarmRepository;
pub mod crop_repo;
pub use crop_repo::CropRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;

pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
