pub mod producer;
pub mod farm;
pub mod crop;
pub mod settings;
pub mod toast;
pub mod dashboard;
