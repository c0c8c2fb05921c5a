pub mod local_storage_repository;

pub use local_storage_repository::LocalStorageRepository;
