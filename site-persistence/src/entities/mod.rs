pub mod prelude;

pub mod local_storage;
