pub mod ports;
pub mod retrieve_use_case;

pub use retrieve_use_case::RetrieveUseCase;
