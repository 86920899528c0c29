//! Infrastructure - ports and their adapters.

pub mod clock;
pub mod image_encoder;
pub mod mock_generation;
pub mod ports;
pub mod settings;
pub mod storage;
