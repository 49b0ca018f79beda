pub mod disabled_backend;
pub mod mock_backend;
