pub mod bridge;
pub mod debounce;
