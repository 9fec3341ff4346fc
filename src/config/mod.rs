pub mod types;
pub mod options;
pub mod validator;
pub mod presets;

pub use types::*;
pub use options::*;
pub use validator::*;
