pub mod error;
pub mod preprocess;
pub mod schema;
pub mod traits;
pub mod types;

pub use error::*;
pub use preprocess::*;
pub use schema::*;
pub use traits::*;
pub use types::*;
