pub mod error;
pub mod metadata;
pub mod survey;
pub mod variable;

pub use error::{HarmonError, Result};
pub use metadata::{VariableMetadata, looks_like_missing_label, normalize_label};
pub use survey::{ColumnData, Survey};
pub use variable::{MissingRule, ValueLabel, VarType, Variable};
