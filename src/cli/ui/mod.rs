pub mod preview;
pub mod prompts;
pub mod spinner;

pub use preview::print_listing_preview;
pub use prompts::{prompt_category_selection, prompt_confirmation, prompt_environment_selection};
pub use spinner::with_spinner;
