pub mod claude;
pub mod error;
mod http;
pub mod openai;
pub mod traits;
pub mod util;

pub use claude::Claude;
pub use error::AiError;
pub use openai::OpenAi;
pub use traits::TextGenerator;
pub use util::{extract_json_object, strip_code_blocks, truncate_to_char_boundary};
