pub mod setting;
pub mod utils;

pub use setting::{Setting, SETTING};
pub use utils::get_config_dir;
pub use utils::get_setting_path;
