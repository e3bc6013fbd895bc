pub(crate) mod pause;
pub(crate) mod play;
pub(crate) mod queue;
pub(crate) mod resume;
pub(crate) mod skip;
pub(crate) mod stop;

pub mod audio_sources;
pub mod utils;

use super::CommandRequest;
use crate::Data;
use utils::messages;
use utils::music_manager::MusicResult;
