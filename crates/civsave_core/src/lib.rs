pub mod assembler;
pub mod chunk_map;
pub mod core_api;
pub mod edit;
pub mod error;
pub mod header;
pub mod layout;
pub mod reader;
pub mod record;
pub mod text;

pub use assembler::{ParseOptions, parse, parse_with_options};
pub use chunk_map::{ChunkRole, Classification, VariantLayout};
pub use edit::{set_active_player, set_player_display_name, set_player_password, set_player_status};
pub use error::{Result, SaveError};
pub use header::{ModEntry, ModId, SaveHeader, Variant};
pub use layout::{ByteRange, Chunk, Chunks, next_chunk};
pub use record::{PlayerSlot, PlayerStatus, SaveRecord};
