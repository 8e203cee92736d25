mod concat_list;
mod ffmpeg_command;
mod join_request;
mod media_item;
mod media_scanner;
mod naming_resolver;
mod part_grouper;
mod path_validator;

pub use concat_list::{ConcatListFile, format_concat_list};
pub use ffmpeg_command::FfmpegConcatCommand;
pub use join_request::JoinRequest;
pub use media_item::MediaItem;
pub use media_scanner::scan_media_parts;
pub use naming_resolver::{base_name, destination_path, output_file_name};
pub use part_grouper::{PartGroup, group_parts, part_number};
pub use path_validator::{folder_exists, validate_directory_exists};
