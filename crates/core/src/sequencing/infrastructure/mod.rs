pub mod directory_scanner;
pub mod ffmpeg_capture_date_reader;
