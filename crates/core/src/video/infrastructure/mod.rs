pub mod exif_segment;
pub mod ffmpeg_writer;
pub mod heic_converter;
pub mod image_file_reader;
pub mod image_file_writer;
