mod builtin_font;
pub mod text_label_compositor;
