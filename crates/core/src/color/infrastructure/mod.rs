pub mod histogram_color_matcher;
