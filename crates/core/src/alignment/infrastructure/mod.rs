pub mod imageproc_resampler;
