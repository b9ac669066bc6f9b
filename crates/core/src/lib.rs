//! Face-aligned photo time-lapse pipeline.
//!
//! Each concern is split into `domain` (types and ports) and
//! `infrastructure` (adapters over ffmpeg, ONNX Runtime and `image`).

pub mod shared {
    pub mod capture_date;
    pub mod constants;
    pub mod frame;
    pub mod video_metadata;
}

pub mod detection {
    pub mod domain {
        pub mod landmark_detector;
        pub mod landmark_set;
    }
    pub mod infrastructure;
}

pub mod alignment {
    pub mod domain {
        pub mod alignment_error;
        pub mod frame_normalizer;
        pub mod frame_resampler;
        pub mod placement_policy;
        pub mod similarity_transform;
    }
    pub mod infrastructure;
}

pub mod color {
    pub mod domain {
        pub mod color_matcher;
    }
    pub mod infrastructure;
}

pub mod labeling {
    pub mod domain {
        pub mod label_compositor;
    }
    pub mod infrastructure;
}

pub mod sequencing {
    pub mod domain {
        pub mod capture_date_source;
        pub mod sequencer;
    }
    pub mod infrastructure;
}

pub mod video {
    pub mod domain {
        pub mod format_converter;
        pub mod image_reader;
        pub mod image_writer;
        pub mod video_writer;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod assemble_video_use_case;
    pub mod build_timelapse_use_case;
    pub mod infrastructure;
    pub mod pipeline_executor;
    pub mod pipeline_logger;
    pub mod processing_error;
    pub mod run_config;
    pub mod run_summary;
}
