mod audio_format_translator;
mod pixel_format_translator;
mod sample_format_converter;

pub use audio_format_translator::AudioFormatTranslator;
pub use pixel_format_translator::PixelFormatTranslator;
pub use sample_format_converter::SampleFormatConverter;
