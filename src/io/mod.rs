pub mod audio_file;
pub mod wav_writer;

pub use audio_file::{load_signal, AudioFile};
pub use wav_writer::write_wav;
