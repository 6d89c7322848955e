use crate::{config::PianoConfig, types::KeyId};

/// Plays the sample for a key. Playback is fire-and-forget: a release needs
/// no call.
pub trait SoundPlayer {
    fn play(&mut self, key: KeyId);
}

/// Used when no audio output is available; only records what would play.
#[derive(Debug, Default)]
pub struct LogPlayer {
    played: usize,
}

impl LogPlayer {
    pub fn played(&self) -> usize {
        self.played
    }
}

impl SoundPlayer for LogPlayer {
    fn play(&mut self, key: KeyId) {
        self.played += 1;
        log::info!("playing {key}");
    }
}

#[cfg(feature = "audio-rodio")]
pub use self::rodio_bank::SampleBank;

#[cfg(feature = "audio-rodio")]
mod rodio_bank {
    use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

    use anyhow::{Context, Result};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source, source::Buffered};

    use super::SoundPlayer;
    use crate::types::KeyId;

    type Sample = Buffered<Decoder<BufReader<File>>>;

    /// One decoded WAV sample per key, kept in memory for the whole session.
    pub struct SampleBank {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        samples: HashMap<KeyId, Sample>,
        volume: f32,
    }

    impl SampleBank {
        pub fn open(sound_dir: &Path, volume: f32) -> Result<Self> {
            let (stream, handle) =
                OutputStream::try_default().context("failed to open audio output")?;

            let mut samples = HashMap::with_capacity(KeyId::COUNT);
            for key in KeyId::all() {
                let path = sound_dir.join(format!("{key}.wav"));
                let file = File::open(&path)
                    .with_context(|| format!("failed to open sample {}", path.display()))?;
                let decoder = Decoder::new(BufReader::new(file))
                    .with_context(|| format!("failed to decode sample {}", path.display()))?;
                samples.insert(key, decoder.buffered());
            }
            log::info!(
                "loaded {} piano samples from {}",
                samples.len(),
                sound_dir.display()
            );

            Ok(Self {
                _stream: stream,
                handle,
                samples,
                volume,
            })
        }
    }

    impl SoundPlayer for SampleBank {
        fn play(&mut self, key: KeyId) {
            let Some(sample) = self.samples.get(&key) else {
                log::warn!("no sample loaded for {key}");
                return;
            };
            match Sink::try_new(&self.handle) {
                Ok(sink) => {
                    sink.set_volume(self.volume);
                    sink.append(sample.clone());
                    sink.detach();
                    log::debug!("playing {key}");
                }
                Err(err) => log::warn!("failed to play {key}: {err}"),
            }
        }
    }
}

/// Opens the sample bank, falling back to [`LogPlayer`] when audio is
/// unavailable.
pub fn open_player(config: &PianoConfig) -> Box<dyn SoundPlayer> {
    #[cfg(feature = "audio-rodio")]
    {
        match SampleBank::open(&config.sound_dir, config.volume) {
            Ok(bank) => return Box::new(bank),
            Err(err) => log::warn!("audio disabled, logging notes instead: {err:?}"),
        }
    }
    #[cfg(not(feature = "audio-rodio"))]
    {
        log::info!(
            "built without audio, logging notes instead of playing {}",
            config.sound_dir.display()
        );
    }
    Box::new(LogPlayer::default())
}
