use std::path::{Path, PathBuf};

use air_piano::{
    PianoConfig, PianoEngine,
    audio,
    config::DEFAULT_VOLUME,
    pipeline::{ReplaySource, overlay, start_landmark_stream},
    types::{Frame, LandmarkFrame},
};
use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::bounded;
use image::{RgbaImage, imageops::FilterType};

const CANVAS_COLOR: [u8; 4] = [24, 24, 27, 255];

/// Play a virtual piano from recorded hand landmarks.
#[derive(Parser, Debug)]
#[command(name = "air-piano", version)]
struct Args {
    /// JSON-lines landmark recording, one frame per line.
    #[arg(long)]
    landmarks: PathBuf,

    /// Directory with one WAV sample per key (C.wav, C#.wav, ..., B2.wav).
    #[arg(long, default_value = "piano_sounds")]
    sounds: PathBuf,

    #[arg(long, default_value_t = DEFAULT_VOLUME)]
    volume: f32,

    /// Height of the white keys in pixels.
    #[arg(long)]
    key_height: Option<f32>,

    /// Write every annotated frame as a PNG into this directory.
    #[arg(long)]
    render_dir: Option<PathBuf>,

    /// Image drawn under the keyboard, scaled to the frame size.
    #[arg(long, requires = "render_dir")]
    background: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> PianoConfig {
        let mut config = PianoConfig {
            sound_dir: self.sounds.clone(),
            volume: self.volume,
            ..PianoConfig::default()
        };
        if let Some(height) = self.key_height {
            config.layout.white_key_height = height;
        }
        config
    }
}

struct Renderer {
    dir: PathBuf,
    background: Option<RgbaImage>,
    scaled: Option<RgbaImage>,
}

impl Renderer {
    fn new(dir: PathBuf, background: Option<&Path>) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let background = background
            .map(|path| {
                image::open(path)
                    .with_context(|| format!("failed to open background {}", path.display()))
                    .map(|img| img.to_rgba8())
            })
            .transpose()?;
        Ok(Self {
            dir,
            background,
            scaled: None,
        })
    }

    fn base_frame(&mut self, width: u32, height: u32) -> Frame {
        let Some(background) = &self.background else {
            return Frame::filled(width, height, CANVAS_COLOR);
        };
        let stale = self
            .scaled
            .as_ref()
            .is_none_or(|img| img.dimensions() != (width, height));
        if stale {
            self.scaled = Some(image::imageops::resize(
                background,
                width,
                height,
                FilterType::Triangle,
            ));
        }
        match &self.scaled {
            Some(img) => Frame {
                rgba: img.as_raw().clone(),
                width,
                height,
            },
            None => Frame::filled(width, height, CANVAS_COLOR),
        }
    }

    fn render(&mut self, index: usize, frame: &LandmarkFrame, engine: &PianoEngine) -> Result<()> {
        let mut canvas = self.base_frame(frame.width, frame.height);
        let hands: Vec<_> = frame.hands.iter().map(|h| &h.landmarks).collect();
        overlay::compose(&mut canvas, engine.layout(), engine.state(), &hands);

        let path = self.dir.join(format!("frame_{index:05}.png"));
        let Some(image) = RgbaImage::from_raw(canvas.width, canvas.height, canvas.rgba) else {
            log::warn!("dropping frame {index}: buffer does not match its size");
            return Ok(());
        };
        image
            .save(&path)
            .with_context(|| format!("failed to save {}", path.display()))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = args.config();

    let source = ReplaySource::open(&args.landmarks)
        .with_context(|| format!("failed to open {}", args.landmarks.display()))?;
    let mut player = audio::open_player(&config);
    let mut renderer = args
        .render_dir
        .clone()
        .map(|dir| Renderer::new(dir, args.background.as_deref()))
        .transpose()?;

    let (frame_tx, frame_rx) = bounded(4);
    let stream = start_landmark_stream(source, frame_tx);

    let mut engine: Option<PianoEngine> = None;
    let mut frames = 0usize;
    let mut presses = 0usize;

    for frame in frame_rx.iter() {
        if engine.is_none() {
            let created = PianoEngine::new(config.clone(), frame.width, frame.height)
                .with_context(|| format!("first frame is {}x{}", frame.width, frame.height))?;
            engine = Some(created);
        }
        let Some(engine) = engine.as_mut() else {
            continue;
        };

        let outcome = engine
            .process_frame(frame.width, frame.height, &frame.hands)
            .with_context(|| format!("frame {frames}"))?;
        for event in outcome.events.iter().filter(|e| e.is_press()) {
            player.play(event.key());
            presses += 1;
        }

        if let Some(renderer) = renderer.as_mut() {
            renderer.render(frames, &frame, engine)?;
        }
        frames += 1;
    }

    drop(frame_rx);
    stream
        .stop()
        .with_context(|| format!("replay of {} failed", args.landmarks.display()))?;
    log::info!("replayed {frames} frames, {presses} key presses");
    Ok(())
}
