use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use serde::Deserialize;

use super::LandmarkSource;
use crate::{
    error::ReplayError,
    types::{Hand, HandLandmarks, HandObservation, LandmarkFrame, Point},
};

#[derive(Deserialize)]
struct RecordedFrame {
    width: u32,
    height: u32,
    #[serde(default)]
    hands: Vec<RecordedHand>,
}

#[derive(Deserialize)]
struct RecordedHand {
    handedness: Hand,
    landmarks: Vec<RecordedPoint>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordedPoint {
    Xyz([f32; 3]),
    Xy([f32; 2]),
}

impl RecordedPoint {
    fn to_point(&self) -> Point {
        match *self {
            RecordedPoint::Xyz([x, y, _z]) => Point::new(x, y),
            RecordedPoint::Xy([x, y]) => Point::new(x, y),
        }
    }
}

/// Replays hand landmarks recorded as JSON lines, one frame per line:
///
/// ```json
/// {"width":640,"height":480,"hands":[{"handedness":"Right","landmarks":[[0.5,0.9],...]}]}
/// ```
///
/// Coordinates are normalized to the frame; a third coordinate is ignored.
pub struct ReplaySource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, ReplayError> {
        Ok(Self::from_reader(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    pub fn read_frame(&mut self) -> Result<Option<LandmarkFrame>, ReplayError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }

            let line = self.line;
            let recorded: RecordedFrame = serde_json::from_str(text)
                .map_err(|source| ReplayError::Json { line, source })?;
            return parse_frame(recorded, line).map(Some);
        }
    }
}

fn parse_frame(recorded: RecordedFrame, line: usize) -> Result<LandmarkFrame, ReplayError> {
    let hands = recorded
        .hands
        .into_iter()
        .enumerate()
        .map(|(hand, raw)| {
            let points = raw.landmarks.iter().map(RecordedPoint::to_point).collect();
            HandLandmarks::new(points)
                .map(|landmarks| HandObservation {
                    hand: raw.handedness,
                    landmarks,
                })
                .map_err(|source| ReplayError::Landmarks { line, hand, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LandmarkFrame {
        width: recorded.width,
        height: recorded.height,
        hands,
    })
}

impl<R: BufRead + Send + 'static> LandmarkSource for ReplaySource<R> {
    fn next_frame(&mut self) -> anyhow::Result<Option<LandmarkFrame>> {
        Ok(self.read_frame()?)
    }
}
