use crate::types::{Finger, HandLandmarks, Point};

const MIN_SEGMENT_LENGTH: f32 = 1e-6;
const MIN_BEND_ANGLE: f32 = 90.0;

/// Upper angle bounds (degrees) under which a finger counts as bent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BendThresholds {
    pub thumb: f32,
    pub index: f32,
    pub middle: f32,
    pub ring: f32,
    pub pinky: f32,
    /// Angles at or below this are folded-back poses, not presses.
    pub min_angle: f32,
}

impl Default for BendThresholds {
    fn default() -> Self {
        Self {
            thumb: 169.0,
            index: 160.0,
            middle: 160.0,
            ring: 155.0,
            pinky: 160.0,
            min_angle: MIN_BEND_ANGLE,
        }
    }
}

impl BendThresholds {
    pub fn upper(&self, finger: Finger) -> f32 {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }

    pub fn is_bent_angle(&self, finger: Finger, angle: f32) -> bool {
        angle > self.min_angle && angle < self.upper(finger)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BendResult {
    pub finger: Finger,
    pub is_bent: bool,
    /// `None` when two joints coincide and no angle exists.
    pub angle_degrees: Option<f32>,
}

/// Angle at `mid` between the segments towards `base` and `tip`, in degrees,
/// measured in the image plane.
pub fn joint_angle(base: Point, mid: Point, tip: Point) -> Option<f32> {
    let v1 = sub(base, mid);
    let v2 = sub(tip, mid);
    let len1 = length(v1);
    let len2 = length(v2);
    if len1 < MIN_SEGMENT_LENGTH || len2 < MIN_SEGMENT_LENGTH {
        return None;
    }

    let cos = (dot(v1, v2) / (len1 * len2)).clamp(-1.0, 1.0);
    let mut angle = cos.acos().to_degrees().abs();
    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    angle.is_finite().then_some(angle)
}

pub fn classify_finger(
    landmarks: &HandLandmarks,
    finger: Finger,
    thresholds: &BendThresholds,
) -> BendResult {
    let [a, b, c] = finger.bend_joints();
    let angle_degrees = joint_angle(landmarks.point(a), landmarks.point(b), landmarks.point(c));

    BendResult {
        finger,
        is_bent: angle_degrees.is_some_and(|angle| thresholds.is_bent_angle(finger, angle)),
        angle_degrees,
    }
}

pub fn classify_hand(landmarks: &HandLandmarks, thresholds: &BendThresholds) -> [BendResult; 5] {
    Finger::ALL.map(|finger| classify_finger(landmarks, finger, thresholds))
}

fn sub(a: Point, b: Point) -> (f32, f32) {
    (a.x - b.x, a.y - b.y)
}

fn dot(a: (f32, f32), b: (f32, f32)) -> f32 {
    a.0 * b.0 + a.1 * b.1
}

fn length(v: (f32, f32)) -> f32 {
    (v.0 * v.0 + v.1 * v.1).sqrt()
}
