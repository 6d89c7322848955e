use crate::{
    bend::{self, BendResult},
    config::PianoConfig,
    error::EngineError,
    keyboard::{KeyboardLayout, resolve_key},
    press::{self, FingerContact, HandClaims, KeyEvent, KeyboardState},
    types::{Finger, Hand, HandObservation, KeyId},
};

#[derive(Clone, Debug, Default)]
pub struct FrameOutcome {
    pub events: Vec<KeyEvent>,
    pub bends: Vec<(Hand, [BendResult; 5])>,
}

/// Owns the keyboard layout and the press state, and turns one frame of
/// hand observations into press and release events.
pub struct PianoEngine {
    config: PianoConfig,
    layout: KeyboardLayout,
    state: KeyboardState,
    claims: HandClaims,
}

impl PianoEngine {
    pub fn new(config: PianoConfig, width: u32, height: u32) -> Result<Self, EngineError> {
        let layout = KeyboardLayout::new(width, height, &config.layout)?;
        log::info!("keyboard laid out for {width}x{height} frames");
        Ok(Self {
            config,
            layout,
            state: KeyboardState::new(),
            claims: HandClaims::new(),
        })
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn state(&self) -> &KeyboardState {
        &self.state
    }

    pub fn is_pressed(&self, key: KeyId) -> bool {
        self.state.is_pressed(key)
    }

    pub fn process_frame(
        &mut self,
        width: u32,
        height: u32,
        hands: &[HandObservation],
    ) -> Result<FrameOutcome, EngineError> {
        if self.layout.frame_size() != (width, height) {
            self.layout = KeyboardLayout::new(width, height, &self.config.layout)?;
            log::info!("frame size changed, keyboard laid out for {width}x{height}");
        }

        let mut outcome = FrameOutcome::default();
        let mut contacts = Vec::with_capacity(2 * Finger::ALL.len());
        let mut seen = [false; 2];

        for observation in hands {
            let hand = observation.hand;
            if seen[hand.index()] {
                log::debug!("ignoring second {} hand in frame", hand.label());
                continue;
            }
            seen[hand.index()] = true;

            let bends = bend::classify_hand(&observation.landmarks, &self.config.thresholds);
            for result in &bends {
                let contact = if result.is_bent {
                    let tip = observation.landmarks.point(result.finger.tip());
                    let (x, y) = (tip.x * width as f32, tip.y * height as f32);
                    FingerContact::Bent(resolve_key(x, y, &self.layout).map(|key| key.id))
                } else {
                    FingerContact::Straight
                };
                contacts.push((hand, result.finger, contact));
            }
            outcome.bends.push((hand, bends));
        }

        // a hand missing from the frame lets go of everything it held
        for hand in Hand::ALL.into_iter().filter(|hand| !seen[hand.index()]) {
            contacts.extend(Finger::ALL.map(|finger| (hand, finger, FingerContact::Straight)));
        }

        press::apply_frame(
            &mut self.state,
            &mut self.claims,
            &contacts,
            &mut outcome.events,
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bend::tests::hand_with_angles,
        error::LayoutError,
        types::{HandLandmarks, Point},
    };

    const WIDTH: u32 = 700;
    const HEIGHT: u32 = 500;

    fn key(name: &str) -> KeyId {
        name.parse().unwrap()
    }

    fn engine() -> PianoEngine {
        PianoEngine::new(PianoConfig::default(), WIDTH, HEIGHT).unwrap()
    }

    /// A hand with only `finger` bent (or none, when `None`), its tip placed
    /// at pixel `(x, y)` of a 700x500 frame.
    fn hand(finger: Option<Finger>, x: f32, y: f32) -> HandLandmarks {
        let angles = Finger::ALL.map(|f| if Some(f) == finger { 130.0 } else { 178.0 });
        let mut points = hand_with_angles(angles).points().to_vec();
        let tip = finger.unwrap_or(Finger::Index).tip();
        points[tip] = Point::new(x / WIDTH as f32, y / HEIGHT as f32);
        HandLandmarks::new(points).unwrap()
    }

    /// Index and middle bent, tips at the two given pixels.
    fn two_fingers(index: (f32, f32), middle: (f32, f32)) -> HandLandmarks {
        let mut points = hand_with_angles([178.0, 130.0, 130.0, 178.0, 178.0])
            .points()
            .to_vec();
        for (finger, (x, y)) in [(Finger::Index, index), (Finger::Middle, middle)] {
            points[finger.tip()] = Point::new(x / WIDTH as f32, y / HEIGHT as f32);
        }
        HandLandmarks::new(points).unwrap()
    }

    fn observe(hand_side: Hand, landmarks: HandLandmarks) -> HandObservation {
        HandObservation {
            hand: hand_side,
            landmarks,
        }
    }

    fn names(events: &[KeyEvent]) -> Vec<(bool, String)> {
        events
            .iter()
            .map(|e| (e.is_press(), e.key().to_string()))
            .collect()
    }

    #[test]
    fn test_bent_finger_over_key_presses_once() {
        let mut engine = engine();
        let frame = [observe(Hand::Right, hand(Some(Finger::Index), 25.0, 150.0))];
        let mut presses = Vec::new();
        for _ in 0..5 {
            let outcome = engine.process_frame(WIDTH, HEIGHT, &frame).unwrap();
            presses.extend(outcome.events);
        }
        assert_eq!(names(&presses), [(true, "C".to_string())]);

        let straight = [observe(Hand::Right, hand(None, 25.0, 150.0))];
        let outcome = engine.process_frame(WIDTH, HEIGHT, &straight).unwrap();
        assert_eq!(names(&outcome.events), [(false, "C".to_string())]);
    }

    #[test]
    fn test_black_key_precedence_through_engine() {
        let mut engine = engine();
        let frame = [observe(Hand::Left, hand(Some(Finger::Middle), 40.0, 20.0))];
        let outcome = engine.process_frame(WIDTH, HEIGHT, &frame).unwrap();
        assert_eq!(names(&outcome.events), [(true, "C#".to_string())]);
        assert!(engine.is_pressed(key("C#")));
        assert!(!engine.is_pressed(key("C")));
    }

    #[test]
    fn test_moving_to_neighbour_hands_off() {
        let mut engine = engine();
        let on_c = [observe(Hand::Right, hand(Some(Finger::Index), 25.0, 150.0))];
        let on_d = [observe(Hand::Right, hand(Some(Finger::Index), 75.0, 150.0))];
        engine.process_frame(WIDTH, HEIGHT, &on_c).unwrap();
        let outcome = engine.process_frame(WIDTH, HEIGHT, &on_d).unwrap();
        assert_eq!(
            names(&outcome.events),
            [(false, "C".to_string()), (true, "D".to_string())]
        );
        let held: Vec<KeyId> = engine.state().pressed_keys().collect();
        assert_eq!(held, [key("D")]);
    }

    #[test]
    fn test_two_hands_share_a_key() {
        let mut engine = engine();
        let both = [
            observe(Hand::Left, hand(Some(Finger::Index), 120.0, 150.0)),
            observe(Hand::Right, hand(Some(Finger::Ring), 130.0, 160.0)),
        ];
        let outcome = engine.process_frame(WIDTH, HEIGHT, &both).unwrap();
        assert_eq!(names(&outcome.events), [(true, "E".to_string())]);

        let left_up = [
            observe(Hand::Left, hand(None, 120.0, 150.0)),
            observe(Hand::Right, hand(Some(Finger::Ring), 130.0, 160.0)),
        ];
        let outcome = engine.process_frame(WIDTH, HEIGHT, &left_up).unwrap();
        assert!(outcome.events.is_empty());

        let both_up = [
            observe(Hand::Left, hand(None, 120.0, 150.0)),
            observe(Hand::Right, hand(None, 130.0, 160.0)),
        ];
        let outcome = engine.process_frame(WIDTH, HEIGHT, &both_up).unwrap();
        assert_eq!(names(&outcome.events), [(false, "E".to_string())]);
    }

    #[test]
    fn test_lost_hand_releases_its_keys() {
        let mut engine = engine();
        let frame = [observe(Hand::Right, hand(Some(Finger::Pinky), 675.0, 150.0))];
        let outcome = engine.process_frame(WIDTH, HEIGHT, &frame).unwrap();
        assert_eq!(names(&outcome.events), [(true, "B2".to_string())]);

        let outcome = engine.process_frame(WIDTH, HEIGHT, &[]).unwrap();
        assert_eq!(names(&outcome.events), [(false, "B2".to_string())]);
        assert!(outcome.bends.is_empty());
    }

    #[test]
    fn test_duplicate_handedness_uses_first() {
        let mut engine = engine();
        let frame = [
            observe(Hand::Right, hand(Some(Finger::Index), 25.0, 150.0)),
            observe(Hand::Right, hand(Some(Finger::Index), 75.0, 150.0)),
        ];
        let outcome = engine.process_frame(WIDTH, HEIGHT, &frame).unwrap();
        assert_eq!(names(&outcome.events), [(true, "C".to_string())]);
        assert_eq!(outcome.bends.len(), 1);
    }

    #[test]
    fn test_tip_above_keyboard_presses_nothing() {
        let mut engine = engine();
        let frame = [observe(Hand::Right, hand(Some(Finger::Index), 25.0, 300.0))];
        let outcome = engine.process_frame(WIDTH, HEIGHT, &frame).unwrap();
        assert!(outcome.events.is_empty());
        assert!(outcome.bends[0].1[1].is_bent);
    }

    #[test]
    fn test_resize_relayouts_and_keeps_state() {
        let mut engine = engine();
        let frame = [observe(Hand::Right, hand(Some(Finger::Index), 25.0, 150.0))];
        engine.process_frame(WIDTH, HEIGHT, &frame).unwrap();

        let outcome = engine.process_frame(1400, HEIGHT, &frame).unwrap();
        assert_eq!(engine.layout().frame_size(), (1400, HEIGHT));
        // the tip now lands at x = 50 on a 100 px wide C
        assert!(outcome.events.is_empty());
        assert!(engine.is_pressed(key("C")));
    }

    #[test]
    fn test_zero_width_frame_is_an_error() {
        let mut engine = engine();
        assert_eq!(
            engine.process_frame(0, HEIGHT, &[]).unwrap_err(),
            EngineError::Layout(LayoutError::ZeroWidth)
        );
        assert!(PianoEngine::new(PianoConfig::default(), 0, HEIGHT).is_err());
    }

    #[test]
    fn test_fingers_trading_keys_do_not_retrigger() {
        let mut engine = engine();
        let first = [observe(Hand::Right, two_fingers((25.0, 150.0), (75.0, 150.0)))];
        let outcome = engine.process_frame(WIDTH, HEIGHT, &first).unwrap();
        assert_eq!(
            names(&outcome.events),
            [(true, "C".to_string()), (true, "D".to_string())]
        );

        let swapped = [observe(Hand::Right, two_fingers((75.0, 150.0), (25.0, 150.0)))];
        let outcome = engine.process_frame(WIDTH, HEIGHT, &swapped).unwrap();
        assert!(outcome.events.is_empty());
        assert!(engine.is_pressed(key("C")));
        assert!(engine.is_pressed(key("D")));
    }

    #[test]
    fn test_key_handed_to_other_hand_stays_down() {
        let mut engine = engine();
        let left = [observe(Hand::Left, hand(Some(Finger::Index), 225.0, 150.0))];
        engine.process_frame(WIDTH, HEIGHT, &left).unwrap();

        let right = [observe(Hand::Right, hand(Some(Finger::Ring), 230.0, 160.0))];
        let outcome = engine.process_frame(WIDTH, HEIGHT, &right).unwrap();
        assert!(outcome.events.is_empty());
        assert!(engine.is_pressed(key("G")));
    }
}
