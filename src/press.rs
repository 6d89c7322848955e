use crate::types::{Finger, Hand, KeyId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed {
        key: KeyId,
        hand: Hand,
        finger: Finger,
    },
    Released {
        key: KeyId,
        hand: Hand,
        finger: Finger,
    },
}

impl KeyEvent {
    pub fn key(&self) -> KeyId {
        match self {
            KeyEvent::Pressed { key, .. } | KeyEvent::Released { key, .. } => *key,
        }
    }

    pub fn is_press(&self) -> bool {
        matches!(self, KeyEvent::Pressed { .. })
    }
}

/// What a finger is doing in the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FingerContact {
    Straight,
    /// Bent, with the key under its tip if there is one. `Bent(None)` drops
    /// the finger's claim like `Straight` does, releasing the key if no
    /// other finger holds it.
    Bent(Option<KeyId>),
}

impl FingerContact {
    fn target(self) -> Option<KeyId> {
        match self {
            FingerContact::Bent(key) => key,
            FingerContact::Straight => None,
        }
    }
}

/// Pressed flag per key. Flips only through [`apply_frame`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyboardState {
    pressed: [bool; KeyId::COUNT],
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, key: KeyId) -> bool {
        self.pressed[key.index()]
    }

    pub fn pressed_keys(&self) -> impl Iterator<Item = KeyId> + '_ {
        KeyId::all().filter(|key| self.is_pressed(*key))
    }
}

/// The key each (hand, finger) currently holds down.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandClaims {
    claims: [[Option<KeyId>; 5]; 2],
}

impl HandClaims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&self, hand: Hand, finger: Finger) -> Option<KeyId> {
        self.claims[hand.index()][finger.index()]
    }

    pub fn claim_count(&self, key: KeyId) -> usize {
        self.claims
            .iter()
            .flatten()
            .filter(|claim| **claim == Some(key))
            .count()
    }

    fn set(&mut self, hand: Hand, finger: Finger, claim: Option<KeyId>) {
        self.claims[hand.index()][finger.index()] = claim;
    }
}

/// Applies one frame of finger contacts at once. Claims are replaced first,
/// then every key that lost its last claim is released and every newly
/// claimed key that was up is pressed, in that order. A key that changes
/// fingers within the frame stays down and fires nothing.
///
/// Fingers missing from `contacts` keep their claims.
pub fn apply_frame(
    state: &mut KeyboardState,
    claims: &mut HandClaims,
    contacts: &[(Hand, Finger, FingerContact)],
    events: &mut Vec<KeyEvent>,
) {
    let before = claims.clone();
    for &(hand, finger, contact) in contacts {
        claims.set(hand, finger, contact.target());
    }

    for (hand, finger) in slots() {
        let Some(key) = before.claim(hand, finger) else {
            continue;
        };
        if claims.claim_count(key) > 0 {
            continue;
        }
        if state.pressed[key.index()] {
            state.pressed[key.index()] = false;
            log::debug!("{} {} released {key}", hand.label(), finger.label());
            events.push(KeyEvent::Released { key, hand, finger });
        }
    }

    for (hand, finger) in slots() {
        let Some(key) = claims.claim(hand, finger) else {
            continue;
        };
        if before.claim(hand, finger) == Some(key) {
            continue;
        }
        if !state.pressed[key.index()] {
            state.pressed[key.index()] = true;
            log::debug!("{} {} pressed {key}", hand.label(), finger.label());
            events.push(KeyEvent::Pressed { key, hand, finger });
        }
    }
}

/// Advances a single finger by one frame.
pub fn update_finger(
    state: &mut KeyboardState,
    claims: &mut HandClaims,
    hand: Hand,
    finger: Finger,
    contact: FingerContact,
    events: &mut Vec<KeyEvent>,
) {
    apply_frame(state, claims, &[(hand, finger, contact)], events);
}

/// Drops every claim held by `hand`, as if all its fingers straightened.
pub fn release_hand(
    state: &mut KeyboardState,
    claims: &mut HandClaims,
    hand: Hand,
    events: &mut Vec<KeyEvent>,
) {
    let contacts = Finger::ALL.map(|finger| (hand, finger, FingerContact::Straight));
    apply_frame(state, claims, &contacts, events);
}

fn slots() -> impl Iterator<Item = (Hand, Finger)> {
    Hand::ALL
        .into_iter()
        .flat_map(|hand| Finger::ALL.into_iter().map(move |finger| (hand, finger)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> KeyId {
        name.parse().unwrap()
    }

    struct Harness {
        state: KeyboardState,
        claims: HandClaims,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                state: KeyboardState::new(),
                claims: HandClaims::new(),
            }
        }

        fn step(&mut self, hand: Hand, finger: Finger, contact: FingerContact) -> Vec<KeyEvent> {
            let mut events = Vec::new();
            update_finger(
                &mut self.state,
                &mut self.claims,
                hand,
                finger,
                contact,
                &mut events,
            );
            events
        }
    }

    fn pressed(name: &str, hand: Hand, finger: Finger) -> KeyEvent {
        KeyEvent::Pressed {
            key: key(name),
            hand,
            finger,
        }
    }

    fn released(name: &str, hand: Hand, finger: Finger) -> KeyEvent {
        KeyEvent::Released {
            key: key(name),
            hand,
            finger,
        }
    }

    #[test]
    fn test_initial_state_unpressed() {
        let state = KeyboardState::new();
        assert_eq!(state.pressed_keys().count(), 0);
        assert!(KeyId::all().all(|k| !state.is_pressed(k)));
    }

    #[test]
    fn test_hold_fires_once_then_releases_once() {
        let mut h = Harness::new();
        let mut all = Vec::new();
        for _ in 0..10 {
            all.extend(h.step(Hand::Right, Finger::Index, FingerContact::Bent(Some(key("C")))));
        }
        assert_eq!(all, [pressed("C", Hand::Right, Finger::Index)]);
        assert!(h.state.is_pressed(key("C")));

        let events = h.step(Hand::Right, Finger::Index, FingerContact::Straight);
        assert_eq!(events, [released("C", Hand::Right, Finger::Index)]);
        assert!(!h.state.is_pressed(key("C")));
        assert_eq!(h.claims.claim(Hand::Right, Finger::Index), None);

        assert!(h.step(Hand::Right, Finger::Index, FingerContact::Straight).is_empty());
    }

    #[test]
    fn test_slide_to_neighbour_releases_then_presses() {
        let mut h = Harness::new();
        h.step(Hand::Left, Finger::Middle, FingerContact::Bent(Some(key("C"))));
        let events = h.step(Hand::Left, Finger::Middle, FingerContact::Bent(Some(key("D"))));
        assert_eq!(
            events,
            [
                released("C", Hand::Left, Finger::Middle),
                pressed("D", Hand::Left, Finger::Middle),
            ]
        );
        let held: Vec<KeyId> = h.state.pressed_keys().collect();
        assert_eq!(held, [key("D")]);
    }

    #[test]
    fn test_shared_key_reference_counted() {
        let mut h = Harness::new();
        let first = h.step(Hand::Left, Finger::Index, FingerContact::Bent(Some(key("E"))));
        let second = h.step(Hand::Right, Finger::Ring, FingerContact::Bent(Some(key("E"))));
        assert_eq!(first, [pressed("E", Hand::Left, Finger::Index)]);
        assert!(second.is_empty());
        assert_eq!(h.claims.claim_count(key("E")), 2);

        assert!(h.step(Hand::Left, Finger::Index, FingerContact::Straight).is_empty());
        assert!(h.state.is_pressed(key("E")));

        let last = h.step(Hand::Right, Finger::Ring, FingerContact::Straight);
        assert_eq!(last, [released("E", Hand::Right, Finger::Ring)]);
        assert!(!h.state.is_pressed(key("E")));
    }

    #[test]
    fn test_sliding_off_keyboard_rearms_key() {
        let mut h = Harness::new();
        h.step(Hand::Right, Finger::Index, FingerContact::Bent(Some(key("G"))));
        let off = h.step(Hand::Right, Finger::Index, FingerContact::Bent(None));
        assert_eq!(off, [released("G", Hand::Right, Finger::Index)]);
        let back = h.step(Hand::Right, Finger::Index, FingerContact::Bent(Some(key("G"))));
        assert_eq!(back, [pressed("G", Hand::Right, Finger::Index)]);
    }

    #[test]
    fn test_bent_over_nothing_without_claim_is_silent() {
        let mut h = Harness::new();
        assert!(h.step(Hand::Left, Finger::Pinky, FingerContact::Bent(None)).is_empty());
        assert_eq!(h.claims, HandClaims::new());
    }

    #[test]
    fn test_same_finger_on_both_hands_is_independent() {
        let mut h = Harness::new();
        h.step(Hand::Left, Finger::Index, FingerContact::Bent(Some(key("A"))));
        h.step(Hand::Right, Finger::Index, FingerContact::Bent(Some(key("B"))));
        let events = h.step(Hand::Left, Finger::Index, FingerContact::Straight);
        assert_eq!(events, [released("A", Hand::Left, Finger::Index)]);
        assert!(h.state.is_pressed(key("B")));
    }

    #[test]
    fn test_release_hand_drops_every_claim() {
        let mut h = Harness::new();
        h.step(Hand::Right, Finger::Index, FingerContact::Bent(Some(key("C#"))));
        h.step(Hand::Right, Finger::Middle, FingerContact::Bent(Some(key("D#2"))));
        h.step(Hand::Left, Finger::Thumb, FingerContact::Bent(Some(key("D#2"))));

        let mut events = Vec::new();
        release_hand(&mut h.state, &mut h.claims, Hand::Right, &mut events);
        assert_eq!(events, [released("C#", Hand::Right, Finger::Index)]);
        assert!(h.state.is_pressed(key("D#2")));
        assert_eq!(h.claims.claim(Hand::Right, Finger::Middle), None);
    }

    #[test]
    fn test_hand_off_between_fingers_keeps_key_down() {
        let mut h = Harness::new();
        h.step(Hand::Right, Finger::Index, FingerContact::Bent(Some(key("F"))));
        h.step(Hand::Right, Finger::Middle, FingerContact::Bent(Some(key("F"))));
        let events = h.step(Hand::Right, Finger::Index, FingerContact::Bent(Some(key("G"))));
        assert_eq!(events, [pressed("G", Hand::Right, Finger::Index)]);
        assert!(h.state.is_pressed(key("F")));
    }

    #[test]
    fn test_fingers_swapping_keys_fire_nothing() {
        let mut h = Harness::new();
        h.step(Hand::Right, Finger::Index, FingerContact::Bent(Some(key("C"))));
        h.step(Hand::Right, Finger::Middle, FingerContact::Bent(Some(key("D"))));

        let mut events = Vec::new();
        apply_frame(
            &mut h.state,
            &mut h.claims,
            &[
                (Hand::Right, Finger::Index, FingerContact::Bent(Some(key("D")))),
                (Hand::Right, Finger::Middle, FingerContact::Bent(Some(key("C")))),
            ],
            &mut events,
        );
        assert!(events.is_empty());
        assert!(h.state.is_pressed(key("C")));
        assert!(h.state.is_pressed(key("D")));
        assert_eq!(h.claims.claim(Hand::Right, Finger::Middle), Some(key("C")));
    }

    #[test]
    fn test_key_passed_between_hands_in_one_frame_stays_down() {
        let mut h = Harness::new();
        h.step(Hand::Left, Finger::Thumb, FingerContact::Bent(Some(key("A"))));

        let mut events = Vec::new();
        apply_frame(
            &mut h.state,
            &mut h.claims,
            &[
                (Hand::Right, Finger::Pinky, FingerContact::Bent(Some(key("A")))),
                (Hand::Left, Finger::Thumb, FingerContact::Straight),
            ],
            &mut events,
        );
        assert!(events.is_empty());
        assert!(h.state.is_pressed(key("A")));
    }

    #[test]
    fn test_frame_emits_releases_before_presses() {
        let mut h = Harness::new();
        h.step(Hand::Right, Finger::Index, FingerContact::Bent(Some(key("C"))));
        h.step(Hand::Right, Finger::Middle, FingerContact::Bent(Some(key("E"))));

        let mut events = Vec::new();
        apply_frame(
            &mut h.state,
            &mut h.claims,
            &[
                (Hand::Right, Finger::Index, FingerContact::Bent(Some(key("D")))),
                (Hand::Right, Finger::Middle, FingerContact::Bent(None)),
            ],
            &mut events,
        );
        assert_eq!(
            events,
            [
                released("C", Hand::Right, Finger::Index),
                released("E", Hand::Right, Finger::Middle),
                pressed("D", Hand::Right, Finger::Index),
            ]
        );
    }
}
