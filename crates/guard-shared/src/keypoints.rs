//! Body keypoint model.
//!
//! The estimator reports 33 landmarks per frame in normalized image
//! coordinates: `x` grows to the right, `y` grows downwards, both in [0, 1].
//! A landmark the estimator did not detect is simply absent.

use serde::{Deserialize, Serialize};

/// Number of landmarks in the body model
pub const LANDMARK_COUNT: usize = 33;

/// Anatomical landmark ids, in estimator output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl Landmark {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Landmark::Nose => "nose",
            Landmark::LeftEyeInner => "left_eye_inner",
            Landmark::LeftEye => "left_eye",
            Landmark::LeftEyeOuter => "left_eye_outer",
            Landmark::RightEyeInner => "right_eye_inner",
            Landmark::RightEye => "right_eye",
            Landmark::RightEyeOuter => "right_eye_outer",
            Landmark::LeftEar => "left_ear",
            Landmark::RightEar => "right_ear",
            Landmark::MouthLeft => "mouth_left",
            Landmark::MouthRight => "mouth_right",
            Landmark::LeftShoulder => "left_shoulder",
            Landmark::RightShoulder => "right_shoulder",
            Landmark::LeftElbow => "left_elbow",
            Landmark::RightElbow => "right_elbow",
            Landmark::LeftWrist => "left_wrist",
            Landmark::RightWrist => "right_wrist",
            Landmark::LeftPinky => "left_pinky",
            Landmark::RightPinky => "right_pinky",
            Landmark::LeftIndex => "left_index",
            Landmark::RightIndex => "right_index",
            Landmark::LeftThumb => "left_thumb",
            Landmark::RightThumb => "right_thumb",
            Landmark::LeftHip => "left_hip",
            Landmark::RightHip => "right_hip",
            Landmark::LeftKnee => "left_knee",
            Landmark::RightKnee => "right_knee",
            Landmark::LeftAnkle => "left_ankle",
            Landmark::RightAnkle => "right_ankle",
            Landmark::LeftHeel => "left_heel",
            Landmark::RightHeel => "right_heel",
            Landmark::LeftFootIndex => "left_foot_index",
            Landmark::RightFootIndex => "right_foot_index",
        }
    }
}

impl std::fmt::Display for Landmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limb segments a presenter draws as the skeleton overlay
pub const SKELETON_EDGES: &[(Landmark, Landmark)] = &[
    (Landmark::LeftShoulder, Landmark::RightShoulder),
    (Landmark::LeftShoulder, Landmark::LeftElbow),
    (Landmark::LeftElbow, Landmark::LeftWrist),
    (Landmark::RightShoulder, Landmark::RightElbow),
    (Landmark::RightElbow, Landmark::RightWrist),
    (Landmark::LeftShoulder, Landmark::LeftHip),
    (Landmark::RightShoulder, Landmark::RightHip),
    (Landmark::LeftHip, Landmark::RightHip),
    (Landmark::LeftHip, Landmark::LeftKnee),
    (Landmark::LeftKnee, Landmark::LeftAnkle),
    (Landmark::RightHip, Landmark::RightKnee),
    (Landmark::RightKnee, Landmark::RightAnkle),
];

/// One detected landmark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Detection confidence in [0, 1]
    pub visibility: f32,
}

impl Keypoint {
    pub const fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// All landmarks reported for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointSet {
    points: Vec<Option<Keypoint>>,
}

impl Default for KeypointSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl KeypointSet {
    /// A set with every landmark absent
    pub fn empty() -> Self {
        Self {
            points: vec![None; LANDMARK_COUNT],
        }
    }

    /// Build from estimator output in landmark order.
    ///
    /// Extra entries are ignored; missing trailing entries are absent.
    pub fn from_points(points: impl IntoIterator<Item = Option<Keypoint>>) -> Self {
        let mut set = Self::empty();
        for (slot, point) in set.points.iter_mut().zip(points) {
            *slot = point;
        }
        set
    }

    /// Builder-style insert
    pub fn with(mut self, landmark: Landmark, point: Keypoint) -> Self {
        if let Some(slot) = self.points.get_mut(landmark.index()) {
            *slot = Some(point);
        }
        self
    }

    /// Shorthand for a fully visible landmark
    pub fn with_xy(self, landmark: Landmark, x: f32, y: f32) -> Self {
        self.with(landmark, Keypoint::new(x, y, 1.0))
    }

    pub fn get(&self, landmark: Landmark) -> Option<&Keypoint> {
        self.points.get(landmark.index()).and_then(|p| p.as_ref())
    }

    /// Landmark if present with at least `min_visibility` confidence
    pub fn visible(&self, landmark: Landmark, min_visibility: f32) -> Option<&Keypoint> {
        self.get(landmark).filter(|p| p.visibility >= min_visibility)
    }

    pub fn present_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }
}
