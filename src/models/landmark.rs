/// Body landmark models
///
/// Landmarks follow the 33-point MediaPipe pose topology. Coordinates are
/// image-relative and normalized to [0, 1].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single body landmark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// X coordinate (normalized 0-1)
    pub x: f64,
    /// Y coordinate (normalized 0-1)
    pub y: f64,
    /// Depth relative to the hips
    #[serde(default)]
    pub z: f64,
    /// Detector visibility score (0-1)
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Landmark with only image-plane coordinates
    pub fn planar(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    /// Rows for frames without a detected pose are zero-filled upstream
    pub fn is_zero_filled(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0 && self.visibility == 0.0
    }
}

/// MediaPipe pose landmark ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseLandmark {
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

impl PoseLandmark {
    /// Number of landmarks in the topology
    pub const COUNT: u8 = 33;

    /// Landmarks the gait metrics read
    pub const REQUIRED_FOR_GAIT: [PoseLandmark; 8] = [
        PoseLandmark::LeftShoulder,
        PoseLandmark::RightShoulder,
        PoseLandmark::LeftHip,
        PoseLandmark::RightHip,
        PoseLandmark::LeftKnee,
        PoseLandmark::RightKnee,
        PoseLandmark::LeftAnkle,
        PoseLandmark::RightAnkle,
    ];

    pub fn id(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

/// Body side for bilateral measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// (hip, knee, ankle) for this side
    pub fn leg(&self) -> (PoseLandmark, PoseLandmark, PoseLandmark) {
        match self {
            Side::Left => (
                PoseLandmark::LeftHip,
                PoseLandmark::LeftKnee,
                PoseLandmark::LeftAnkle,
            ),
            Side::Right => (
                PoseLandmark::RightHip,
                PoseLandmark::RightKnee,
                PoseLandmark::RightAnkle,
            ),
        }
    }
}

/// Landmarks detected in one frame, keyed by landmark id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Landmarks(BTreeMap<u8, Landmark>);

impl Landmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u8, landmark: Landmark) {
        self.0.insert(id, landmark);
    }

    pub fn with(mut self, landmark: PoseLandmark, value: Landmark) -> Self {
        self.insert(landmark.id(), value);
        self
    }

    pub fn get(&self, landmark: PoseLandmark) -> Option<&Landmark> {
        self.0.get(&landmark.id())
    }

    pub fn contains(&self, landmark: PoseLandmark) -> bool {
        self.0.contains_key(&landmark.id())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Landmark)> {
        self.0.iter().map(|(id, lm)| (*id, lm))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(u8, Landmark)> for Landmarks {
    fn from_iter<I: IntoIterator<Item = (u8, Landmark)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
