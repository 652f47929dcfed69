use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// BlazePose の 33 キーポイントインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum KeypointIndex {
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

impl KeypointIndex {
    pub const COUNT: usize = 33;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Nose),
            1 => Some(Self::LeftEyeInner),
            2 => Some(Self::LeftEye),
            3 => Some(Self::LeftEyeOuter),
            4 => Some(Self::RightEyeInner),
            5 => Some(Self::RightEye),
            6 => Some(Self::RightEyeOuter),
            7 => Some(Self::LeftEar),
            8 => Some(Self::RightEar),
            9 => Some(Self::MouthLeft),
            10 => Some(Self::MouthRight),
            11 => Some(Self::LeftShoulder),
            12 => Some(Self::RightShoulder),
            13 => Some(Self::LeftElbow),
            14 => Some(Self::RightElbow),
            15 => Some(Self::LeftWrist),
            16 => Some(Self::RightWrist),
            17 => Some(Self::LeftPinky),
            18 => Some(Self::RightPinky),
            19 => Some(Self::LeftIndex),
            20 => Some(Self::RightIndex),
            21 => Some(Self::LeftThumb),
            22 => Some(Self::RightThumb),
            23 => Some(Self::LeftHip),
            24 => Some(Self::RightHip),
            25 => Some(Self::LeftKnee),
            26 => Some(Self::RightKnee),
            27 => Some(Self::LeftAnkle),
            28 => Some(Self::RightAnkle),
            29 => Some(Self::LeftHeel),
            30 => Some(Self::RightHeel),
            31 => Some(Self::LeftFootIndex),
            32 => Some(Self::RightFootIndex),
            _ => None,
        }
    }
}

/// 単一キーポイント
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0)
    pub y: f32,
    /// 奥行き（スコアリングでは未使用、抽出器の出力をそのまま保持）
    #[serde(default)]
    pub z: f32,
    /// 検出信頼度 (0.0〜1.0)
    #[serde(default)]
    pub visibility: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, z: 0.0, visibility }
    }

    pub fn new_3d(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    /// 可視度が閾値を超えているか
    /// 閾値ちょうどは無効扱い（visibility <= threshold はセンチネル化）
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.visibility > threshold
    }
}

impl Default for Keypoint {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            visibility: 0.0,
        }
    }
}

/// 1フレーム分のキーポイント集合
///
/// 上流の抽出器は未検出フレームでも全ゼロの33キーポイントを出力する
/// （フレームを欠落させない）。壊れた入力に備えてアクセスは境界チェック付き。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// フレーム番号（系列内で単調増加、連番とは限らない）
    #[serde(rename = "frame")]
    pub frame_index: u32,
    pub keypoints: Vec<Keypoint>,
}

impl Frame {
    pub fn new(frame_index: u32, keypoints: Vec<Keypoint>) -> Self {
        Self { frame_index, keypoints }
    }

    /// インデックスでキーポイントを取得（範囲外はNone）
    pub fn get(&self, index: usize) -> Option<&Keypoint> {
        self.keypoints.get(index)
    }
}

/// 1パフォーマンス分のフレーム系列（比較中は読み取り専用）
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    frames: Vec<Frame>,
}

impl TimeSeries {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// JSONファイル（フレームの配列）から読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("姿勢データを読み込めません: {}", path.display()))?;
        let frames: Vec<Frame> = serde_json::from_str(&content)
            .with_context(|| format!("姿勢データの形式が不正です: {}", path.display()))?;
        Ok(Self { frames })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.frames)?;
        fs::write(path, content)
            .with_context(|| format!("姿勢データを保存できません: {}", path.display()))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoint_index_count() {
        assert_eq!(KeypointIndex::COUNT, 33);
    }

    #[test]
    fn test_keypoint_index_from_index() {
        assert_eq!(KeypointIndex::from_index(0), Some(KeypointIndex::Nose));
        assert_eq!(KeypointIndex::from_index(11), Some(KeypointIndex::LeftShoulder));
        assert_eq!(KeypointIndex::from_index(32), Some(KeypointIndex::RightFootIndex));
        assert_eq!(KeypointIndex::from_index(33), None);
    }

    #[test]
    fn test_keypoint_is_valid() {
        let kp = Keypoint::new(0.5, 0.5, 0.7);
        assert!(kp.is_valid(0.5));
        assert!(!kp.is_valid(0.8));
        // 閾値ちょうどは無効
        let kp = Keypoint::new(0.5, 0.5, 0.5);
        assert!(!kp.is_valid(0.5));
    }

    #[test]
    fn test_frame_get_out_of_range() {
        let frame = Frame::new(0, vec![Keypoint::default(); 3]);
        assert!(frame.get(2).is_some());
        assert!(frame.get(3).is_none());
    }

    #[test]
    fn test_keypoint_json_roundtrip() {
        let json = r#"{"x": 0.5, "y": 0.25, "z": -0.1, "visibility": 0.9}"#;
        let kp: Keypoint = serde_json::from_str(json).unwrap();
        assert_eq!(kp.x, 0.5);
        assert_eq!(kp.y, 0.25);
        assert_eq!(kp.z, -0.1);
        assert_eq!(kp.visibility, 0.9);
    }

    #[test]
    fn test_keypoint_json_missing_optional_fields() {
        // z と visibility が欠けた古い形式も受け付ける
        let json = r#"{"x": 0.5, "y": 0.25}"#;
        let kp: Keypoint = serde_json::from_str(json).unwrap();
        assert_eq!(kp.z, 0.0);
        assert_eq!(kp.visibility, 0.0);
    }

    #[test]
    fn test_frame_json_wire_format() {
        // 上流抽出器が出力する形式: {"frame": N, "keypoints": [...]}
        let json = r#"{"frame": 7, "keypoints": [{"x": 0, "y": 0, "z": 0, "visibility": 0}]}"#;
        let frame: Frame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.frame_index, 7);
        assert_eq!(frame.keypoints.len(), 1);
    }

    #[test]
    fn test_series_save_load_roundtrip() {
        let series = TimeSeries::new(vec![Frame::new(
            0,
            vec![Keypoint::new_3d(0.1, 0.2, -0.05, 0.9)],
        )]);
        let path = std::env::temp_dir().join("kagami_test_series.json");
        series.save(&path).unwrap();
        let loaded = TimeSeries::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(0).unwrap().keypoints[0].x, 0.1);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_series_json_array() {
        let json = r#"[
            {"frame": 0, "keypoints": []},
            {"frame": 2, "keypoints": []}
        ]"#;
        let frames: Vec<Frame> = serde_json::from_str(json).unwrap();
        let series = TimeSeries::new(frames);
        assert_eq!(series.len(), 2);
        // フレーム番号は連番でなくてよい
        assert_eq!(series.get(1).unwrap().frame_index, 2);
    }
}
