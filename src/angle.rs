use crate::pose::{Frame, KeypointIndex};

/// 関節角を定義する3点（j2が頂点）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleTriple {
    pub j1: usize,
    pub j2: usize,
    pub j3: usize,
    pub label: &'static str,
}

impl AngleTriple {
    pub const fn new(j1: KeypointIndex, j2: KeypointIndex, j3: KeypointIndex, label: &'static str) -> Self {
        Self {
            j1: j1 as usize,
            j2: j2 as usize,
            j3: j3 as usize,
            label,
        }
    }
}

/// スコアリングに使う8関節角の定義（プロセス全体で固定）
pub const ANGLE_TRIPLES: [AngleTriple; 8] = {
    use KeypointIndex::*;
    [
        AngleTriple::new(LeftShoulder, LeftElbow, LeftWrist, "left_elbow"),
        AngleTriple::new(RightShoulder, RightElbow, RightWrist, "right_elbow"),
        AngleTriple::new(LeftElbow, LeftShoulder, LeftHip, "left_shoulder"),
        AngleTriple::new(RightElbow, RightShoulder, RightHip, "right_shoulder"),
        AngleTriple::new(LeftHip, LeftKnee, LeftAnkle, "left_knee"),
        AngleTriple::new(RightHip, RightKnee, RightAnkle, "right_knee"),
        AngleTriple::new(LeftShoulder, LeftHip, LeftKnee, "left_hip"),
        AngleTriple::new(RightShoulder, RightHip, RightKnee, "right_hip"),
    ]
};

/// 1関節角。無効エントリは degrees=0.0 のセンチネルを保持する
/// （数値0.0と「計測不能」を区別するため valid フラグを持つ）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngle {
    /// 角度（度、0〜180）。無効なら0.0
    pub degrees: f32,
    pub valid: bool,
}

impl JointAngle {
    pub fn measured(degrees: f32) -> Self {
        Self { degrees, valid: true }
    }

    /// 計測不能（低可視度・範囲外・縮退）のセンチネル
    pub fn sentinel() -> Self {
        Self { degrees: 0.0, valid: false }
    }
}

/// 1フレームから導出した関節角ベクトル（トリプル定義順）
#[derive(Debug, Clone, PartialEq)]
pub struct AngleVector {
    pub angles: Vec<JointAngle>,
}

impl AngleVector {
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub fn max_degrees(&self) -> f32 {
        self.angles.iter().map(|a| a.degrees).fold(0.0, f32::max)
    }

    /// 最大エントリが180度になるよう比例スケーリングした新ベクトルを返す
    /// 全エントリが0（すべてセンチネル）なら入力をそのまま返す
    /// 単調・順序保存の変換で、可視度フィルタ後にのみ適用すること
    pub fn normalized(&self) -> AngleVector {
        let max = self.max_degrees();
        if max <= 0.0 {
            return self.clone();
        }
        let scale = 180.0 / max;
        AngleVector {
            angles: self
                .angles
                .iter()
                .map(|a| JointAngle {
                    degrees: a.degrees * scale,
                    valid: a.valid,
                })
                .collect(),
        }
    }
}

/// 頂点bにおける a-b-c の平面角（度）
///
/// cos値は浮動小数点誤差で±1をわずかに超えることがあるため、
/// acosに渡す前に必ず [-1, 1] にクランプする。
/// 縮退（いずれかのベクトル長が0）は0.0を返す。
pub fn angle_between(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> f32 {
    let ba = (a.0 - b.0, a.1 - b.1);
    let bc = (c.0 - b.0, c.1 - b.1);

    let dot = ba.0 * bc.0 + ba.1 * bc.1;
    let mag_ba = (ba.0 * ba.0 + ba.1 * ba.1).sqrt();
    let mag_bc = (bc.0 * bc.0 + bc.1 * bc.1).sqrt();

    if mag_ba * mag_bc == 0.0 {
        return 0.0;
    }

    let cos = (dot / (mag_ba * mag_bc)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// フレームから関節角ベクトルを抽出する
pub struct AngleExtractor {
    triples: Vec<AngleTriple>,
    visibility_threshold: f32,
}

impl AngleExtractor {
    pub fn new(visibility_threshold: f32) -> Self {
        Self::with_triples(ANGLE_TRIPLES.to_vec(), visibility_threshold)
    }

    /// 別のスケルトン定義でテストするための注入ポイント
    pub fn with_triples(triples: Vec<AngleTriple>, visibility_threshold: f32) -> Self {
        Self {
            triples,
            visibility_threshold,
        }
    }

    /// 関節角ベクトルを抽出する。呼び出し側にエラーは返さない:
    /// - キーポイントが1つもないフレームは構造的に使用不能 → None
    /// - 個別の関節の失敗（範囲外・低可視度・縮退）はその関節のみセンチネル化
    pub fn extract(&self, frame: &Frame) -> Option<AngleVector> {
        if frame.keypoints.is_empty() {
            return None;
        }

        let angles = self
            .triples
            .iter()
            .map(|t| self.extract_one(frame, t))
            .collect();
        Some(AngleVector { angles })
    }

    fn extract_one(&self, frame: &Frame, triple: &AngleTriple) -> JointAngle {
        let (a, b, c) = match (frame.get(triple.j1), frame.get(triple.j2), frame.get(triple.j3)) {
            (Some(a), Some(b), Some(c)) => (a, b, c),
            _ => return JointAngle::sentinel(),
        };

        if !a.is_valid(self.visibility_threshold)
            || !b.is_valid(self.visibility_threshold)
            || !c.is_valid(self.visibility_threshold)
        {
            return JointAngle::sentinel();
        }

        let degrees = angle_between((a.x, a.y), (b.x, b.y), (c.x, c.y));
        JointAngle::measured(degrees)
    }
}
