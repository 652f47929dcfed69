use crate::angle::{AngleExtractor, AngleVector};
use crate::config::CompareConfig;
use crate::pose::TimeSeries;

/// 正規化済み関節角ベクトル同士の類似スコア (0〜100)
///
/// 両側とも無効なペアは情報を持たないため差分和・件数の両方から除外する。
/// 片側のみ無効なペアは数値0.0（センチネル値）との比較になる。
/// 長さ不一致は同一トリプル定義から導出されていれば起こらない
/// （起きたら設定のズレなのでデバッグビルドでは即座に落とす）。
pub fn score_vectors(a: &AngleVector, b: &AngleVector) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    debug_assert_eq!(a.len(), b.len(), "angle vectors from mismatched triple tables");
    if a.len() != b.len() {
        return 0.0;
    }

    let mut total_diff = 0.0f32;
    let mut count = 0u32;
    for (x, y) in a.angles.iter().zip(b.angles.iter()) {
        if !x.valid && !y.valid {
            continue;
        }
        total_diff += (x.degrees - y.degrees).abs();
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }
    (100.0 - total_diff / count as f32).max(0.0)
}

/// 基準フレーム1件分の照合結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatch {
    /// 基準系列側のフレーム番号
    pub frame_index: u32,
    /// 窓内で最良だったスコア
    pub score: f32,
    /// 最良スコアを出した時間オフセット
    pub offset: i32,
}

/// 系列比較の最終レポート
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// 全処理フレームの平均スコア (0〜100)
    pub score: f32,
    /// フレームごとの診断トレース（基準系列のフレーム番号順）
    pub trace: Vec<FrameMatch>,
}

/// 2つの姿勢系列を時間窓付きで照合するコンパレータ
///
/// 状態を持たない純粋な比較器。入力系列は読み取り専用で、
/// 独立した比較を並行に走らせても調停は不要。
pub struct SeriesComparer {
    extractor: AngleExtractor,
    window: i32,
    precision: u32,
}

impl SeriesComparer {
    pub fn new(config: &CompareConfig) -> Self {
        Self {
            extractor: AngleExtractor::new(config.visibility_threshold),
            window: config.window,
            precision: config.precision,
        }
    }

    /// テスト用: 抽出器を差し替えて構築
    pub fn with_extractor(extractor: AngleExtractor, window: i32, precision: u32) -> Self {
        Self {
            extractor,
            window,
            precision,
        }
    }

    /// 基準系列と比較系列を照合し、集計スコアとトレースを返す
    ///
    /// どちらかの系列が空、または処理できた基準フレームが1つもない場合は
    /// None（「比較不能」は正当なスコア0.0とは別物）。
    pub fn compare(&self, reference: &TimeSeries, live: &TimeSeries) -> Option<Comparison> {
        if reference.is_empty() || live.is_empty() {
            return None;
        }

        let mut trace = Vec::with_capacity(reference.len());
        let mut total = 0.0f32;

        for (i, frame) in reference.frames().iter().enumerate() {
            // 抽出が丸ごと失敗した基準フレームは照合対象から外す
            let ref_vector = match self.extractor.extract(frame) {
                Some(v) => v,
                None => continue,
            };
            let ref_normalized = ref_vector.normalized();

            let (score, offset) = self.best_match(&ref_normalized, live, i);
            total += score;
            trace.push(FrameMatch {
                frame_index: frame.frame_index,
                score: round_score(score, self.precision),
                offset,
            });
        }

        if trace.is_empty() {
            return None;
        }

        let score = round_score(total / trace.len() as f32, self.precision);
        Some(Comparison { score, trace })
    }

    /// 窓 [-W, +W] を走査し最良スコアとそのオフセットを返す
    ///
    /// 同点は先に走査したオフセット（-W寄り）が勝つ。決定的であること。
    /// 照合可能な候補が1つもなければ (0.0, 0)（未照合だが計上はされる）。
    fn best_match(&self, ref_vector: &AngleVector, live: &TimeSeries, i: usize) -> (f32, i32) {
        let mut best_score = 0.0f32;
        let mut best_offset = 0i32;
        let mut found = false;

        for offset in -self.window..=self.window {
            let j = i as i64 + offset as i64;
            if j < 0 || j >= live.len() as i64 {
                continue;
            }
            let live_frame = match live.get(j as usize) {
                Some(f) => f,
                None => continue,
            };
            let live_vector = match self.extractor.extract(live_frame) {
                Some(v) => v,
                None => continue,
            };

            let score = score_vectors(ref_vector, &live_vector.normalized());
            if !found || score > best_score {
                best_score = score;
                best_offset = offset;
                found = true;
            }
        }

        (best_score, best_offset)
    }
}

/// レポート用の丸め（precision = 小数点以下桁数）
pub fn round_score(value: f32, precision: u32) -> f32 {
    let factor = 10.0f32.powi(precision as i32);
    (value * factor).round() / factor
}
