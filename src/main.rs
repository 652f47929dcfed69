use anyhow::{bail, Result};
use kagami::compare::SeriesComparer;
use kagami::config::Config;
use kagami::pose::TimeSeries;
use std::env;

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        bail!("使い方: {} <基準.json> <比較.json>", args[0]);
    }

    let config = Config::load_or_default(CONFIG_PATH);
    let reference = TimeSeries::load(&args[1])?;
    let live = TimeSeries::load(&args[2])?;

    println!("=== Kagami - 姿勢類似度スコアリング ===");
    println!("基準系列: {} ({} フレーム)", args[1], reference.len());
    println!("比較系列: {} ({} フレーム)", args[2], live.len());
    println!("時間窓: ±{} フレーム", config.compare.window);
    println!();

    let comparer = SeriesComparer::new(&config.compare);
    match comparer.compare(&reference, &live) {
        Some(result) => {
            let prec = config.compare.precision as usize;
            for m in &result.trace {
                println!(
                    "Frame {}: {:.prec$}% (offset {:+})",
                    m.frame_index, m.score, m.offset,
                );
            }
            println!();
            println!("平均一致スコア: {:.prec$}%", result.score);
        }
        None => {
            println!("比較可能なフレームがありません");
        }
    }

    Ok(())
}
